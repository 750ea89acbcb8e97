//! Sample statistics over return vectors.
//!
//! Covariance and variance use the unbiased `n - 1` denominator, matching
//! the usual sample estimators in spreadsheet and dataframe tooling.

use crate::error::{BetaError, Result, SeriesRole};
use ndarray::ArrayView1;

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: ArrayView1<'_, f64>) -> Option<f64> {
    values.mean()
}

/// Sample covariance of two equal-length vectors.
///
/// # Errors
///
/// Returns [`BetaError::InvalidSeries`] on a length mismatch and
/// [`BetaError::InsufficientData`] with fewer than two observations.
pub fn covariance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> Result<f64> {
    if a.len() != b.len() {
        return Err(BetaError::InvalidSeries(format!(
            "length mismatch: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    let n = a.len();
    let (Some(mean_a), Some(mean_b)) = (mean(a), mean(b)) else {
        return Err(insufficient(n));
    };
    if n < 2 {
        return Err(insufficient(n));
    }

    let dev_a = &a - mean_a;
    let dev_b = &b - mean_b;
    Ok(dev_a.dot(&dev_b) / (n - 1) as f64)
}

/// Sample variance.
///
/// # Errors
///
/// Returns [`BetaError::InsufficientData`] with fewer than two observations.
pub fn variance(values: ArrayView1<'_, f64>) -> Result<f64> {
    covariance(values, values)
}

const fn insufficient(actual: usize) -> BetaError {
    BetaError::InsufficientData {
        role: SeriesRole::Aligned,
        required: 2,
        actual,
    }
}
