//! Beta coefficient estimation.
//!
//! Beta measures how sensitive an asset's returns are to a benchmark's:
//!
//! ```text
//! beta = cov(asset, benchmark) / var(benchmark)
//! ```
//!
//! Beta > 1: amplifies benchmark moves
//! Beta = 1: moves with the benchmark
//! Beta < 1: dampens benchmark moves
//! Beta < 0: moves against the benchmark

use crate::align::{AlignedReturns, Alignment, align, forward_fill};
use crate::error::{BetaError, Result, SeriesRole};
use crate::series::{PriceSeries, ReturnMode, ReturnSeries};
use crate::stats::{covariance, variance};
use crate::workings::Workings;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Benchmark variance at or below this is treated as zero.
pub const MIN_BENCHMARK_VARIANCE: f64 = 1e-20;

/// Outcome of a beta estimation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaResult {
    /// Estimated beta.
    pub value: f64,
    /// Number of aligned return pairs used.
    pub sample_size: usize,
    /// First aligned date.
    pub start_date: NaiveDate,
    /// Last aligned date.
    pub end_date: NaiveDate,
    /// Return computation used.
    pub mode: ReturnMode,
}

impl BetaResult {
    /// Beta rounded to two decimals for display.
    pub fn rounded(&self) -> f64 {
        (self.value * 100.0).round() / 100.0
    }
}

/// Beta estimator configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetaEstimator {
    /// Return computation.
    pub mode: ReturnMode,
    /// Calendar reconciliation.
    pub alignment: Alignment,
}

impl BetaEstimator {
    /// Create an estimator with the given return mode and default alignment.
    pub const fn new(mode: ReturnMode) -> Self {
        Self {
            mode,
            alignment: Alignment::Intersect,
        }
    }

    /// Use a different alignment strategy.
    pub const fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Estimate beta of `asset` against `benchmark`.
    ///
    /// # Errors
    ///
    /// - [`BetaError::InsufficientData`] if either series has fewer than two
    ///   prices, or fewer than two return pairs survive alignment
    /// - [`BetaError::NoOverlap`] if no dates are shared
    /// - [`BetaError::DegenerateVariance`] if benchmark returns are constant
    pub fn estimate(&self, asset: &PriceSeries, benchmark: &PriceSeries) -> Result<BetaResult> {
        let aligned = self.aligned_returns(asset, benchmark)?;
        beta_from_aligned(&aligned, self.mode)
    }

    /// Row-level workings aligned the way [`Self::estimate`] aligns.
    pub fn workings(&self, asset: &PriceSeries, benchmark: &PriceSeries) -> Workings {
        Workings::build(asset, benchmark, self.mode, self.alignment)
    }

    /// Derive and align returns without computing beta.
    pub fn aligned_returns(
        &self,
        asset: &PriceSeries,
        benchmark: &PriceSeries,
    ) -> Result<AlignedReturns> {
        match self.alignment {
            Alignment::Intersect => {
                let asset_returns = ReturnSeries::from_prices(asset, self.mode, SeriesRole::Asset)?;
                let benchmark_returns =
                    ReturnSeries::from_prices(benchmark, self.mode, SeriesRole::Benchmark)?;
                align(&asset_returns, &benchmark_returns)
            }
            Alignment::ForwardFill => {
                let (asset, benchmark) = forward_fill(asset, benchmark)?;
                // A single shared date leaves nothing to difference.
                if asset.len() < 2 {
                    return Err(BetaError::NoOverlap);
                }
                let asset_returns =
                    ReturnSeries::from_prices(&asset, self.mode, SeriesRole::Asset)?;
                let benchmark_returns =
                    ReturnSeries::from_prices(&benchmark, self.mode, SeriesRole::Benchmark)?;
                align(&asset_returns, &benchmark_returns)
            }
        }
    }
}

/// Estimate beta from two price series with drop-unmatched alignment.
///
/// # Errors
///
/// See [`BetaEstimator::estimate`].
pub fn estimate_beta(
    asset: &PriceSeries,
    benchmark: &PriceSeries,
    mode: ReturnMode,
) -> Result<BetaResult> {
    BetaEstimator::new(mode).estimate(asset, benchmark)
}

/// Estimate beta from two return series that still need aligning.
///
/// # Errors
///
/// See [`BetaEstimator::estimate`].
pub fn estimate_beta_from_returns(
    asset: &ReturnSeries,
    benchmark: &ReturnSeries,
    mode: ReturnMode,
) -> Result<BetaResult> {
    let aligned = align(asset, benchmark)?;
    beta_from_aligned(&aligned, mode)
}

/// Compute beta on already-aligned returns.
///
/// `mode` is recorded on the result only.
///
/// # Errors
///
/// - [`BetaError::NoOverlap`] for an empty sample
/// - [`BetaError::InsufficientData`] for a single pair
/// - [`BetaError::DegenerateVariance`] if benchmark variance is zero
pub fn beta_from_aligned(aligned: &AlignedReturns, mode: ReturnMode) -> Result<BetaResult> {
    let (Some(start_date), Some(end_date)) = (aligned.start_date(), aligned.end_date()) else {
        return Err(BetaError::NoOverlap);
    };

    let benchmark_variance = variance(aligned.benchmark().view())?;
    if !benchmark_variance.is_finite() || benchmark_variance <= MIN_BENCHMARK_VARIANCE {
        return Err(BetaError::DegenerateVariance);
    }
    let cov = covariance(aligned.asset().view(), aligned.benchmark().view())?;

    Ok(BetaResult {
        value: cov / benchmark_variance,
        sample_size: aligned.len(),
        start_date,
        end_date,
        mode,
    })
}
