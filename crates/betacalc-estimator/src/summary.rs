//! Summary across several stocks measured against one benchmark.

use crate::beta::BetaResult;
use crate::error::BetaError;
use serde::{Deserialize, Serialize};

/// Beta outcome for one stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    /// Stock symbol.
    pub symbol: String,
    /// Estimate, if one could be made.
    pub result: Option<BetaResult>,
    /// Why no estimate was made.
    pub error: Option<String>,
}

impl SummaryEntry {
    /// Entry for a successful estimate.
    pub const fn success(symbol: String, result: BetaResult) -> Self {
        Self {
            symbol,
            result: Some(result),
            error: None,
        }
    }

    /// Entry for a failed estimate.
    pub fn failure(symbol: String, error: impl Into<String>) -> Self {
        Self {
            symbol,
            result: None,
            error: Some(error.into()),
        }
    }

    /// Entry built from an estimator outcome.
    pub fn from_outcome(symbol: String, outcome: &Result<BetaResult, BetaError>) -> Self {
        match outcome {
            Ok(result) => Self::success(symbol, *result),
            Err(e) => Self::failure(symbol, e.to_string()),
        }
    }

    /// Beta value, if estimated.
    pub fn beta(&self) -> Option<f64> {
        self.result.map(|r| r.value)
    }
}

/// Betas of several stocks against a common benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetaSummary {
    /// Benchmark symbol.
    pub benchmark: String,
    /// One entry per requested stock, in request order.
    pub entries: Vec<SummaryEntry>,
}

impl BetaSummary {
    /// Create a summary.
    pub const fn from_entries(benchmark: String, entries: Vec<SummaryEntry>) -> Self {
        Self { benchmark, entries }
    }

    /// Mean beta over entries that produced an estimate.
    ///
    /// Returns `None` when no entry succeeded.
    pub fn average_beta(&self) -> Option<f64> {
        let betas: Vec<f64> = self.entries.iter().filter_map(SummaryEntry::beta).collect();
        if betas.is_empty() {
            None
        } else {
            Some(betas.iter().sum::<f64>() / betas.len() as f64)
        }
    }

    /// Number of entries with an estimate.
    pub fn success_count(&self) -> usize {
        self.entries.iter().filter(|e| e.result.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::ReturnMode;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn result(value: f64) -> BetaResult {
        BetaResult {
            value,
            sample_size: 20,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            mode: ReturnMode::Simple,
        }
    }

    #[test]
    fn test_average_skips_failures() {
        let summary = BetaSummary::from_entries(
            "^NSEI".to_string(),
            vec![
                SummaryEntry::success("RELIANCE.NS".to_string(), result(1.2)),
                SummaryEntry::failure("BAD.NS".to_string(), "no overlapping trading days in range"),
                SummaryEntry::success("TCS.NS".to_string(), result(0.6)),
            ],
        );

        assert_relative_eq!(summary.average_beta().unwrap(), 0.9, epsilon = 1e-12);
        assert_eq!(summary.success_count(), 2);
    }

    #[test]
    fn test_average_none_when_all_fail() {
        let summary = BetaSummary::from_entries(
            "^NSEI".to_string(),
            vec![SummaryEntry::from_outcome(
                "X".to_string(),
                &Err(BetaError::NoOverlap),
            )],
        );

        assert_eq!(summary.average_beta(), None);
        assert_eq!(
            summary.entries[0].error.as_deref(),
            Some("no overlapping trading days in range")
        );
    }
}
