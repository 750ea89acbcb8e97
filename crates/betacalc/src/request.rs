//! Validated request for a Beta run.

use crate::benchmark::resolve_benchmark;
use betacalc_data::PriceColumn;
use betacalc_estimator::{Alignment, BetaEstimator, ReturnMode};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest rolling window accepted, in calendar days.
pub const MAX_WINDOW_DAYS: u32 = 1000;

/// Errors from building a [`BetaRequest`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    /// No usable stock symbol.
    #[error("at least one stock symbol is required")]
    NoSymbols,

    /// Benchmark was blank.
    #[error("benchmark symbol must not be empty")]
    EmptyBenchmark,

    /// Range end is not after its start.
    #[error("start date {start} must be before end date {end}")]
    InvalidRange {
        /// Requested start
        start: NaiveDate,
        /// Requested end
        end: NaiveDate,
    },

    /// Rolling window outside `1..=MAX_WINDOW_DAYS`.
    #[error("window must be between 1 and {max} days, got {0}", max = MAX_WINDOW_DAYS)]
    InvalidWindow(u32),
}

/// Date span to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateWindow {
    /// Explicit `[start, end]`.
    Range {
        /// First date
        start: NaiveDate,
        /// Last date
        end: NaiveDate,
    },
    /// The `days` calendar days ending on `end`.
    Rolling {
        /// Last date
        end: NaiveDate,
        /// Length in calendar days
        days: u32,
    },
}

impl DateWindow {
    /// Resolve to `(start, end)`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::InvalidRange`] if `start >= end` and
    /// [`RequestError::InvalidWindow`] for a rolling length outside
    /// `1..=MAX_WINDOW_DAYS`.
    pub fn resolve(&self) -> Result<(NaiveDate, NaiveDate), RequestError> {
        match *self {
            Self::Range { start, end } => {
                if start >= end {
                    return Err(RequestError::InvalidRange { start, end });
                }
                Ok((start, end))
            }
            Self::Rolling { end, days } => {
                if days == 0 || days > MAX_WINDOW_DAYS {
                    return Err(RequestError::InvalidWindow(days));
                }
                Ok((end - Duration::days(i64::from(days)), end))
            }
        }
    }
}

/// Everything needed to compute Beta for a set of stocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetaRequest {
    symbols: Vec<String>,
    benchmark: String,
    window: DateWindow,
    start: NaiveDate,
    end: NaiveDate,
    mode: ReturnMode,
    alignment: Alignment,
    price_column: PriceColumn,
}

impl BetaRequest {
    /// Build a request with simple returns, date intersection and adjusted
    /// closes.
    ///
    /// Each symbol argument may hold a comma-separated list. Symbols are
    /// trimmed and upper-cased; duplicates are dropped keeping first
    /// position. The benchmark goes through [`resolve_benchmark`].
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] if no symbol remains, the benchmark is
    /// blank, or the window is invalid.
    pub fn new<I, S>(
        symbols: I,
        benchmark: &str,
        window: DateWindow,
    ) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let symbols = normalize_symbols(symbols);
        if symbols.is_empty() {
            return Err(RequestError::NoSymbols);
        }
        let benchmark = resolve_benchmark(benchmark).ok_or(RequestError::EmptyBenchmark)?;
        let (start, end) = window.resolve()?;

        Ok(Self {
            symbols,
            benchmark,
            window,
            start,
            end,
            mode: ReturnMode::default(),
            alignment: Alignment::default(),
            price_column: PriceColumn::default(),
        })
    }

    /// Set the return mode.
    pub const fn with_mode(mut self, mode: ReturnMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the alignment policy.
    pub const fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Set which close feeds the returns.
    pub const fn with_price_column(mut self, price_column: PriceColumn) -> Self {
        self.price_column = price_column;
        self
    }

    /// Stock symbols, normalized.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Benchmark Yahoo symbol.
    pub fn benchmark(&self) -> &str {
        &self.benchmark
    }

    /// Window as given.
    pub const fn window(&self) -> DateWindow {
        self.window
    }

    /// First date of the resolved window.
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last date of the resolved window.
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Return mode.
    pub const fn mode(&self) -> ReturnMode {
        self.mode
    }

    /// Alignment policy.
    pub const fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Price column.
    pub const fn price_column(&self) -> PriceColumn {
        self.price_column
    }

    /// Estimator configured for this request.
    pub const fn estimator(&self) -> BetaEstimator {
        BetaEstimator::new(self.mode).with_alignment(self.alignment)
    }
}

/// Split, trim, upper-case and de-duplicate symbols, keeping first-seen order.
pub fn normalize_symbols<I, S>(symbols: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for raw in symbols {
        for part in raw.as_ref().split(',') {
            let symbol = part.trim().to_ascii_uppercase();
            if !symbol.is_empty() && !out.contains(&symbol) {
                out.push(symbol);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_normalize_symbols() {
        let symbols = normalize_symbols(["reliance.ns, TCS.NS", "", " infy.ns ", "RELIANCE.NS,,"]);
        assert_eq!(symbols, vec!["RELIANCE.NS", "TCS.NS", "INFY.NS"]);
    }

    #[test]
    fn test_rolling_window() {
        let window = DateWindow::Rolling {
            end: date(2024, 3, 31),
            days: 30,
        };
        assert_eq!(window.resolve().unwrap(), (date(2024, 3, 1), date(2024, 3, 31)));
    }

    #[rstest]
    #[case(0)]
    #[case(MAX_WINDOW_DAYS + 1)]
    fn test_rolling_window_bounds(#[case] days: u32) {
        let window = DateWindow::Rolling {
            end: date(2024, 3, 31),
            days,
        };
        assert_eq!(window.resolve(), Err(RequestError::InvalidWindow(days)));
    }

    #[test]
    fn test_max_window_accepted() {
        let window = DateWindow::Rolling {
            end: date(2024, 3, 31),
            days: MAX_WINDOW_DAYS,
        };
        assert!(window.resolve().is_ok());
    }

    #[rstest]
    #[case(date(2024, 3, 1), date(2024, 3, 1))]
    #[case(date(2024, 3, 2), date(2024, 3, 1))]
    fn test_range_must_be_ordered(#[case] start: NaiveDate, #[case] end: NaiveDate) {
        let window = DateWindow::Range { start, end };
        assert_eq!(
            window.resolve(),
            Err(RequestError::InvalidRange { start, end })
        );
    }

    #[test]
    fn test_request_defaults() {
        let request = BetaRequest::new(
            ["tcs.ns"],
            "sensex",
            DateWindow::Range {
                start: date(2024, 1, 1),
                end: date(2024, 6, 30),
            },
        )
        .unwrap();

        assert_eq!(request.symbols(), ["TCS.NS"]);
        assert_eq!(request.benchmark(), "^BSESN");
        assert_eq!(request.start(), date(2024, 1, 1));
        assert_eq!(request.mode(), ReturnMode::Simple);
        assert_eq!(request.alignment(), Alignment::Intersect);
        assert_eq!(request.price_column(), PriceColumn::AdjustedClose);
    }

    #[test]
    fn test_request_builders() {
        let request = BetaRequest::new(
            ["A"],
            "^GSPC",
            DateWindow::Rolling {
                end: date(2024, 6, 30),
                days: 90,
            },
        )
        .unwrap()
        .with_mode(ReturnMode::Logarithmic)
        .with_alignment(Alignment::ForwardFill)
        .with_price_column(PriceColumn::Close);

        let estimator = request.estimator();
        assert_eq!(estimator.mode, ReturnMode::Logarithmic);
        assert_eq!(estimator.alignment, Alignment::ForwardFill);
        assert_eq!(request.price_column(), PriceColumn::Close);
    }

    #[test]
    fn test_request_errors() {
        let window = DateWindow::Rolling {
            end: date(2024, 6, 30),
            days: 30,
        };

        assert_eq!(
            BetaRequest::new([" , "], "^NSEI", window).unwrap_err(),
            RequestError::NoSymbols
        );
        assert_eq!(
            BetaRequest::new(["A"], " ", window).unwrap_err(),
            RequestError::EmptyBenchmark
        );
        assert_eq!(
            BetaRequest::new(
                ["A"],
                "^NSEI",
                DateWindow::Rolling {
                    end: date(2024, 6, 30),
                    days: 0
                }
            )
            .unwrap_err(),
            RequestError::InvalidWindow(0)
        );
    }
}
