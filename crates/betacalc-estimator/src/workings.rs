//! Row-level workings behind a beta estimate.
//!
//! Aligned rows are the observations the estimate is computed from. Unmatched
//! rows are dates on which only one of the two instruments traded.

use crate::align::{Alignment, forward_fill};
use crate::error::SeriesRole;
use crate::series::{PriceSeries, ReturnMode, ReturnSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A date on which both instruments have a price.
///
/// The return is `None` on the first price of a series. Only rows with both
/// returns enter the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedObservation {
    /// Trading date.
    pub date: NaiveDate,
    /// Asset closing price.
    pub asset_price: f64,
    /// Asset return ending on this date.
    pub asset_return: Option<f64>,
    /// Benchmark closing price.
    pub benchmark_price: f64,
    /// Benchmark return ending on this date.
    pub benchmark_return: Option<f64>,
}

impl AlignedObservation {
    /// Whether this row is one of the return pairs behind the estimate.
    pub const fn is_sampled(&self) -> bool {
        self.asset_return.is_some() && self.benchmark_return.is_some()
    }
}

/// A date on which only one instrument has a price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnmatchedObservation {
    /// Trading date.
    pub date: NaiveDate,
    /// Asset price, if the asset traded.
    pub asset_price: Option<f64>,
    /// Benchmark price, if the benchmark traded.
    pub benchmark_price: Option<f64>,
}

/// Aligned and unmatched observations for one asset/benchmark pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workings {
    /// Dates on which both series have a price, after alignment.
    pub aligned: Vec<AlignedObservation>,
    /// Rows dropped by alignment.
    pub unmatched: Vec<UnmatchedObservation>,
}

impl Workings {
    /// Build workings from the raw price series, aligned the same way the
    /// estimator aligns them.
    ///
    /// With [`Alignment::ForwardFill`] the aligned rows carry the filled
    /// prices, and only dates outside the common window are unmatched. If the
    /// series cannot be filled the raw prices are used.
    pub fn build(
        asset: &PriceSeries,
        benchmark: &PriceSeries,
        mode: ReturnMode,
        alignment: Alignment,
    ) -> Self {
        let filled = match alignment {
            Alignment::Intersect => None,
            Alignment::ForwardFill => forward_fill(asset, benchmark).ok(),
        };
        let (used_asset, used_benchmark) = filled
            .as_ref()
            .map_or((asset, benchmark), |(a, b)| (a, b));

        let asset_returns = ReturnSeries::from_prices(used_asset, mode, SeriesRole::Asset).ok();
        let benchmark_returns =
            ReturnSeries::from_prices(used_benchmark, mode, SeriesRole::Benchmark).ok();

        let calendar: BTreeSet<NaiveDate> = asset
            .points()
            .iter()
            .chain(benchmark.points())
            .map(|p| p.date)
            .collect();

        let mut workings = Self::default();
        for date in calendar {
            match (used_asset.price_on(date), used_benchmark.price_on(date)) {
                (Some(asset_price), Some(benchmark_price)) => {
                    workings.aligned.push(AlignedObservation {
                        date,
                        asset_price,
                        asset_return: asset_returns.as_ref().and_then(|r| r.value_on(date)),
                        benchmark_price,
                        benchmark_return: benchmark_returns
                            .as_ref()
                            .and_then(|r| r.value_on(date)),
                    });
                }
                _ => workings.unmatched.push(UnmatchedObservation {
                    date,
                    asset_price: asset.price_on(date),
                    benchmark_price: benchmark.price_on(date),
                }),
            }
        }

        workings
    }

    /// Number of return pairs in the aligned rows.
    pub fn sample_size(&self) -> usize {
        self.aligned.iter().filter(|row| row.is_sampled()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beta::BetaEstimator;
    use rstest::rstest;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, d).unwrap()
    }

    fn asset() -> PriceSeries {
        PriceSeries::from_pairs([
            (day(1), 100.0),
            (day(2), 101.0),
            (day(5), 103.0),
            (day(6), 102.0),
        ])
        .unwrap()
    }

    fn benchmark() -> PriceSeries {
        PriceSeries::from_pairs([
            (day(1), 20.0),
            (day(2), 20.4),
            (day(3), 20.1),
            (day(6), 20.6),
        ])
        .unwrap()
    }

    #[test]
    fn test_rows_split_by_calendar() {
        let workings = Workings::build(
            &asset(),
            &benchmark(),
            ReturnMode::Simple,
            Alignment::Intersect,
        );

        let aligned_dates: Vec<_> = workings.aligned.iter().map(|r| r.date).collect();
        assert_eq!(aligned_dates, vec![day(1), day(2), day(6)]);

        let first = workings.aligned[0];
        assert_eq!(first.asset_price, 100.0);
        assert_eq!(first.asset_return, None);
        assert_eq!(first.benchmark_return, None);
        assert!(!first.is_sampled());
        assert!(workings.aligned[1].is_sampled());

        assert_eq!(workings.unmatched.len(), 2);
        assert_eq!(workings.unmatched[0].date, day(3));
        assert_eq!(workings.unmatched[0].asset_price, None);
        assert_eq!(workings.unmatched[0].benchmark_price, Some(20.1));
        assert_eq!(workings.unmatched[1].date, day(5));
        assert_eq!(workings.unmatched[1].asset_price, Some(103.0));
    }

    #[test]
    fn test_forward_fill_rows_use_filled_prices() {
        let workings = Workings::build(
            &asset(),
            &benchmark(),
            ReturnMode::Simple,
            Alignment::ForwardFill,
        );

        let aligned_dates: Vec<_> = workings.aligned.iter().map(|r| r.date).collect();
        assert_eq!(aligned_dates, vec![day(1), day(2), day(3), day(5), day(6)]);
        assert!(workings.unmatched.is_empty());

        // Asset did not trade on the 3rd; its price carries over with a zero return.
        let third = workings.aligned[2];
        assert_eq!(third.asset_price, 101.0);
        assert_eq!(third.asset_return, Some(0.0));
        assert_eq!(third.benchmark_price, 20.1);
    }

    #[rstest]
    #[case(Alignment::Intersect)]
    #[case(Alignment::ForwardFill)]
    fn test_sample_matches_estimate(#[case] alignment: Alignment) {
        let result = BetaEstimator::new(ReturnMode::Simple)
            .with_alignment(alignment)
            .estimate(&asset(), &benchmark())
            .unwrap();
        let workings = Workings::build(&asset(), &benchmark(), ReturnMode::Simple, alignment);

        assert_eq!(result.sample_size, workings.sample_size());
        let sampled: Vec<_> = workings
            .aligned
            .iter()
            .filter(|r| r.is_sampled())
            .map(|r| r.date)
            .collect();
        assert_eq!(sampled.first(), Some(&result.start_date));
        assert_eq!(sampled.last(), Some(&result.end_date));
    }

    #[test]
    fn test_short_series_keeps_shared_date() {
        let asset = PriceSeries::from_pairs([(day(1), 100.0)]).unwrap();
        let benchmark = PriceSeries::from_pairs([(day(1), 20.0), (day(2), 21.0)]).unwrap();

        let workings = Workings::build(&asset, &benchmark, ReturnMode::Simple, Alignment::Intersect);
        assert_eq!(workings.aligned.len(), 1);
        assert_eq!(workings.sample_size(), 0);
        assert_eq!(workings.unmatched.len(), 1);
    }
}
