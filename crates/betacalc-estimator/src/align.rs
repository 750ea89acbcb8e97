//! Alignment of asset and benchmark observations on common dates.
//!
//! Markets close on different holidays, so the two series rarely share every
//! date. The default is to drop unmatched dates. Forward-filling prices is
//! available as an explicit alternative because it changes the estimate.

use crate::error::{BetaError, Result, SeriesRole};
use crate::series::{PricePoint, PriceSeries, ReturnSeries};
use chrono::NaiveDate;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Strategy for reconciling mismatched trading calendars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    /// Keep only dates present in both return series.
    #[default]
    Intersect,
    /// Carry the last known price forward over the union calendar, then derive returns.
    ForwardFill,
}

impl Alignment {
    /// Name used in reports and on the command line.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Intersect => "intersect",
            Self::ForwardFill => "forward_fill",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Alignment {
    type Err = BetaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "intersect" | "drop" => Ok(Self::Intersect),
            "forward_fill" | "ffill" => Ok(Self::ForwardFill),
            other => Err(BetaError::InvalidParameter(format!(
                "unknown alignment: {other}"
            ))),
        }
    }
}

/// Asset and benchmark returns paired by date.
///
/// `dates`, `asset` and `benchmark` always have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedReturns {
    dates: Vec<NaiveDate>,
    asset: Array1<f64>,
    benchmark: Array1<f64>,
}

impl AlignedReturns {
    /// Number of paired observations.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Shared dates, ascending.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Asset returns.
    pub const fn asset(&self) -> &Array1<f64> {
        &self.asset
    }

    /// Benchmark returns.
    pub const fn benchmark(&self) -> &Array1<f64> {
        &self.benchmark
    }

    /// First shared date.
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    /// Last shared date.
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

/// Intersect two return series by date, preserving chronological order.
///
/// # Errors
///
/// Returns [`BetaError::NoOverlap`] if the series share no dates.
pub fn align(asset: &ReturnSeries, benchmark: &ReturnSeries) -> Result<AlignedReturns> {
    let a = asset.points();
    let b = benchmark.points();

    let capacity = a.len().min(b.len());
    let mut dates = Vec::with_capacity(capacity);
    let mut asset_values = Vec::with_capacity(capacity);
    let mut benchmark_values = Vec::with_capacity(capacity);

    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].date.cmp(&b[j].date) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                dates.push(a[i].date);
                asset_values.push(a[i].value);
                benchmark_values.push(b[j].value);
                i += 1;
                j += 1;
            }
        }
    }

    if dates.is_empty() {
        return Err(BetaError::NoOverlap);
    }

    Ok(AlignedReturns {
        dates,
        asset: Array1::from(asset_values),
        benchmark: Array1::from(benchmark_values),
    })
}

/// Forward-fill both price series onto their union calendar.
///
/// Only the window where both series have started and neither has ended is
/// kept, so no price is ever back-filled. Each returned series has one price
/// per date in the union of the two calendars within that window.
///
/// # Errors
///
/// Returns [`BetaError::InsufficientData`] if either series has fewer than two
/// prices, or [`BetaError::NoOverlap`] if their date ranges do not intersect.
pub fn forward_fill(
    asset: &PriceSeries,
    benchmark: &PriceSeries,
) -> Result<(PriceSeries, PriceSeries)> {
    for (series, role) in [(asset, SeriesRole::Asset), (benchmark, SeriesRole::Benchmark)] {
        if series.len() < 2 {
            return Err(BetaError::InsufficientData {
                role,
                required: 2,
                actual: series.len(),
            });
        }
    }

    let (Some(a_first), Some(a_last), Some(b_first), Some(b_last)) = (
        asset.first_date(),
        asset.last_date(),
        benchmark.first_date(),
        benchmark.last_date(),
    ) else {
        return Err(BetaError::NoOverlap);
    };

    let window_start = a_first.max(b_first);
    let window_end = a_last.min(b_last);
    if window_start > window_end {
        return Err(BetaError::NoOverlap);
    }

    let mut calendar: Vec<NaiveDate> = asset
        .points()
        .iter()
        .chain(benchmark.points())
        .map(|p| p.date)
        .filter(|d| *d >= window_start && *d <= window_end)
        .collect();
    calendar.sort_unstable();
    calendar.dedup();

    Ok((fill_onto(asset, &calendar)?, fill_onto(benchmark, &calendar)?))
}

fn fill_onto(series: &PriceSeries, calendar: &[NaiveDate]) -> Result<PriceSeries> {
    let source = series.points();
    let mut filled = Vec::with_capacity(calendar.len());
    let mut cursor = 0;
    let mut last_price: Option<f64> = None;

    for &date in calendar {
        while cursor < source.len() && source[cursor].date <= date {
            last_price = Some(source[cursor].price);
            cursor += 1;
        }
        if let Some(price) = last_price {
            filled.push(PricePoint::new(date, price));
        }
    }

    PriceSeries::new(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{ReturnMode, ReturnPoint};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn returns(points: &[(u32, f64)]) -> ReturnSeries {
        ReturnSeries::new(
            points
                .iter()
                .map(|&(d, v)| ReturnPoint::new(day(d), v))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_align_drops_unmatched_dates() {
        let asset = returns(&[(2, 0.01), (3, 0.02), (6, -0.01), (7, 0.03)]);
        let benchmark = returns(&[(3, 0.015), (6, -0.005), (7, 0.02), (8, 0.01)]);

        let aligned = align(&asset, &benchmark).unwrap();

        assert_eq!(aligned.dates(), &[day(3), day(6), day(7)]);
        assert_eq!(aligned.asset().to_vec(), vec![0.02, -0.01, 0.03]);
        assert_eq!(aligned.benchmark().to_vec(), vec![0.015, -0.005, 0.02]);
        assert_eq!(aligned.start_date(), Some(day(3)));
        assert_eq!(aligned.end_date(), Some(day(7)));
    }

    #[test]
    fn test_align_disjoint_is_no_overlap() {
        let asset = returns(&[(2, 0.01), (3, 0.02)]);
        let benchmark = returns(&[(6, 0.01), (7, 0.02)]);

        assert_eq!(align(&asset, &benchmark).unwrap_err(), BetaError::NoOverlap);
    }

    #[test]
    fn test_forward_fill_union_calendar() {
        let asset =
            PriceSeries::from_pairs([(day(1), 10.0), (day(2), 11.0), (day(4), 12.0)]).unwrap();
        let benchmark =
            PriceSeries::from_pairs([(day(1), 100.0), (day(3), 101.0), (day(4), 102.0)]).unwrap();

        let (a, b) = forward_fill(&asset, &benchmark).unwrap();

        assert_eq!(a.len(), 4);
        assert_eq!(b.len(), 4);
        assert_eq!(a.price_on(day(3)), Some(11.0));
        assert_eq!(b.price_on(day(2)), Some(100.0));

        let ra = ReturnSeries::from_prices(&a, ReturnMode::Simple, SeriesRole::Asset).unwrap();
        let rb = ReturnSeries::from_prices(&b, ReturnMode::Simple, SeriesRole::Benchmark).unwrap();
        assert_eq!(align(&ra, &rb).unwrap().len(), 3);
    }

    #[test]
    fn test_forward_fill_never_back_fills() {
        let asset = PriceSeries::from_pairs([(day(1), 10.0), (day(5), 11.0)]).unwrap();
        let benchmark =
            PriceSeries::from_pairs([(day(3), 100.0), (day(4), 101.0), (day(9), 102.0)]).unwrap();

        let (a, b) = forward_fill(&asset, &benchmark).unwrap();

        assert_eq!(a.first_date(), Some(day(3)));
        assert_eq!(a.last_date(), Some(day(5)));
        assert_eq!(b.price_on(day(5)), Some(101.0));
    }

    #[test]
    fn test_forward_fill_disjoint_is_no_overlap() {
        let asset = PriceSeries::from_pairs([(day(1), 10.0), (day(2), 11.0)]).unwrap();
        let benchmark = PriceSeries::from_pairs([(day(8), 100.0), (day(9), 101.0)]).unwrap();

        assert_eq!(
            forward_fill(&asset, &benchmark).unwrap_err(),
            BetaError::NoOverlap
        );
    }

    #[test]
    fn test_alignment_parsing() {
        assert_eq!("drop".parse::<Alignment>().unwrap(), Alignment::Intersect);
        assert_eq!(
            "forward-fill".parse::<Alignment>().unwrap(),
            Alignment::ForwardFill
        );
        assert!("interpolate".parse::<Alignment>().is_err());
    }
}
