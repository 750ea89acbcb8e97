//! Price and return series.
//!
//! Both series types enforce the same ordering invariant: dates are strictly
//! increasing, so there are no duplicates and lookups by date are unambiguous.

use crate::error::{BetaError, Result, SeriesRole};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single closing price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading date.
    pub date: NaiveDate,
    /// Closing price.
    pub price: f64,
}

impl PricePoint {
    /// Create a new price point.
    pub const fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// Ordered price history for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, validating ordering and price values.
    ///
    /// # Errors
    ///
    /// Returns [`BetaError::InvalidSeries`] if dates are not strictly
    /// increasing or a price is not finite and positive.
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        for point in &points {
            if !point.price.is_finite() || point.price <= 0.0 {
                return Err(BetaError::InvalidSeries(format!(
                    "price {} on {} must be finite and positive",
                    point.price, point.date
                )));
            }
        }
        check_ordering(points.iter().map(|p| p.date))?;
        Ok(Self { points })
    }

    /// Build a series from `(date, price)` pairs.
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, price)| PricePoint::new(date, price))
                .collect(),
        )
    }

    /// Observations in chronological order.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First observation date.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    /// Last observation date.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Price on `date`, if observed.
    pub fn price_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| self.points[idx].price)
    }
}

/// How period-over-period returns are computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnMode {
    /// `(p[t] - p[t-1]) / p[t-1]`
    #[default]
    Simple,
    /// `ln(p[t] / p[t-1])`
    Logarithmic,
}

impl ReturnMode {
    /// Return from `previous` to `current`.
    pub fn apply(self, previous: f64, current: f64) -> f64 {
        match self {
            Self::Simple => (current - previous) / previous,
            Self::Logarithmic => (current / previous).ln(),
        }
    }

    /// Lowercase name used in reports and on the command line.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Logarithmic => "logarithmic",
        }
    }
}

impl fmt::Display for ReturnMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReturnMode {
    type Err = BetaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "simple" | "pct" | "percent" => Ok(Self::Simple),
            "log" | "logarithmic" | "ln" => Ok(Self::Logarithmic),
            other => Err(BetaError::InvalidParameter(format!(
                "unknown return mode: {other}"
            ))),
        }
    }
}

/// A single period return.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    /// Date the period ends on.
    pub date: NaiveDate,
    /// Return over the period.
    pub value: f64,
}

impl ReturnPoint {
    /// Create a new return point.
    pub const fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Ordered period returns for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    /// Build a return series directly, validating ordering.
    ///
    /// # Errors
    ///
    /// Returns [`BetaError::InvalidSeries`] on unordered dates or non-finite values.
    pub fn new(points: Vec<ReturnPoint>) -> Result<Self> {
        if let Some(bad) = points.iter().find(|p| !p.value.is_finite()) {
            return Err(BetaError::InvalidSeries(format!(
                "return on {} is not finite",
                bad.date
            )));
        }
        check_ordering(points.iter().map(|p| p.date))?;
        Ok(Self { points })
    }

    /// Derive returns from a price series.
    ///
    /// The first price has no predecessor, so the result is one shorter than
    /// the input. `role` is reported back if the series is too short.
    ///
    /// # Errors
    ///
    /// Returns [`BetaError::InsufficientData`] when fewer than two prices are given.
    pub fn from_prices(prices: &PriceSeries, mode: ReturnMode, role: SeriesRole) -> Result<Self> {
        if prices.len() < 2 {
            return Err(BetaError::InsufficientData {
                role,
                required: 2,
                actual: prices.len(),
            });
        }

        let points = prices
            .points()
            .windows(2)
            .map(|w| ReturnPoint::new(w[1].date, mode.apply(w[0].price, w[1].price)))
            .collect();

        Ok(Self { points })
    }

    /// Returns in chronological order.
    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    /// Number of returns.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no returns.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Return ending on `date`, if any.
    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|idx| self.points[idx].value)
    }
}

fn check_ordering(dates: impl Iterator<Item = NaiveDate>) -> Result<()> {
    let mut previous: Option<NaiveDate> = None;
    for date in dates {
        if let Some(prev) = previous
            && date <= prev
        {
            return Err(BetaError::InvalidSeries(format!(
                "dates must be strictly increasing: {date} follows {prev}"
            )));
        }
        previous = Some(date);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_rejects_duplicate_dates() {
        let result = PriceSeries::from_pairs([(day(1), 10.0), (day(1), 11.0)]);
        assert!(matches!(result, Err(BetaError::InvalidSeries(_))));
    }

    #[test]
    fn test_rejects_unordered_dates() {
        let result = PriceSeries::from_pairs([(day(2), 10.0), (day(1), 11.0)]);
        assert!(matches!(result, Err(BetaError::InvalidSeries(_))));
    }

    #[test]
    fn test_rejects_non_positive_price() {
        assert!(PriceSeries::from_pairs([(day(1), 0.0)]).is_err());
        assert!(PriceSeries::from_pairs([(day(1), -3.0)]).is_err());
        assert!(PriceSeries::from_pairs([(day(1), f64::NAN)]).is_err());
    }

    #[test]
    fn test_simple_returns() {
        let prices =
            PriceSeries::from_pairs([(day(1), 100.0), (day(4), 110.0), (day(5), 99.0)]).unwrap();
        let returns =
            ReturnSeries::from_prices(&prices, ReturnMode::Simple, SeriesRole::Asset).unwrap();

        assert_eq!(returns.len(), 2);
        assert_eq!(returns.points()[0].date, day(4));
        assert_relative_eq!(returns.points()[0].value, 0.10, epsilon = 1e-12);
        assert_relative_eq!(returns.points()[1].value, -0.10, epsilon = 1e-12);
    }

    #[test]
    fn test_log_returns() {
        let prices = PriceSeries::from_pairs([(day(1), 100.0), (day(2), 110.0)]).unwrap();
        let returns =
            ReturnSeries::from_prices(&prices, ReturnMode::Logarithmic, SeriesRole::Asset)
                .unwrap();

        assert_relative_eq!(returns.points()[0].value, 1.1_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_single_price_is_insufficient() {
        let prices = PriceSeries::from_pairs([(day(1), 100.0)]).unwrap();
        let err = ReturnSeries::from_prices(&prices, ReturnMode::Simple, SeriesRole::Benchmark)
            .unwrap_err();

        assert_eq!(
            err,
            BetaError::InsufficientData {
                role: SeriesRole::Benchmark,
                required: 2,
                actual: 1,
            }
        );
    }

    #[test]
    fn test_lookup_by_date() {
        let prices = PriceSeries::from_pairs([(day(1), 100.0), (day(3), 101.0)]).unwrap();
        assert_eq!(prices.price_on(day(3)), Some(101.0));
        assert_eq!(prices.price_on(day(2)), None);
        assert_eq!(prices.first_date(), Some(day(1)));
        assert_eq!(prices.last_date(), Some(day(3)));
    }

    #[test]
    fn test_return_mode_parsing() {
        assert_eq!("simple".parse::<ReturnMode>().unwrap(), ReturnMode::Simple);
        assert_eq!("LOG".parse::<ReturnMode>().unwrap(), ReturnMode::Logarithmic);
        assert!("weekly".parse::<ReturnMode>().is_err());
        assert_eq!(ReturnMode::Logarithmic.to_string(), "logarithmic");
    }
}
