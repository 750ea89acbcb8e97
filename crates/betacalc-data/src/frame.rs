//! Conversion from quote frames to price series.

use crate::error::{DataError, Result};
use betacalc_estimator::PriceSeries;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Which closing price column feeds the return calculation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceColumn {
    /// Close adjusted for splits and dividends.
    #[default]
    AdjustedClose,
    /// Raw close as traded.
    Close,
}

impl PriceColumn {
    /// Column name in a quote frame.
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::AdjustedClose => "adjusted_close",
            Self::Close => "close",
        }
    }
}

impl fmt::Display for PriceColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for PriceColumn {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "adjusted_close" | "adj_close" | "adjclose" => Ok(Self::AdjustedClose),
            "close" => Ok(Self::Close),
            other => Err(DataError::Parse(format!("unknown price column: {other}"))),
        }
    }
}

/// Build a [`PriceSeries`] from a quote frame.
///
/// The frame needs a `date` column (Date or `YYYY-MM-DD` strings) and the
/// chosen price column. Rows with a missing date or price are skipped. When a
/// date appears more than once the last row wins. Output is sorted by date.
///
/// # Errors
///
/// Returns [`DataError::MissingData`] if no usable rows remain,
/// [`DataError::Parse`] for an unreadable date, and [`DataError::Series`] if
/// a remaining price is not positive.
pub fn price_series_from_quotes(df: &DataFrame, column: PriceColumn) -> Result<PriceSeries> {
    let dates = df.column("date")?.cast(&DataType::String)?;
    let dates = dates.str()?;
    let prices = df.column(column.column_name())?.cast(&DataType::Float64)?;
    let prices = prices.f64()?;

    let mut by_date = BTreeMap::new();
    for (date, price) in dates.into_iter().zip(prices.into_iter()) {
        let (Some(date), Some(price)) = (date, price) else {
            continue;
        };
        if price.is_nan() {
            continue;
        }
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| DataError::Parse(format!("date {date:?}: {e}")))?;
        by_date.insert(date, price);
    }

    if by_date.is_empty() {
        return Err(DataError::MissingData {
            symbol: symbol_of(df).unwrap_or_default(),
            reason: format!("no usable {column} values"),
        });
    }

    Ok(PriceSeries::from_pairs(by_date)?)
}

fn symbol_of(df: &DataFrame) -> Option<String> {
    df.column("symbol")
        .ok()?
        .str()
        .ok()?
        .get(0)
        .map(str::to_string)
}
