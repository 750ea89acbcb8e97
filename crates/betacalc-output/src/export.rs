//! CSV and JSON export for beta reports and summaries.
//!
//! CSV output mirrors a spreadsheet sheet: labelled cells first, then the
//! tables, one section after another. Change columns are written as
//! percentages; every other value keeps full precision.

use betacalc_estimator::{BetaError, BetaResult, BetaSummary, SummaryEntry, Workings};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Writer produced bytes that are not UTF-8.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Excel workbook error.
    #[error("Excel error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    #[default]
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "pretty" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

/// Beta outcome for one stock against the benchmark, with its workings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetaReport {
    /// Stock symbol.
    pub symbol: String,

    /// Benchmark symbol.
    pub benchmark: String,

    /// Estimate, when it succeeded.
    pub result: Option<BetaResult>,

    /// Error message, when it failed.
    pub error: Option<String>,

    /// Aligned and unmatched rows behind the estimate.
    pub workings: Workings,

    /// Report generation timestamp.
    pub generated_at: DateTime<Utc>,
}

impl BetaReport {
    /// Report for a successful estimate.
    pub fn success(
        symbol: String,
        benchmark: String,
        result: BetaResult,
        workings: Workings,
    ) -> Self {
        Self {
            symbol,
            benchmark,
            result: Some(result),
            error: None,
            workings,
            generated_at: Utc::now(),
        }
    }

    /// Report for a symbol that could not be estimated.
    pub fn failure(symbol: String, benchmark: String, error: impl Into<String>) -> Self {
        Self {
            symbol,
            benchmark,
            result: None,
            error: Some(error.into()),
            workings: Workings::default(),
            generated_at: Utc::now(),
        }
    }

    /// Report from an estimator outcome.
    ///
    /// Workings are kept on failure too, so a `NoOverlap` report still shows
    /// which dates each side had.
    pub fn from_outcome(
        symbol: String,
        benchmark: String,
        outcome: Result<BetaResult, BetaError>,
        workings: Workings,
    ) -> Self {
        match outcome {
            Ok(result) => Self::success(symbol, benchmark, result, workings),
            Err(err) => Self {
                workings,
                ..Self::failure(symbol, benchmark, err.to_string())
            },
        }
    }

    /// Whether the estimate succeeded.
    pub const fn is_success(&self) -> bool {
        self.result.is_some()
    }

    /// Row for the run summary.
    pub fn summary_entry(&self) -> SummaryEntry {
        match (&self.result, &self.error) {
            (Some(result), _) => SummaryEntry::success(self.symbol.clone(), *result),
            (None, Some(error)) => SummaryEntry::failure(self.symbol.clone(), error.clone()),
            (None, None) => SummaryEntry::failure(self.symbol.clone(), "no result"),
        }
    }

    fn write_csv(&self, wtr: &mut csv::Writer<Vec<u8>>) -> Result<(), ExportError> {
        wtr.write_record(["Stock", self.symbol.as_str()])?;
        wtr.write_record(["Benchmark", self.benchmark.as_str()])?;

        match &self.result {
            Some(result) => {
                wtr.write_record(["Beta".to_string(), result.value.to_string()])?;
                wtr.write_record(["Start Date".to_string(), result.start_date.to_string()])?;
                wtr.write_record(["End Date".to_string(), result.end_date.to_string()])?;
                wtr.write_record(["Sample Size".to_string(), result.sample_size.to_string()])?;
                wtr.write_record(["Return Mode", result.mode.as_str()])?;
            }
            None => {
                wtr.write_record(["Beta", "Insufficient Data"])?;
                if let Some(error) = &self.error {
                    wtr.write_record(["Error", error.as_str()])?;
                }
            }
        }

        wtr.write_record(["Aligned Data"])?;
        wtr.write_record([
            "Date",
            "Stock Price",
            "Stock Change (%)",
            "Index Price",
            "Index Change (%)",
        ])?;
        for row in &self.workings.aligned {
            wtr.write_record([
                row.date.to_string(),
                row.asset_price.to_string(),
                optional_cell(row.asset_return.map(|r| r * 100.0)),
                row.benchmark_price.to_string(),
                optional_cell(row.benchmark_return.map(|r| r * 100.0)),
            ])?;
        }

        wtr.write_record(["Unmatched Data"])?;
        wtr.write_record(["Date", "Stock Price", "Index Price"])?;
        for row in &self.workings.unmatched {
            wtr.write_record([
                row.date.to_string(),
                optional_cell(row.asset_price),
                optional_cell(row.benchmark_price),
            ])?;
        }

        Ok(())
    }
}

fn optional_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn flexible_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new().flexible(true).from_writer(vec![])
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

impl Exporter for BetaReport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = flexible_writer();
                self.write_csv(&mut wtr)?;
                finish(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

/// Summary as serialized, with the average computed.
#[derive(Debug, Serialize)]
struct SummaryDocument<'a> {
    benchmark: &'a str,
    entries: &'a [SummaryEntry],
    average_beta: Option<f64>,
}

impl Exporter for BetaSummary {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        let document = SummaryDocument {
            benchmark: &self.benchmark,
            entries: &self.entries,
            average_beta: self.average_beta(),
        };

        match format {
            ExportFormat::Csv => {
                let mut wtr = flexible_writer();
                wtr.write_record(["Stock Symbol", "Beta", "Error"])?;
                for entry in &self.entries {
                    match (entry.beta(), &entry.error) {
                        (Some(beta), _) => {
                            wtr.write_record([entry.symbol.clone(), beta.to_string()])?
                        }
                        (None, error) => wtr.write_record([
                            entry.symbol.as_str(),
                            "Insufficient Data",
                            error.as_deref().unwrap_or_default(),
                        ])?,
                    }
                }
                wtr.write_record([
                    "Average Beta".to_string(),
                    optional_cell(document.average_beta),
                ])?;
                finish(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(&document)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(&document)?),
        }
    }
}

impl Exporter for Vec<BetaReport> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = flexible_writer();
                for report in self {
                    report.write_csv(&mut wtr)?;
                }
                finish(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use betacalc_estimator::{Alignment, BetaError, PriceSeries, ReturnMode, estimate_beta};
    use chrono::NaiveDate;
    use rstest::rstest;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn report() -> BetaReport {
        let asset =
            PriceSeries::from_pairs(vec![(d(1), 100.0), (d(4), 102.0), (d(5), 101.0), (d(6), 104.0)])
                .unwrap();
        let benchmark =
            PriceSeries::from_pairs(vec![(d(1), 50.0), (d(4), 50.5), (d(6), 51.5), (d(7), 52.0)])
                .unwrap();
        let outcome = estimate_beta(&asset, &benchmark, ReturnMode::Simple);
        let workings =
            Workings::build(&asset, &benchmark, ReturnMode::Simple, Alignment::Intersect);
        BetaReport::from_outcome("TCS.NS".into(), "^NSEI".into(), outcome, workings)
    }

    #[test]
    fn test_report_csv_layout() {
        let csv = report().export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Stock,TCS.NS");
        assert_eq!(lines[1], "Benchmark,^NSEI");
        assert!(lines[2].starts_with("Beta,"));
        assert_eq!(lines[3], "Start Date,2024-03-04");
        assert_eq!(lines[4], "End Date,2024-03-06");
        assert_eq!(lines[5], "Sample Size,2");
        assert_eq!(lines[6], "Return Mode,simple");
        assert_eq!(lines[7], "Aligned Data");

        let unmatched = lines.iter().position(|l| *l == "Unmatched Data").unwrap();
        assert!(unmatched > 8);
        // 2024-03-05 has only a stock price, 2024-03-07 only an index price.
        assert!(lines[unmatched..].contains(&"2024-03-05,101,"));
        assert!(lines[unmatched..].contains(&"2024-03-07,,52"));
    }

    #[test]
    fn test_report_changes_are_percentages() {
        let csv = report().export_to_string(ExportFormat::Csv).unwrap();
        let row: Vec<f64> = csv
            .lines()
            .find(|l| l.starts_with("2024-03-04,"))
            .unwrap()
            .split(',')
            .skip(1)
            .map(|cell| cell.parse().unwrap())
            .collect();

        // 100 -> 102 is a 2% move, 50 -> 50.5 a 1% move.
        assert_eq!(row[0], 102.0);
        assert!((row[1] - 2.0).abs() < 1e-9);
        assert_eq!(row[2], 50.5);
        assert!((row[3] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_first_shared_date_row_has_empty_changes() {
        let csv = report().export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.lines().any(|l| l == "2024-03-01,100,,50,"));
    }

    #[test]
    fn test_failed_report() {
        let report = BetaReport::from_outcome(
            "X".into(),
            "^NSEI".into(),
            Err(BetaError::NoOverlap),
            Workings::default(),
        );

        assert!(!report.is_success());
        let csv = report.export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.contains("Beta,Insufficient Data"));
        assert!(csv.contains("no overlapping trading days"));
        assert_eq!(report.summary_entry().beta(), None);
    }

    #[test]
    fn test_report_json_keeps_full_precision() {
        let report = report();
        let value = report.result.unwrap().value;

        let json = report.export_to_string(ExportFormat::Json).unwrap();
        let parsed: BetaReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.result.unwrap().value, value);
        assert_eq!(parsed.workings, report.workings);
    }

    #[test]
    fn test_summary_csv() {
        let ok = report();
        let summary = BetaSummary::from_entries(
            "^NSEI".into(),
            vec![
                ok.summary_entry(),
                SummaryEntry::failure("BAD.NS".into(), "not enough price history"),
            ],
        );

        let csv = summary.export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Stock Symbol,Beta,Error");
        assert!(lines[1].starts_with("TCS.NS,"));
        assert_eq!(lines[2], "BAD.NS,Insufficient Data,not enough price history");
        assert_eq!(
            lines[3],
            format!("Average Beta,{}", ok.result.unwrap().value)
        );
    }

    #[test]
    fn test_summary_json_includes_average() {
        let summary = BetaSummary::from_entries(
            "^NSEI".into(),
            vec![SummaryEntry::failure("BAD.NS".into(), "x")],
        );

        let json = summary.export_to_string(ExportFormat::PrettyJson).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["benchmark"], "^NSEI");
        assert!(value["average_beta"].is_null());
        assert!(json.contains("  "));
    }

    #[rstest]
    #[case("csv", ExportFormat::Csv)]
    #[case("JSON", ExportFormat::Json)]
    #[case("pretty-json", ExportFormat::PrettyJson)]
    fn test_parse_format(#[case] input: &str, #[case] expected: ExportFormat) {
        assert_eq!(input.parse::<ExportFormat>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_format() {
        assert!(matches!(
            "ods".parse::<ExportFormat>(),
            Err(ExportError::InvalidFormat(_))
        ));
    }
}
