//! Workbook of one sheet per report plus a summary sheet.
//!
//! Written either as a single Excel file or as a directory with one CSV or
//! JSON file per sheet.

use crate::export::{BetaReport, ExportError, ExportFormat, Exporter};
use betacalc_estimator::BetaSummary;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Longest sheet name a spreadsheet accepts.
pub const MAX_SHEET_NAME_LEN: usize = 31;

pub(crate) const SUMMARY_SHEET: &str = "Summary";

/// How a [`Workbook`] is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WorkbookFormat {
    /// A single `.xlsx` file.
    #[default]
    Xlsx,
    /// A directory holding one file per sheet.
    Sheets(ExportFormat),
}

impl FromStr for WorkbookFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xlsx" | "excel" => Ok(Self::Xlsx),
            other => other.parse().map(Self::Sheets),
        }
    }
}

/// Reports for one run against a single benchmark.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    benchmark: String,
    reports: Vec<BetaReport>,
}

impl Workbook {
    /// Create an empty workbook for `benchmark`.
    pub const fn new(benchmark: String) -> Self {
        Self {
            benchmark,
            reports: Vec::new(),
        }
    }

    /// Create a workbook from finished reports.
    pub const fn from_reports(benchmark: String, reports: Vec<BetaReport>) -> Self {
        Self { benchmark, reports }
    }

    /// Add a report.
    pub fn push(&mut self, report: BetaReport) {
        self.reports.push(report);
    }

    /// Benchmark symbol.
    pub fn benchmark(&self) -> &str {
        &self.benchmark
    }

    /// Reports in insertion order.
    pub fn reports(&self) -> &[BetaReport] {
        &self.reports
    }

    /// Summary over every report.
    pub fn summary(&self) -> BetaSummary {
        BetaSummary::from_entries(
            self.benchmark.clone(),
            self.reports.iter().map(BetaReport::summary_entry).collect(),
        )
    }

    /// Sheet name for each report, in report order.
    ///
    /// Names come from [`sanitize_sheet_name`]. Collisions, compared without
    /// case and including the summary sheet, get a numeric suffix.
    pub fn sheet_names(&self) -> Vec<String> {
        let mut used = HashSet::from([SUMMARY_SHEET.to_ascii_lowercase()]);
        self.reports
            .iter()
            .map(|report| unique_sheet_name(&sanitize_sheet_name(&report.symbol), &mut used))
            .collect()
    }

    /// Write the workbook to `path` in `format`.
    ///
    /// [`WorkbookFormat::Xlsx`] writes one file at `path`;
    /// [`WorkbookFormat::Sheets`] treats `path` as a directory. Returns the
    /// written paths.
    ///
    /// # Errors
    ///
    /// Returns an error if any sheet fails to serialize or write.
    pub fn export(&self, path: &Path, format: WorkbookFormat) -> Result<Vec<PathBuf>, ExportError> {
        match format {
            WorkbookFormat::Xlsx => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                self.write_xlsx(path)?;
                Ok(vec![path.to_path_buf()])
            }
            WorkbookFormat::Sheets(format) => self.write_to_dir(path, format),
        }
    }

    /// Write each report to `<dir>/<sheet>.<ext>` and the summary to
    /// `<dir>/summary.<ext>`, creating `dir` if needed.
    ///
    /// Sheet names come from [`sanitize_sheet_name`]; collisions get a
    /// numeric suffix. Returns the written paths, reports first.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or a file fails
    /// to serialize or write.
    pub fn write_to_dir(
        &self,
        dir: &Path,
        format: ExportFormat,
    ) -> Result<Vec<PathBuf>, ExportError> {
        fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(self.reports.len() + 1);

        for (report, name) in self.reports.iter().zip(self.sheet_names()) {
            let path = dir.join(format!("{name}.{}", format.extension()));
            report.export_to_file(&path, format)?;
            written.push(path);
        }

        let path = dir.join(format!(
            "{}.{}",
            SUMMARY_SHEET.to_ascii_lowercase(),
            format.extension()
        ));
        self.summary().export_to_file(&path, format)?;
        written.push(path);

        Ok(written)
    }
}

/// Turn a symbol into a sheet name usable as a file stem.
///
/// Characters spreadsheets or file systems reject become `_`, the result is
/// cut to [`MAX_SHEET_NAME_LEN`] characters, leading and trailing dots and
/// apostrophes are removed, and an empty name becomes `sheet`.
pub fn sanitize_sheet_name(symbol: &str) -> String {
    let cleaned: String = symbol
        .trim()
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .take(MAX_SHEET_NAME_LEN)
        .collect();

    let cleaned = cleaned.trim_matches(['.', '\'']).to_string();
    if cleaned.is_empty() {
        "sheet".to_string()
    } else {
        cleaned
    }
}

fn unique_sheet_name(base: &str, used: &mut HashSet<String>) -> String {
    let mut candidate = base.to_string();
    let mut n = 2;
    while !used.insert(candidate.to_ascii_lowercase()) {
        let suffix = format!("_{n}");
        let keep = MAX_SHEET_NAME_LEN.saturating_sub(suffix.len());
        candidate = format!("{}{suffix}", base.chars().take(keep).collect::<String>());
        n += 1;
    }
    candidate
}
