//! Excel workbook export.
//!
//! One worksheet per report, laid out like the CSV sheet, plus a `Summary`
//! worksheet with the average beta. Change columns use a percent number
//! format so the stored values stay fractional returns.

use crate::export::{BetaReport, ExportError};
use crate::workbook::{SUMMARY_SHEET, Workbook};
use betacalc_estimator::BetaSummary;
use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{
    Color, ExcelDateTime, Format, FormatAlign, FormatBorder, Workbook as XlsxWorkbook, Worksheet,
};
use std::path::Path;

const COLUMN_WIDTH: f64 = 18.0;

struct Formats {
    header: Format,
    cell: Format,
    percent: Format,
    date: Format,
    bold: Format,
    beta: Format,
}

impl Formats {
    fn new() -> Self {
        let cell = Format::new()
            .set_border(FormatBorder::Thin)
            .set_align(FormatAlign::Center);
        Self {
            header: cell
                .clone()
                .set_bold()
                .set_background_color(Color::RGB(0xDDEBF7)),
            percent: cell.clone().set_num_format("0.00%"),
            date: cell.clone().set_num_format("yyyy-mm-dd"),
            beta: cell.clone().set_num_format("0.00"),
            bold: Format::new().set_bold(),
            cell,
        }
    }
}

impl Workbook {
    /// Build the Excel workbook in memory.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Xlsx`] if a sheet cannot be written.
    pub fn to_xlsx_buffer(&self) -> Result<Vec<u8>, ExportError> {
        Ok(self.build_xlsx()?.save_to_buffer()?)
    }

    /// Write the Excel workbook to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Xlsx`] if a sheet cannot be written or the file
    /// cannot be saved.
    pub fn write_xlsx(&self, path: &Path) -> Result<(), ExportError> {
        self.build_xlsx()?.save(path)?;
        Ok(())
    }

    fn build_xlsx(&self) -> Result<XlsxWorkbook, ExportError> {
        let formats = Formats::new();
        let mut xlsx = XlsxWorkbook::new();

        for (report, name) in self.reports().iter().zip(self.sheet_names()) {
            let sheet = xlsx.add_worksheet();
            sheet.set_name(&name)?;
            write_report_sheet(sheet, report, &formats)?;
        }

        let sheet = xlsx.add_worksheet();
        sheet.set_name(SUMMARY_SHEET)?;
        write_summary_sheet(sheet, &self.summary(), &formats)?;

        Ok(xlsx)
    }
}

fn excel_date(date: NaiveDate) -> Result<ExcelDateTime, ExportError> {
    let year = u16::try_from(date.year())
        .map_err(|_| ExportError::InvalidFormat(format!("date out of range: {date}")))?;
    Ok(ExcelDateTime::from_ymd(year, date.month() as u8, date.day() as u8)?)
}

fn write_change(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    change: Option<f64>,
    formats: &Formats,
) -> Result<(), ExportError> {
    match change {
        Some(value) => sheet.write_number_with_format(row, col, value, &formats.percent)?,
        None => sheet.write_blank(row, col, &formats.percent)?,
    };
    Ok(())
}

fn write_price(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    price: Option<f64>,
    formats: &Formats,
) -> Result<(), ExportError> {
    match price {
        Some(value) => sheet.write_number_with_format(row, col, value, &formats.cell)?,
        None => sheet.write_blank(row, col, &formats.cell)?,
    };
    Ok(())
}

fn write_headers(
    sheet: &mut Worksheet,
    row: u32,
    headers: &[&str],
    formats: &Formats,
) -> Result<(), ExportError> {
    for (col, header) in (0u16..).zip(headers) {
        sheet.write_string_with_format(row, col, *header, &formats.header)?;
    }
    Ok(())
}

fn write_report_sheet(
    sheet: &mut Worksheet,
    report: &BetaReport,
    formats: &Formats,
) -> Result<(), ExportError> {
    sheet.write_string_with_format(0, 0, "Stock", &formats.bold)?;
    sheet.write_string(0, 1, report.symbol.as_str())?;
    sheet.write_string_with_format(1, 0, "Benchmark", &formats.bold)?;
    sheet.write_string(1, 1, report.benchmark.as_str())?;
    sheet.write_string_with_format(2, 0, "Beta", &formats.bold)?;

    let mut row = 3;
    match (&report.result, &report.error) {
        (Some(result), _) => {
            sheet.write_number_with_format(2, 1, result.value, &formats.beta)?;
            sheet.write_string_with_format(3, 0, "Start Date", &formats.bold)?;
            sheet.write_datetime_with_format(3, 1, &excel_date(result.start_date)?, &formats.date)?;
            sheet.write_string_with_format(4, 0, "End Date", &formats.bold)?;
            sheet.write_datetime_with_format(4, 1, &excel_date(result.end_date)?, &formats.date)?;
            sheet.write_string_with_format(5, 0, "Sample Size", &formats.bold)?;
            sheet.write_number(5, 1, result.sample_size as f64)?;
            sheet.write_string_with_format(6, 0, "Return Mode", &formats.bold)?;
            sheet.write_string(6, 1, result.mode.as_str())?;
            row = 7;
        }
        (None, error) => {
            sheet.write_string(2, 1, "Insufficient Data")?;
            if let Some(error) = error {
                sheet.write_string_with_format(3, 0, "Error", &formats.bold)?;
                sheet.write_string(3, 1, error.as_str())?;
                row = 4;
            }
        }
    }

    row += 1;
    sheet.write_string_with_format(row, 0, "Aligned Data", &formats.bold)?;
    row += 1;
    write_headers(
        sheet,
        row,
        &[
            "Date",
            "Stock Price",
            "Stock Change (%)",
            "Index Price",
            "Index Change (%)",
        ],
        formats,
    )?;
    for obs in &report.workings.aligned {
        row += 1;
        sheet.write_datetime_with_format(row, 0, &excel_date(obs.date)?, &formats.date)?;
        write_price(sheet, row, 1, Some(obs.asset_price), formats)?;
        write_change(sheet, row, 2, obs.asset_return, formats)?;
        write_price(sheet, row, 3, Some(obs.benchmark_price), formats)?;
        write_change(sheet, row, 4, obs.benchmark_return, formats)?;
    }

    row += 2;
    sheet.write_string_with_format(row, 0, "Unmatched Data", &formats.bold)?;
    row += 1;
    write_headers(sheet, row, &["Date", "Stock Price", "Index Price"], formats)?;
    for obs in &report.workings.unmatched {
        row += 1;
        sheet.write_datetime_with_format(row, 0, &excel_date(obs.date)?, &formats.date)?;
        write_price(sheet, row, 1, obs.asset_price, formats)?;
        write_price(sheet, row, 2, obs.benchmark_price, formats)?;
    }

    for col in 0..5 {
        sheet.set_column_width(col, COLUMN_WIDTH)?;
    }
    Ok(())
}

fn write_summary_sheet(
    sheet: &mut Worksheet,
    summary: &BetaSummary,
    formats: &Formats,
) -> Result<(), ExportError> {
    write_headers(sheet, 0, &["Stock Symbol", "Beta", "Error"], formats)?;

    let mut row = 0;
    for entry in &summary.entries {
        row += 1;
        sheet.write_string_with_format(row, 0, entry.symbol.as_str(), &formats.cell)?;
        match entry.beta() {
            Some(beta) => {
                sheet.write_number_with_format(row, 1, beta, &formats.beta)?;
            }
            None => {
                sheet.write_string_with_format(row, 1, "Insufficient Data", &formats.cell)?;
                sheet.write_string(row, 2, entry.error.as_deref().unwrap_or_default())?;
            }
        }
    }

    row += 2;
    sheet.write_string_with_format(row, 0, "Average Beta", &formats.bold)?;
    match summary.average_beta() {
        Some(average) => sheet.write_number_with_format(row, 1, average, &formats.beta)?,
        None => sheet.write_string_with_format(row, 1, "n/a", &formats.cell)?,
    };

    sheet.set_column_width(0, COLUMN_WIDTH)?;
    sheet.set_column_width(1, 12)?;
    sheet.set_column_width(2, 40)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use betacalc_estimator::{BetaResult, ReturnMode, Workings};

    fn workbook() -> Workbook {
        let result = BetaResult {
            value: 1.234_567,
            sample_size: 3,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(),
            mode: ReturnMode::Simple,
        };
        Workbook::from_reports(
            "^NSEI".into(),
            vec![
                BetaReport::success("TCS.NS".into(), "^NSEI".into(), result, Workings::default()),
                BetaReport::failure("GONE.NS".into(), "^NSEI".into(), "no data"),
            ],
        )
    }

    #[test]
    fn test_buffer_is_a_zip_package() {
        let bytes = workbook().to_xlsx_buffer().unwrap();
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_excel_date() {
        assert!(excel_date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()).is_ok());
        assert!(excel_date(NaiveDate::from_ymd_opt(-5, 1, 1).unwrap()).is_err());
    }
}
