#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/betacalc/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod report;
pub mod workbook;
pub mod xlsx;

pub use export::{BetaReport, ExportError, ExportFormat, Exporter};
pub use report::TextReport;
pub use workbook::{MAX_SHEET_NAME_LEN, Workbook, WorkbookFormat, sanitize_sheet_name};
