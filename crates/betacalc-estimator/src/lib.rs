#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/betacalc/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod align;
pub mod beta;
pub mod error;
pub mod series;
pub mod stats;
pub mod summary;
pub mod workings;

pub use align::{AlignedReturns, Alignment, align, forward_fill};
pub use beta::{
    BetaEstimator, BetaResult, MIN_BENCHMARK_VARIANCE, beta_from_aligned, estimate_beta,
    estimate_beta_from_returns,
};
pub use error::{BetaError, Result, SeriesRole};
pub use series::{PricePoint, PriceSeries, ReturnMode, ReturnPoint, ReturnSeries};
pub use summary::{BetaSummary, SummaryEntry};
pub use workings::{AlignedObservation, UnmatchedObservation, Workings};
