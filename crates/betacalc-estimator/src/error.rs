//! Error types for beta estimation.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for estimation operations.
pub type Result<T> = std::result::Result<T, BetaError>;

/// Which input an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesRole {
    /// The stock being measured.
    Asset,
    /// The reference index.
    Benchmark,
    /// The aligned return pairs.
    Aligned,
}

impl fmt::Display for SeriesRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Asset => "asset",
            Self::Benchmark => "benchmark",
            Self::Aligned => "aligned sample",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by the beta estimator.
///
/// Every variant is terminal for the invocation; nothing is retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BetaError {
    /// A series is too short to derive returns or statistics from.
    #[error("not enough price history for {role}: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Series that was too short
        role: SeriesRole,
        /// Minimum number of observations
        required: usize,
        /// Observations available
        actual: usize,
    },

    /// Asset and benchmark share no dates.
    #[error("no overlapping trading days in range")]
    NoOverlap,

    /// Benchmark returns are constant over the window.
    #[error("benchmark has no variance over this window")]
    DegenerateVariance,

    /// Input violates series invariants (ordering, duplicates, non-positive prices).
    #[error("invalid series: {0}")]
    InvalidSeries(String),

    /// Unrecognised estimator parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
