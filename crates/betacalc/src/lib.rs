#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/betacalc/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod benchmark;
pub mod request;

// Re-export main types from sub-crates
pub use betacalc_data as data;
pub use betacalc_estimator as estimator;
pub use betacalc_output as output;

pub use benchmark::{BenchmarkIndex, DEFAULT_BENCHMARK, resolve_benchmark};
pub use request::{BetaRequest, DateWindow, MAX_WINDOW_DAYS, RequestError, normalize_symbols};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
