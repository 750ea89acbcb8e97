//! Runtime configuration from environment variables.
//!
//! Command-line flags override these values.

use betacalc::DEFAULT_BENCHMARK;
use betacalc_data::yahoo::DEFAULT_RATE_LIMIT;
use std::path::PathBuf;
use std::time::Duration;

use crate::integration::cache_manager;

const DEFAULT_CONCURRENCY: usize = 4;
const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Settings shared by every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AppConfig {
    /// Directory holding the SQLite cache.
    pub cache_dir: PathBuf,
    /// Benchmark used when `--index` is absent.
    pub benchmark: String,
    /// Delay after each Yahoo request.
    pub rate_limit: Duration,
    /// Concurrent stock downloads.
    pub concurrency: usize,
    /// Rolling window length when `--days` is absent.
    pub window_days: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_dir: cache_manager::default_cache_dir(),
            benchmark: DEFAULT_BENCHMARK.to_string(),
            rate_limit: DEFAULT_RATE_LIMIT,
            concurrency: DEFAULT_CONCURRENCY,
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

impl AppConfig {
    /// Read `BETACALC_*` variables from the process environment.
    pub(crate) fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Blank or unparsable values fall back
    /// to the defaults.
    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let env_str = |name: &str| {
            lookup(name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let rate_limit_ms = env_str("BETACALC_RATE_LIMIT_MS").and_then(|s| s.parse::<u64>().ok());

        Self {
            cache_dir: env_str("BETACALC_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            benchmark: env_str("BETACALC_BENCHMARK").unwrap_or(defaults.benchmark),
            rate_limit: rate_limit_ms.map_or(defaults.rate_limit, Duration::from_millis),
            concurrency: env_str("BETACALC_CONCURRENCY")
                .and_then(|s| s.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.concurrency),
            window_days: env_str("BETACALC_WINDOW_DAYS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.window_days),
        }
    }

    /// Path of the cache database.
    pub(crate) fn cache_path(&self) -> PathBuf {
        cache_manager::cache_path(&self.cache_dir)
    }
}
