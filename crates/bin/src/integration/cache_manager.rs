//! Cache location and opening.

use betacalc_data::cache::SqliteCache;
use betacalc_data::error::DataError;
use std::path::{Path, PathBuf};

const CACHE_FILE: &str = "betacalc.db";

/// Get the default cache directory path.
///
/// Uses platform-specific cache directories:
/// - Linux: `~/.cache/betacalc/`
/// - macOS: `~/Library/Caches/betacalc/`
/// - Windows: `%LOCALAPPDATA%\betacalc\`
pub(crate) fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("betacalc")
}

/// Cache database path inside `dir`.
pub(crate) fn cache_path(dir: &Path) -> PathBuf {
    dir.join(CACHE_FILE)
}

/// Open the cache at `path`, creating its directory if needed.
pub(crate) fn open_cache(path: &Path) -> Result<SqliteCache, DataError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    SqliteCache::new(path)
}
