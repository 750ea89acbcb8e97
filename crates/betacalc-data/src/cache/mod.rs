//! Caching layer for market data.

pub mod sqlite;

pub use sqlite::{CacheStats, FetchRecord, SqliteCache};
