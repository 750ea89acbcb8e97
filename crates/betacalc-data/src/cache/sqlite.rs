//! SQLite caching layer for quote data.
//!
//! Quotes are stored per (symbol, date). Each completed download is also
//! recorded in `fetch_log` with the date range it covered, and that range is
//! the cache key: a request is served from cache only if a logged fetch for
//! the symbol spans it.

use crate::error::{DataError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use polars::prelude::*;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

/// SQLite cache for market data.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Connection,
}

/// A recorded download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRecord {
    /// Symbol downloaded.
    pub symbol: String,
    /// First requested date.
    pub start: NaiveDate,
    /// Last requested date.
    pub end: NaiveDate,
    /// When the download completed.
    pub fetched_at: DateTime<Utc>,
}

impl SqliteCache {
    /// Create a new SQLite cache.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS quotes (
                symbol TEXT NOT NULL,
                date TEXT NOT NULL,
                open REAL NOT NULL,
                high REAL NOT NULL,
                low REAL NOT NULL,
                close REAL NOT NULL,
                volume INTEGER NOT NULL,
                adjusted_close REAL NOT NULL,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (symbol, date)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_quotes_symbol_date ON quotes(symbol, date)",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS fetch_log (
                symbol TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                fetched_at TEXT NOT NULL,
                PRIMARY KEY (symbol, start_date, end_date)
            )",
            [],
        )?;

        Ok(())
    }

    /// Check if a recorded download for `symbol` covers `[start, end]`.
    pub fn has_quotes(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM fetch_log
             WHERE symbol = ?1 AND start_date <= ?2 AND end_date >= ?3",
            params![symbol, start.to_string(), end.to_string()],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    /// Get cached quotes for a symbol and date range.
    pub fn get_quotes(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<DataFrame> {
        let mut stmt = self.conn.prepare(
            "SELECT symbol, date, open, high, low, close, volume, adjusted_close
             FROM quotes
             WHERE symbol = ?1 AND date >= ?2 AND date <= ?3
             ORDER BY date ASC",
        )?;

        let mut symbols = Vec::new();
        let mut dates = Vec::new();
        let mut opens = Vec::new();
        let mut highs = Vec::new();
        let mut lows = Vec::new();
        let mut closes = Vec::new();
        let mut volumes = Vec::new();
        let mut adj_closes = Vec::new();

        let rows = stmt.query_map(params![symbol, start.to_string(), end.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, f64>(5)?,
                row.get::<_, i64>(6)?,
                row.get::<_, f64>(7)?,
            ))
        })?;

        for row in rows {
            let (sym, date, open, high, low, close, volume, adj_close) = row?;
            symbols.push(sym);
            dates.push(date);
            opens.push(open);
            highs.push(high);
            lows.push(low);
            closes.push(close);
            volumes.push(volume.max(0) as u64);
            adj_closes.push(adj_close);
        }

        if dates.is_empty() {
            return Err(DataError::MissingData {
                symbol: symbol.to_string(),
                reason: "No cached data found".to_string(),
            });
        }

        let df = DataFrame::new(vec![
            Series::new("symbol".into(), symbols).into(),
            Series::new("date".into(), dates).into(),
            Series::new("open".into(), opens).into(),
            Series::new("high".into(), highs).into(),
            Series::new("low".into(), lows).into(),
            Series::new("close".into(), closes).into(),
            Series::new("volume".into(), volumes).into(),
            Series::new("adjusted_close".into(), adj_closes).into(),
        ])?;

        // Convert date strings to Date type
        let df = df
            .lazy()
            .with_column(col("date").cast(DataType::Date))
            .collect()?;

        Ok(df)
    }

    /// Store quotes in the cache.
    pub fn put_quotes(&self, df: &DataFrame) -> Result<()> {
        let cached_at = Utc::now().to_rfc3339();

        let symbols = df.column("symbol")?.str()?;
        let dates = df.column("date")?.cast(&DataType::String)?;
        let dates = dates.str()?;
        let opens = df.column("open")?.f64()?;
        let highs = df.column("high")?.f64()?;
        let lows = df.column("low")?.f64()?;
        let closes = df.column("close")?.f64()?;
        let volumes = df.column("volume")?.cast(&DataType::Int64)?;
        let volumes = volumes.i64()?;
        let adj_closes = df.column("adjusted_close")?.f64()?;

        let tx = self.conn.unchecked_transaction()?;

        for i in 0..df.height() {
            let symbol = symbols
                .get(i)
                .ok_or_else(|| DataError::Parse("Missing symbol".to_string()))?;
            let date = dates
                .get(i)
                .ok_or_else(|| DataError::Parse("Missing date".to_string()))?;
            let close = closes
                .get(i)
                .ok_or_else(|| DataError::Parse("Missing close".to_string()))?;
            let adj_close = adj_closes
                .get(i)
                .ok_or_else(|| DataError::Parse("Missing adjusted_close".to_string()))?;
            // Indices often report no volume and partial OHLC; fall back to the close.
            let open = opens.get(i).unwrap_or(close);
            let high = highs.get(i).unwrap_or(close);
            let low = lows.get(i).unwrap_or(close);
            let volume = volumes.get(i).unwrap_or(0);

            tx.execute(
                "INSERT OR REPLACE INTO quotes
                 (symbol, date, open, high, low, close, volume, adjusted_close, cached_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    symbol, date, open, high, low, close, volume, adj_close, cached_at
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Record that `symbol` was downloaded for `[start, end]`.
    pub fn record_fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<()> {
        if start > end {
            return Err(DataError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        self.conn.execute(
            "INSERT OR REPLACE INTO fetch_log (symbol, start_date, end_date, fetched_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                symbol,
                start.to_string(),
                end.to_string(),
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    /// Most recent download recorded for `symbol`.
    pub fn last_fetch(&self, symbol: &str) -> Result<Option<FetchRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT symbol, start_date, end_date, fetched_at FROM fetch_log
                 WHERE symbol = ?1
                 ORDER BY fetched_at DESC
                 LIMIT 1",
                params![symbol],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(symbol, start, end, fetched_at)| {
            Ok(FetchRecord {
                symbol,
                start: parse_date(&start)?,
                end: parse_date(&end)?,
                fetched_at: DateTime::parse_from_rfc3339(&fetched_at)
                    .map_err(|e| DataError::Parse(e.to_string()))?
                    .with_timezone(&Utc),
            })
        })
        .transpose()
    }

    /// Clear all cached data.
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM quotes", [])?;
        self.conn.execute("DELETE FROM fetch_log", [])?;
        Ok(())
    }

    /// Clear cached data for a specific symbol.
    pub fn clear_symbol(&self, symbol: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM quotes WHERE symbol = ?1", params![symbol])?;
        self.conn
            .execute("DELETE FROM fetch_log WHERE symbol = ?1", params![symbol])?;
        Ok(())
    }

    /// Get cache statistics.
    pub fn get_stats(&self) -> Result<CacheStats> {
        let quotes_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM quotes", [], |row| row.get(0))?;

        let symbols_count: i64 =
            self.conn
                .query_row("SELECT COUNT(DISTINCT symbol) FROM quotes", [], |row| {
                    row.get(0)
                })?;

        let fetches_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM fetch_log", [], |row| row.get(0))?;

        Ok(CacheStats {
            total_quotes: quotes_count as usize,
            unique_symbols: symbols_count as usize,
            recorded_fetches: fetches_count as usize,
        })
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| DataError::Parse(e.to_string()))
}

/// Cache statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of quote records
    pub total_quotes: usize,
    /// Number of unique symbols
    pub unique_symbols: usize,
    /// Number of recorded downloads
    pub recorded_fetches: usize,
}
