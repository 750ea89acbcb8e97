//! Fetch pipeline for a Beta run.
//!
//! The benchmark is loaded once, then every stock is loaded concurrently and
//! estimated against it. Quotes come from the SQLite cache when a recorded
//! download covers the window, otherwise from Yahoo Finance.

use betacalc::BetaRequest;
use betacalc_data::error::DataError;
use betacalc_data::yahoo::YahooQuoteProvider;
use betacalc_data::{SqliteCache, price_series_from_quotes};
use betacalc_estimator::PriceSeries;
use betacalc_output::{BetaReport, ExportError, Workbook};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use polars::prelude::*;
use tokio::sync::Mutex;

/// Error type for data pipeline operations.
#[derive(Debug, thiserror::Error)]
pub(crate) enum PipelineError {
    /// The benchmark could not be loaded, so no stock can be estimated.
    #[error("Failed to load benchmark {symbol}: {source}")]
    Benchmark {
        /// Benchmark symbol.
        symbol: String,
        /// Underlying failure.
        source: DataError,
    },

    /// Data or cache error.
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    Request(#[from] betacalc::RequestError),

    /// Export error.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// JSON rendering error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration for data fetching.
#[derive(Debug, Clone)]
pub(crate) struct FetchConfig {
    /// Whether to use the cache.
    pub use_cache: bool,
    /// Whether to force refresh (ignore cache).
    pub force_refresh: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            use_cache: true,
            force_refresh: false,
        }
    }
}

/// Midnight UTC at the start of `date`.
fn day_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Last date whose daily bar is final. Today's bar can still move.
fn settled_end(end: NaiveDate, today: NaiveDate) -> NaiveDate {
    end.min(today.pred_opt().unwrap_or(today))
}

/// Store fetched quotes and record the settled part of `[start, end]` as
/// covered.
fn cache_quotes(
    cache: &SqliteCache,
    symbol: &str,
    df: &DataFrame,
    start: NaiveDate,
    end: NaiveDate,
    today: NaiveDate,
) -> Result<(), DataError> {
    cache.put_quotes(df)?;

    let covered_to = settled_end(end, today);
    if covered_to < start {
        tracing::debug!(symbol, %start, %end, "window not settled, coverage not recorded");
        return Ok(());
    }
    cache.record_fetch(symbol, start, covered_to)
}

/// Fetch a single symbol's quotes for `[start, end]` with caching support.
pub(crate) async fn fetch_symbol_data(
    provider: &YahooQuoteProvider,
    cache: Option<&Mutex<SqliteCache>>,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    config: &FetchConfig,
) -> Result<DataFrame, DataError> {
    // Try cache first if enabled
    if config.use_cache
        && !config.force_refresh
        && let Some(cache) = cache
    {
        let cache = cache.lock().await;
        match cache.has_quotes(symbol, start, end) {
            Ok(true) => match cache.get_quotes(symbol, start, end) {
                Ok(df) => {
                    tracing::debug!(symbol, %start, %end, rows = df.height(), "cache hit");
                    return Ok(df);
                }
                Err(e) => tracing::warn!(symbol, error = %e, "cached quotes unreadable"),
            },
            Ok(false) => tracing::debug!(symbol, %start, %end, "cache miss"),
            Err(e) => tracing::warn!(symbol, error = %e, "cache lookup failed"),
        }
    }

    // Yahoo's end bound is exclusive, so ask for the day after `end`.
    let fetch_end = end.succ_opt().unwrap_or(end);
    let df = provider
        .fetch_quotes(symbol, day_start(start), day_start(fetch_end))
        .await?;

    // Cache the result
    if config.use_cache
        && let Some(cache) = cache
    {
        let cache = cache.lock().await;
        let today = Utc::now().date_naive();
        if let Err(e) = cache_quotes(&cache, symbol, &df, start, end, today) {
            tracing::warn!(symbol, error = %e, "failed to cache quotes");
        }
    }

    Ok(df)
}

/// Load the price series `request` asks for.
pub(crate) async fn load_price_series(
    provider: &YahooQuoteProvider,
    cache: Option<&Mutex<SqliteCache>>,
    symbol: &str,
    request: &BetaRequest,
    config: &FetchConfig,
) -> Result<PriceSeries, DataError> {
    let df = fetch_symbol_data(
        provider,
        cache,
        symbol,
        request.start(),
        request.end(),
        config,
    )
    .await?;
    price_series_from_quotes(&df, request.price_column())
}

/// Estimate one stock against the loaded benchmark.
///
/// A stock that failed to load becomes a failed report.
pub(crate) fn build_report(
    symbol: &str,
    loaded: Result<PriceSeries, DataError>,
    benchmark: &PriceSeries,
    request: &BetaRequest,
) -> BetaReport {
    match loaded {
        Ok(asset) => {
            let estimator = request.estimator();
            let outcome = estimator.estimate(&asset, benchmark);
            if let Err(e) = &outcome {
                tracing::warn!(symbol, error = %e, "beta not computed");
            }
            BetaReport::from_outcome(
                symbol.to_string(),
                request.benchmark().to_string(),
                outcome,
                estimator.workings(&asset, benchmark),
            )
        }
        Err(e) => {
            tracing::warn!(symbol, error = %e, "skipping symbol");
            BetaReport::failure(
                symbol.to_string(),
                request.benchmark().to_string(),
                e.to_string(),
            )
        }
    }
}

/// Run the whole request.
///
/// Only a benchmark failure is fatal. Reports keep the request's symbol
/// order regardless of completion order.
pub(crate) async fn run_beta(
    provider: &YahooQuoteProvider,
    cache: Option<&Mutex<SqliteCache>>,
    request: &BetaRequest,
    config: &FetchConfig,
    concurrency: usize,
    progress: Option<&ProgressBar>,
) -> Result<Workbook, PipelineError> {
    let benchmark_symbol = request.benchmark();
    let benchmark = load_price_series(provider, cache, benchmark_symbol, request, config)
        .await
        .map_err(|source| PipelineError::Benchmark {
            symbol: benchmark_symbol.to_string(),
            source,
        })?;
    tracing::info!(
        benchmark = benchmark_symbol,
        prices = benchmark.len(),
        "benchmark loaded"
    );

    if let Some(pb) = progress {
        pb.set_length(request.symbols().len() as u64);
        pb.set_message(format!(
            "Fetching {} symbols ({} concurrent)...",
            request.symbols().len(),
            concurrency
        ));
    }

    let mut loaded: Vec<(usize, Result<PriceSeries, DataError>)> =
        stream::iter(request.symbols().iter().enumerate())
            .map(|(idx, symbol)| async move {
                (
                    idx,
                    load_price_series(provider, cache, symbol, request, config).await,
                )
            })
            .buffer_unordered(concurrency.max(1))
            .inspect(|_| {
                if let Some(pb) = progress {
                    pb.inc(1);
                }
            })
            .collect()
            .await;
    loaded.sort_by_key(|(idx, _)| *idx);

    let reports = loaded
        .into_iter()
        .map(|(idx, series)| {
            build_report(&request.symbols()[idx], series, &benchmark, request)
        })
        .collect();

    Ok(Workbook::from_reports(benchmark_symbol.to_string(), reports))
}
