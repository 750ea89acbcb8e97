//! betacalc CLI binary.
//!
//! Computes the Beta of stocks against a benchmark index from Yahoo Finance
//! daily prices.

mod config;
mod integration;

use betacalc::{BenchmarkIndex, BetaRequest, DateWindow};
use betacalc_data::PriceColumn;
use betacalc_data::yahoo::YahooQuoteProvider;
use betacalc_estimator::{Alignment, ReturnMode};
use betacalc_output::{ExportFormat, Exporter, TextReport, Workbook, WorkbookFormat};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use config::AppConfig;
use indicatif::{ProgressBar, ProgressStyle};
use integration::cache_manager;
use integration::data_pipeline::{FetchConfig, PipelineError, run_beta};
use serde_json::json;
use std::path::PathBuf;
use std::process;
use std::time::Duration as StdDuration;
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "betacalc")]
#[command(about = "Beta of stocks against a benchmark index", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute Beta for one or more stocks
    Beta {
        /// Stock symbols (e.g. RELIANCE.NS); commas also separate symbols
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Benchmark index symbol or preset name [env: BETACALC_BENCHMARK]
        #[arg(long, short = 'i')]
        index: Option<String>,

        /// Last date of a rolling window (default: today)
        #[arg(long, conflicts_with_all = ["start", "end"])]
        date: Option<NaiveDate>,

        /// Rolling window length in calendar days [env: BETACALC_WINDOW_DAYS]
        #[arg(long, conflicts_with_all = ["start", "end"])]
        days: Option<u32>,

        /// Start of an explicit date range
        #[arg(long, requires = "end")]
        start: Option<NaiveDate>,

        /// End of an explicit date range
        #[arg(long, requires = "start")]
        end: Option<NaiveDate>,

        /// Return calculation (simple or log)
        #[arg(long, default_value = "simple")]
        mode: ReturnMode,

        /// Forward-fill prices over dates only one series traded on
        #[arg(long)]
        forward_fill: bool,

        /// Use raw closes instead of adjusted closes
        #[arg(long)]
        unadjusted: bool,

        /// Disable caching (always fetch fresh data)
        #[arg(long)]
        no_cache: bool,

        /// Force refresh cached data
        #[arg(long)]
        refresh: bool,

        /// Write the workings (one sheet per stock plus a summary) to this path
        #[arg(long)]
        export: Option<PathBuf>,

        /// Workbook format for --export: xlsx, or csv/json/pretty-json for a
        /// directory of sheet files
        #[arg(long, default_value = "xlsx")]
        export_format: WorkbookFormat,

        /// Output format (text, markdown or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Inspect or clear the quote cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// List benchmark presets
    Benchmarks,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show cache location and contents
    Info {
        /// Also show the last recorded download for this symbol
        #[arg(long)]
        symbol: Option<String>,
    },

    /// Delete cached quotes
    Clear {
        /// Only clear this symbol
        #[arg(long)]
        symbol: Option<String>,
    },
}

/// How results are printed.
#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Markdown,
    Json,
}

impl OutputFormat {
    fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "markdown" | "md" => Self::Markdown,
            _ => Self::Text,
        }
    }
}

/// Options of the `beta` command after parsing.
struct BetaArgs {
    request: BetaRequest,
    fetch: FetchConfig,
    export: Option<PathBuf>,
    export_format: WorkbookFormat,
    output: OutputFormat,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = AppConfig::from_env();

    match cli.command {
        Commands::Beta {
            symbols,
            index,
            date,
            days,
            start,
            end,
            mode,
            forward_fill,
            unadjusted,
            no_cache,
            refresh,
            export,
            export_format,
            format,
        } => {
            let window = match (start, end) {
                (Some(start), Some(end)) => DateWindow::Range { start, end },
                _ => DateWindow::Rolling {
                    end: date.unwrap_or_else(|| Utc::now().date_naive()),
                    days: days.unwrap_or(config.window_days),
                },
            };
            let benchmark = index.unwrap_or_else(|| config.benchmark.clone());

            let request = BetaRequest::new(&symbols, &benchmark, window)
                .map_err(PipelineError::from)?
                .with_mode(mode)
                .with_alignment(if forward_fill {
                    Alignment::ForwardFill
                } else {
                    Alignment::Intersect
                })
                .with_price_column(if unadjusted {
                    PriceColumn::Close
                } else {
                    PriceColumn::AdjustedClose
                });

            let args = BetaArgs {
                request,
                fetch: FetchConfig {
                    use_cache: !no_cache,
                    force_refresh: refresh,
                },
                export,
                export_format,
                output: OutputFormat::parse(&format),
            };
            compute_beta(&config, args).await?;
        }
        Commands::Cache { action } => match action {
            CacheAction::Info { symbol } => print_cache_info(&config, symbol.as_deref())?,
            CacheAction::Clear { symbol } => clear_cache(&config, symbol.as_deref())?,
        },
        Commands::Benchmarks => list_benchmarks(),
    }

    Ok(())
}

async fn compute_beta(config: &AppConfig, args: BetaArgs) -> Result<(), PipelineError> {
    let request = &args.request;

    if args.output == OutputFormat::Text {
        print_banner(request);
    }

    let provider = YahooQuoteProvider::with_rate_limit(config.rate_limit)?;
    tracing::debug!(
        rate_limit = ?provider.rate_limit_delay(),
        concurrency = config.concurrency,
        "quote provider ready"
    );

    // Run uncached if the cache cannot be opened.
    let cache = if args.fetch.use_cache {
        match cache_manager::open_cache(&config.cache_path()) {
            Ok(cache) => Some(Mutex::new(cache)),
            Err(e) => {
                tracing::warn!(error = %e, "cache unavailable, fetching directly");
                None
            }
        }
    } else {
        None
    };

    let pb = ProgressBar::new(request.symbols().len() as u64);
    match ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        Ok(style) => pb.set_style(style.progress_chars("█▓░")),
        Err(e) => tracing::debug!(error = %e, "default progress style"),
    }
    pb.enable_steady_tick(StdDuration::from_millis(100));
    pb.set_message(format!("Fetching benchmark {}...", request.benchmark()));

    let workbook = match run_beta(
        &provider,
        cache.as_ref(),
        request,
        &args.fetch,
        config.concurrency,
        Some(&pb),
    )
    .await
    {
        Ok(workbook) => {
            pb.finish_and_clear();
            workbook
        }
        Err(e) => {
            pb.abandon_with_message("Failed!");
            return Err(e);
        }
    };

    match args.output {
        OutputFormat::Json => print_json(request, &workbook)?,
        OutputFormat::Markdown => print_markdown(&workbook),
        OutputFormat::Text => print_text(&workbook),
    }

    if let Some(target) = &args.export {
        let written = workbook.export(target, args.export_format)?;
        for path in &written {
            tracing::info!(path = %path.display(), "exported");
        }
        if args.output != OutputFormat::Json {
            println!("Exported {} file(s) to {}", written.len(), target.display());
        }
    }

    Ok(())
}

fn print_banner(request: &BetaRequest) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", format!("BETA vs {}", request.benchmark()));
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    match request.window() {
        DateWindow::Rolling { end, days } => {
            println!("Window:      {} days ending {}", days, end);
        }
        DateWindow::Range { .. } => {
            println!("Period:      {} to {}", request.start(), request.end());
        }
    }
    println!("Return mode: {}", request.mode());
    println!("Alignment:   {}", request.alignment());
    println!("Prices:      {}", request.price_column());
    println!();
}

fn print_text(workbook: &Workbook) {
    for report in workbook.reports() {
        print!("{}", report.to_ascii_table());
    }
    print!("{}", workbook.summary().to_ascii_table());
    println!();
}

fn print_markdown(workbook: &Workbook) {
    for report in workbook.reports() {
        println!("{}", report.to_markdown());
    }
    println!("{}", workbook.summary().to_markdown());
}

fn print_json(request: &BetaRequest, workbook: &Workbook) -> Result<(), PipelineError> {
    let summary = workbook.summary();
    let output = json!({
        "request": request,
        "reports": workbook.reports(),
        "summary": serde_json::from_str::<serde_json::Value>(
            &summary.export_to_string(ExportFormat::Json)?
        )?,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_cache_info(config: &AppConfig, symbol: Option<&str>) -> Result<(), PipelineError> {
    let path = config.cache_path();
    println!("Cache location: {}", path.display());

    if !path.exists() {
        println!("Cache is empty");
        return Ok(());
    }

    let cache = cache_manager::open_cache(&path)?;
    let stats = cache.get_stats()?;
    println!(
        "Cached data:    {} quotes for {} symbols ({} recorded downloads)",
        stats.total_quotes, stats.unique_symbols, stats.recorded_fetches
    );

    if let Some(symbol) = symbol {
        let symbol = symbol.trim().to_ascii_uppercase();
        match cache.last_fetch(&symbol)? {
            Some(fetch) => println!(
                "Last download:  {} covering {} to {} at {}",
                fetch.symbol,
                fetch.start,
                fetch.end,
                fetch.fetched_at.format("%Y-%m-%d %H:%M UTC")
            ),
            None => println!("No recorded download for {}", symbol),
        }
    }
    Ok(())
}

fn clear_cache(config: &AppConfig, symbol: Option<&str>) -> Result<(), PipelineError> {
    let cache = cache_manager::open_cache(&config.cache_path())?;

    match symbol {
        Some(symbol) => {
            let symbol = symbol.trim().to_ascii_uppercase();
            cache.clear_symbol(&symbol)?;
            println!("Cleared cached data for {}", symbol);
        }
        None => {
            cache.clear_all()?;
            println!("Cleared all cached data");
        }
    }
    Ok(())
}

fn list_benchmarks() {
    println!("Benchmark presets:");
    println!("==================\n");

    for index in BenchmarkIndex::all() {
        println!(
            "{:<10} {:<30} {}",
            index.symbol(),
            index.name(),
            index.aliases().join(", ")
        );
    }
    println!("\nAny other Yahoo Finance symbol is accepted as-is.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert!(OutputFormat::parse("JSON") == OutputFormat::Json);
        assert!(OutputFormat::parse("md") == OutputFormat::Markdown);
        assert!(OutputFormat::parse("markdown") == OutputFormat::Markdown);
        assert!(OutputFormat::parse("text") == OutputFormat::Text);
    }

    #[test]
    fn test_export_defaults_to_xlsx() {
        let cli = Cli::try_parse_from(["betacalc", "beta", "TCS.NS", "--export", "out.xlsx"])
            .unwrap();
        match cli.command {
            Commands::Beta { export, export_format, .. } => {
                assert_eq!(export, Some(PathBuf::from("out.xlsx")));
                assert_eq!(export_format, WorkbookFormat::Xlsx);
            }
            _ => panic!("expected beta command"),
        }
    }

    #[test]
    fn test_cache_info_symbol() {
        let cli = Cli::try_parse_from(["betacalc", "cache", "info", "--symbol", "tcs.ns"]).unwrap();
        match cli.command {
            Commands::Cache {
                action: CacheAction::Info { symbol },
            } => assert_eq!(symbol.as_deref(), Some("tcs.ns")),
            _ => panic!("expected cache info"),
        }
    }
}
