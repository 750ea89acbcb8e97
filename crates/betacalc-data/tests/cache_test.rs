//! Integration tests for the quote cache feeding price series.

use betacalc_data::{PriceColumn, SqliteCache, price_series_from_quotes};
use chrono::NaiveDate;
use polars::prelude::*;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
}

fn index_quotes() -> DataFrame {
    let closes = vec![21_700.0, 21_850.5, 21_780.0, 21_900.25];
    let adj = vec![21_700.0, 21_850.5, 21_780.0, 21_900.25];
    DataFrame::new(vec![
        Series::new("symbol".into(), vec!["^NSEI"; 4]).into(),
        Series::new(
            "date".into(),
            vec!["2024-02-05", "2024-02-06", "2024-02-07", "2024-02-08"],
        )
        .into(),
        Series::new("open".into(), vec![None, Some(21_800.0), None, None]).into(),
        Series::new("high".into(), vec![None::<f64>; 4]).into(),
        Series::new("low".into(), vec![None::<f64>; 4]).into(),
        Series::new("close".into(), closes).into(),
        Series::new("volume".into(), vec![None::<u64>; 4]).into(),
        Series::new("adjusted_close".into(), adj).into(),
    ])
    .unwrap()
    .lazy()
    .with_column(col("date").cast(DataType::Date))
    .collect()
    .unwrap()
}

#[test]
fn test_cached_index_survives_reopen() {
    let dir = std::env::temp_dir().join(format!("betacalc-data-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("cache.db");

    {
        let cache = SqliteCache::new(&path).unwrap();
        cache.put_quotes(&index_quotes()).unwrap();
        cache.record_fetch("^NSEI", date(5), date(8)).unwrap();
    }

    let cache = SqliteCache::new(&path).unwrap();
    assert!(cache.has_quotes("^NSEI", date(6), date(8)).unwrap());
    assert!(!cache.has_quotes("^NSEI", date(1), date(8)).unwrap());

    let df = cache.get_quotes("^NSEI", date(6), date(8)).unwrap();
    let series = price_series_from_quotes(&df, PriceColumn::AdjustedClose).unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series.first_date(), Some(date(6)));

    let stats = cache.get_stats().unwrap();
    assert_eq!(stats.total_quotes, 4);
    assert_eq!(stats.unique_symbols, 1);
    assert_eq!(stats.recorded_fetches, 1);

    drop(cache);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_clear_symbol_drops_coverage() {
    let cache = SqliteCache::in_memory().unwrap();
    cache.put_quotes(&index_quotes()).unwrap();
    cache.record_fetch("^NSEI", date(5), date(8)).unwrap();

    cache.clear_symbol("^NSEI").unwrap();

    assert!(!cache.has_quotes("^NSEI", date(5), date(8)).unwrap());
    assert!(cache.last_fetch("^NSEI").unwrap().is_none());
    assert_eq!(cache.get_stats().unwrap().total_quotes, 0);
}
