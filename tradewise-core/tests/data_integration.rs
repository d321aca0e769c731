//! Integration tests for the data path: raw rows, synthetic provider, cache and CSV export.

use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use tradewise_core::data::{CachedHistory, HistoryProvider, RawBar, SyntheticProvider};
use tradewise_core::domain::PriceSeries;
use tradewise_core::export::{export_filename, save_csv, write_csv};
use tradewise_core::window::Window;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn row(date: NaiveDate, close: Option<f64>) -> RawBar {
    RawBar {
        date,
        open: close,
        high: close.map(|c| c + 1.0),
        low: close.map(|c| c - 1.0),
        close,
        volume: close.map(|_| 500),
    }
}

#[test]
fn raw_rows_canonicalize_into_valid_series() {
    let raw = vec![
        row(d(2024, 1, 5), Some(12.0)),
        row(d(2024, 1, 1), None), // holiday
        row(d(2024, 1, 2), Some(10.0)),
        row(d(2024, 1, 3), Some(11.0)),
        row(d(2024, 1, 3), Some(99.0)), // duplicate
    ];
    let series = PriceSeries::from_raw("SPY", raw);
    assert_eq!(series.dates(), vec![d(2024, 1, 2), d(2024, 1, 3), d(2024, 1, 5)]);
    // The strict constructor accepts what canonicalization produced.
    assert!(PriceSeries::new("SPY", series.bars().to_vec()).is_ok());
}

#[test]
fn synthetic_year_has_trading_days_only() {
    let provider = SyntheticProvider::new(42);
    let series = provider.fetch_history("SPY", d(2024, 1, 1), d(2025, 1, 1)).unwrap();

    // 2024 has 262 weekdays
    assert_eq!(series.len(), 262);
    assert_eq!(series.first_date().unwrap().year(), 2024);
    assert_eq!(series.last_date().unwrap(), d(2024, 12, 31));
    for pair in series.bars().windows(2) {
        assert!(pair[0].date < pair[1].date);
    }
}

#[test]
fn ytd_window_on_synthetic_data() {
    let provider = SyntheticProvider::new(42);
    let series = provider.fetch_history("QQQ", d(2023, 6, 1), d(2024, 2, 1)).unwrap();
    let ytd = Window::YearToDate.filter(&series);
    assert!(!ytd.is_empty());
    assert!(ytd.dates().iter().all(|date| date.year() == 2024));
}

#[test]
fn cached_provider_returns_identical_series() {
    let cached = CachedHistory::new(
        std::sync::Arc::new(SyntheticProvider::new(3)),
        Duration::from_secs(60),
    );
    let a = cached.fetch_history("AAPL", d(2024, 1, 1), d(2024, 4, 1)).unwrap();
    let b = cached.fetch_history("AAPL", d(2024, 1, 1), d(2024, 4, 1)).unwrap();
    assert_eq!(a, b);
    assert_eq!(cached.cache().len(), 1);
}

#[test]
fn csv_export_writes_named_file() {
    let series = SyntheticProvider::new(1)
        .fetch_history("MSFT", d(2024, 1, 1), d(2024, 2, 1))
        .unwrap();
    let dir = tempfile::tempdir().unwrap();

    let path = save_csv(&series, dir.path()).unwrap();
    assert_eq!(path.file_name().unwrap().to_str().unwrap(), export_filename("MSFT"));

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["Date", "Open", "High", "Low", "Close", "Volume"]
    );
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), series.len());
    assert_eq!(&rows[0][0], "2024-01-01");
    let close: f64 = rows[0][4].parse().unwrap();
    assert_eq!(close, series.bars()[0].close);
}

#[test]
fn csv_export_to_buffer_matches_file() {
    let series = SyntheticProvider::new(1)
        .fetch_history("MSFT", d(2024, 1, 1), d(2024, 1, 10))
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = save_csv(&series, dir.path()).unwrap();

    let mut buf = Vec::new();
    write_csv(&series, &mut buf).unwrap();
    assert_eq!(std::fs::read(path).unwrap(), buf);
}
