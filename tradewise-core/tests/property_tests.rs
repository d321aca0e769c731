//! Property tests for the numeric pipeline.
//!
//! Uses proptest to verify:
//! 1. Window nesting: a shorter window is a suffix of a longer one
//! 2. RSI bounds: every defined RSI value lies in [0, 100]
//! 3. RSI/alert agreement: the alerted RSI is the last charted RSI
//! 4. SMA with too little history is undefined and never panics
//! 5. MACD identity: histogram = MACD − signal wherever defined
//! 6. Price alert threshold semantics

use proptest::prelude::*;
use tradewise_core::alerts::{evaluate, AlertConditions, AlertKind, AlertStatus};
use tradewise_core::chart::{ChartBuilder, TraceData};
use tradewise_core::config::Palette;
use tradewise_core::domain::{Bar, PriceSeries};
use tradewise_core::indicators::IndicatorEngine;
use tradewise_core::window::Window;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_close() -> impl Strategy<Value = f64> {
    (1.0..1000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

/// Series with 1..=max bars, gaps of 1..=4 days between bars.
fn arb_series(max: usize) -> impl Strategy<Value = PriceSeries> {
    prop::collection::vec((arb_close(), 1..=4_i64), 1..=max).prop_map(|rows| {
        let mut date = chrono::NaiveDate::from_ymd_opt(2018, 1, 2).unwrap();
        let bars = rows
            .into_iter()
            .map(|(close, gap)| {
                date += chrono::Duration::days(gap);
                Bar {
                    date,
                    open: close,
                    high: close + 1.0,
                    low: (close - 1.0).max(0.5),
                    close,
                    volume: 1_000,
                }
            })
            .collect();
        PriceSeries::new("PROP", bars).unwrap()
    })
}

/// Windows ordered from narrowest to widest cutoff.
const NESTED: [Window; 6] = [
    Window::FiveDays,
    Window::OneMonth,
    Window::SixMonths,
    Window::OneYear,
    Window::FiveYears,
    Window::Max,
];

// ── 1. Window nesting ────────────────────────────────────────────────

proptest! {
    #[test]
    fn narrower_window_is_suffix_of_wider(series in arb_series(600), i in 0..6usize, j in 0..6usize) {
        let (narrow, wide) = (NESTED[i.min(j)], NESTED[i.max(j)]);
        let a = narrow.filter(&series);
        let b = wide.filter(&series);
        prop_assert!(a.len() <= b.len());
        prop_assert_eq!(a.bars(), &b.bars()[b.len() - a.len()..]);
    }

    #[test]
    fn ytd_is_within_one_year(series in arb_series(600)) {
        let ytd = Window::YearToDate.filter(&series);
        let year = Window::OneYear.filter(&series);
        prop_assert!(ytd.len() <= year.len());
    }

    #[test]
    fn full_windows_keep_everything(series in arb_series(200), tag in "[a-z0-9]{0,4}") {
        let window = Window::from_tag(&tag);
        if window.is_full() {
            prop_assert_eq!(window.filter(&series).len(), series.len());
        }
    }
}

// ── 2 & 3. RSI ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn rsi_within_bounds(series in arb_series(300)) {
        let rsi = IndicatorEngine::rsi(&series);
        prop_assert_eq!(rsi.len(), series.len());
        for (_, v) in rsi.points() {
            prop_assert!((0.0..=100.0).contains(&v), "rsi out of bounds: {}", v);
        }
        if series.len() >= 15 {
            prop_assert!(rsi.last_defined().is_some());
        } else {
            prop_assert!(rsi.is_all_undefined());
        }
    }

    #[test]
    fn alerted_rsi_is_last_charted_rsi(series in arb_series(300), threshold in 1.0..100.0_f64) {
        let rsi = IndicatorEngine::rsi(&series);
        let palette = Palette::default();
        let chart = ChartBuilder::new(&palette, Window::Max).rsi_chart(&rsi);
        let charted = match &chart.traces[0].data {
            TraceData::Line(points) => points.last().map(|p| p.1),
            _ => None,
        };
        prop_assert_eq!(charted.map(f64::to_bits), rsi.last_defined().map(f64::to_bits));

        let close = series.latest_close().unwrap();
        let status = evaluate("PROP", close, rsi.last_defined(), &AlertConditions::new(0.0, threshold));
        let fired = status.triggered().iter().any(|a| a.kind == AlertKind::Rsi);
        prop_assert_eq!(fired, charted.is_some_and(|v| v <= threshold));
    }
}

// ── 4. SMA ───────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn sma_longer_than_series_is_undefined(series in arb_series(100), extra in 1..50usize) {
        let sma = IndicatorEngine::sma(&series, series.len() + extra);
        prop_assert_eq!(sma.len(), series.len());
        prop_assert!(sma.is_all_undefined());
    }

    #[test]
    fn sma_defined_count(series in arb_series(300), period in 5..=200usize) {
        let sma = IndicatorEngine::sma(&series, period);
        let expected = series.len().saturating_sub(period - 1);
        prop_assert_eq!(sma.defined_count(), expected);
    }
}

// ── 5. MACD ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn macd_histogram_identity(series in arb_series(300)) {
        let macd = IndicatorEngine::macd(&series);
        for i in 0..series.len() {
            if let (Some(m), Some(s), Some(h)) = (macd.macd.get(i), macd.signal.get(i), macd.histogram.get(i)) {
                prop_assert!((h - (m - s)).abs() < 1e-9);
            }
        }
    }
}

// ── 6. Price alert ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn price_alert_fires_iff_close_at_or_above(close in arb_close(), threshold in 0.0..1000.0_f64) {
        let status = evaluate("PROP", close, None, &AlertConditions::new(threshold, 0.0));
        let should_fire = threshold > 0.0 && close >= threshold;
        prop_assert_eq!(!status.triggered().is_empty(), should_fire);
        if !should_fire {
            prop_assert_eq!(status, AlertStatus::Clear);
        }
    }

    #[test]
    fn zero_price_threshold_never_fires(close in arb_close()) {
        let status = evaluate("PROP", close, None, &AlertConditions::new(0.0, 0.0));
        prop_assert_eq!(status, AlertStatus::Clear);
    }
}
