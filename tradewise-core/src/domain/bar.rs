//! Bar and PriceSeries, the shared input to every downstream computation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::data::provider::RawBar;

/// OHLCV bar for a single trading day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Returns true if any price field is NaN (void bar).
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Open, high, low and close are all finite and strictly positive.
    pub fn has_valid_prices(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|p| p.is_finite() && *p > 0.0)
    }
}

/// Construction errors for a strictly validated `PriceSeries`.
#[derive(Debug, Error, PartialEq)]
pub enum BarError {
    #[error("bar dates not strictly increasing at index {index}: {prev} then {next}")]
    OutOfOrder {
        index: usize,
        prev: NaiveDate,
        next: NaiveDate,
    },

    #[error("void bar (missing price) on {date}")]
    VoidBar { date: NaiveDate },

    #[error("non-positive or infinite price on {date}")]
    InvalidPrice { date: NaiveDate },
}

/// Ordered, date-indexed OHLCV table for one ticker.
///
/// Invariant: dates strictly increasing, every bar carries all five fields and
/// its four prices are positive.
/// Immutable once built; windows and tails produce new series or slices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Build a series from bars that are already clean. Rejects unordered,
    /// void or non-positive input.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, BarError> {
        for (i, bar) in bars.iter().enumerate() {
            if bar.is_void() {
                return Err(BarError::VoidBar { date: bar.date });
            }
            if !bar.has_valid_prices() {
                return Err(BarError::InvalidPrice { date: bar.date });
            }
            if i > 0 && bars[i - 1].date >= bar.date {
                return Err(BarError::OutOfOrder {
                    index: i,
                    prev: bars[i - 1].date,
                    next: bar.date,
                });
            }
        }
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    /// An empty series, the "no data" state.
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    /// Canonicalize raw provider rows: sort ascending, drop rows missing every field,
    /// drop rows missing any price or carrying a non-positive one, keep the first
    /// row of a duplicated date.
    pub fn from_raw(symbol: impl Into<String>, mut raw: Vec<RawBar>) -> Self {
        let symbol = symbol.into();
        raw.sort_by_key(|r| r.date);

        let mut bars: Vec<Bar> = Vec::with_capacity(raw.len());
        let mut partial = 0usize;
        let mut invalid = 0usize;
        let mut duplicates = 0usize;

        for row in raw {
            if row.is_blank() {
                continue;
            }
            let Some(bar) = row.to_bar() else {
                partial += 1;
                continue;
            };
            if !bar.has_valid_prices() {
                invalid += 1;
                continue;
            }
            if bars.last().is_some_and(|last| last.date == bar.date) {
                duplicates += 1;
                continue;
            }
            bars.push(bar);
        }

        if partial > 0 {
            warn!(%symbol, partial, "dropped rows with missing price fields");
        }
        if invalid > 0 {
            warn!(%symbol, invalid, "dropped rows with non-positive prices");
        }
        if duplicates > 0 {
            debug!(%symbol, duplicates, "dropped duplicate dates");
        }

        Self { symbol, bars }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    /// Latest date in the series; windows are anchored here, not at "today".
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn latest_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    /// Close of the bar before the latest one, or the latest close for a one-bar series.
    pub fn previous_close(&self) -> Option<f64> {
        match self.bars.len() {
            0 => None,
            1 => Some(self.bars[0].close),
            n => Some(self.bars[n - 2].close),
        }
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    /// Last `n` bars (or all of them when shorter).
    pub fn tail(&self, n: usize) -> &[Bar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    /// New series holding bars from `start` onwards. Order is preserved so the invariant holds.
    pub fn suffix_from(&self, start: usize) -> PriceSeries {
        let start = start.min(self.bars.len());
        PriceSeries {
            symbol: self.symbol.clone(),
            bars: self.bars[start..].to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn raw(day: u32, close: Option<f64>) -> RawBar {
        RawBar {
            date: d(day),
            open: close,
            high: close.map(|c| c + 1.0),
            low: close.map(|c| c - 1.0),
            close,
            volume: close.map(|_| 1_000),
        }
    }

    fn sample_bar() -> Bar {
        Bar {
            date: d(2),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000,
        }
    }

    #[test]
    fn bar_price_checks() {
        assert!(sample_bar().has_valid_prices());

        let mut void = sample_bar();
        void.open = f64::NAN;
        assert!(void.is_void());
        assert!(!void.has_valid_prices());

        let mut zero_low = sample_bar();
        zero_low.low = 0.0;
        assert!(!zero_low.is_void());
        assert!(!zero_low.has_valid_prices());

        let mut unbounded = sample_bar();
        unbounded.high = f64::INFINITY;
        assert!(!unbounded.has_valid_prices());
    }

    #[test]
    fn from_raw_drops_zero_and_negative_closes() {
        let series = PriceSeries::from_raw(
            "TSLA",
            vec![raw(2, Some(10.0)), raw(3, Some(0.0)), raw(4, Some(-5.0)), raw(5, Some(11.0))],
        );
        assert_eq!(series.dates(), vec![d(2), d(5)]);
        assert!(series.bars().iter().all(Bar::has_valid_prices));
    }

    #[test]
    fn new_rejects_non_positive_prices() {
        let mut negative = sample_bar();
        negative.date = d(3);
        negative.close = -5.0;
        let err = PriceSeries::new("X", vec![sample_bar(), negative]).unwrap_err();
        assert_eq!(err, BarError::InvalidPrice { date: d(3) });

        let mut zero = sample_bar();
        zero.open = 0.0;
        assert!(PriceSeries::new("X", vec![zero]).is_err());
    }

    #[test]
    fn from_raw_sorts_and_drops_blank_rows() {
        let series = PriceSeries::from_raw(
            "TSLA",
            vec![raw(4, Some(12.0)), raw(2, Some(10.0)), raw(3, None)],
        );
        assert_eq!(series.len(), 2);
        assert_eq!(series.dates(), vec![d(2), d(4)]);
    }

    #[test]
    fn from_raw_drops_partial_rows() {
        let mut partial = raw(3, Some(11.0));
        partial.high = None;
        let series = PriceSeries::from_raw("TSLA", vec![raw(2, Some(10.0)), partial]);
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn from_raw_keeps_first_duplicate() {
        let series = PriceSeries::from_raw("TSLA", vec![raw(2, Some(10.0)), raw(2, Some(99.0))]);
        assert_eq!(series.len(), 1);
        assert_eq!(series.latest_close(), Some(10.0));
    }

    #[test]
    fn new_rejects_out_of_order() {
        let mut later = sample_bar();
        later.date = d(1);
        let err = PriceSeries::new("X", vec![sample_bar(), later]).unwrap_err();
        assert!(matches!(err, BarError::OutOfOrder { index: 1, .. }));
    }

    #[test]
    fn previous_close_for_single_bar_is_latest() {
        let series = PriceSeries::new("X", vec![sample_bar()]).unwrap();
        assert_eq!(series.previous_close(), Some(103.0));
    }

    #[test]
    fn tail_and_suffix() {
        let series = PriceSeries::from_raw(
            "X",
            (1..=5).map(|i| raw(i, Some(10.0 + i as f64))).collect(),
        );
        assert_eq!(series.tail(2).len(), 2);
        assert_eq!(series.tail(10).len(), 5);
        assert_eq!(series.suffix_from(3).first_date(), Some(d(4)));
        assert!(series.suffix_from(99).is_empty());
    }

    #[test]
    fn series_serialization_roundtrip() {
        let series = PriceSeries::new("SPY", vec![sample_bar()]).unwrap();
        let json = serde_json::to_string(&series).unwrap();
        let back: PriceSeries = serde_json::from_str(&json).unwrap();
        assert_eq!(series, back);
    }
}
