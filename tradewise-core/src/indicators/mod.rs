//! Indicator engine: RSI, SMA and MACD over a price series' close column.
//!
//! Every computation is pure and returns a `DerivedSeries` aligned with the
//! input. Insufficient history produces an all-undefined series, which callers
//! treat as "nothing to draw" rather than as an error.

pub mod ema;
pub mod indicator;
pub mod macd;
pub mod rsi;
pub mod series;
pub mod sma;

pub use ema::ema_of_series;
pub use indicator::Indicator;
pub use macd::{Macd, MacdValues, MACD_FAST, MACD_SIGNAL, MACD_SLOW};
pub use rsi::{Rsi, RSI_LENGTH};
pub use series::{DerivedSeries, MacdSeries};
pub use sma::{Sma, DEFAULT_SMA_PERIOD, SMA_PERIOD_RANGE};

use crate::domain::PriceSeries;

/// Stateless entry point used by both the chart adapter and the alert evaluator.
///
/// RSI always goes through [`IndicatorEngine::rsi`] with [`RSI_LENGTH`], so the
/// value charted and the value alerted on come from the same computation.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorEngine;

impl IndicatorEngine {
    /// RSI(14) over the full series.
    pub fn rsi(series: &PriceSeries) -> DerivedSeries {
        Rsi::default().derive(series)
    }

    /// SMA(period). A zero period yields an all-undefined series.
    pub fn sma(series: &PriceSeries, period: usize) -> DerivedSeries {
        if period == 0 {
            return DerivedSeries::undefined("SMA 0", series.dates());
        }
        Sma::new(period).derive(series)
    }

    /// MACD(12, 26, 9) as a line/signal/histogram triple.
    pub fn macd(series: &PriceSeries) -> MacdSeries {
        let macd = Macd::default();
        let values = macd.compute_all(series.bars());
        let dates = series.dates();
        MacdSeries {
            macd: DerivedSeries::new("MACD", dates.clone(), values.macd),
            signal: DerivedSeries::new("Signal", dates.clone(), values.signal),
            histogram: DerivedSeries::new("Histogram", dates, values.histogram),
        }
    }
}

/// Create synthetic bars from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0 but never below
/// half of min(open,close), volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<crate::domain::Bar> {
    use crate::domain::Bar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: (open.min(close) - 1.0).max(open.min(close) / 2.0),
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Same as [`make_bars`], wrapped in a validated `PriceSeries`.
#[cfg(test)]
pub fn make_series(closes: &[f64]) -> PriceSeries {
    PriceSeries::new("TEST", make_bars(closes)).unwrap()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_rsi_matches_indicator() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + ((i * 7) % 5) as f64).collect();
        let series = make_series(&closes);
        let a = IndicatorEngine::rsi(&series);
        let b = Rsi::new(RSI_LENGTH).compute(series.bars());
        assert_eq!(a.len(), b.len());
        for (x, y) in a.values().iter().zip(&b) {
            assert!(x.to_bits() == y.to_bits());
        }
    }

    #[test]
    fn engine_sma_zero_period_is_undefined() {
        let series = make_series(&[1.0, 2.0, 3.0]);
        assert!(IndicatorEngine::sma(&series, 0).is_all_undefined());
    }

    #[test]
    fn engine_on_empty_series() {
        let empty = PriceSeries::empty("NONE");
        assert!(IndicatorEngine::rsi(&empty).is_empty());
        assert!(IndicatorEngine::sma(&empty, 50).is_empty());
        assert!(IndicatorEngine::macd(&empty).is_all_undefined());
    }

    #[test]
    fn engine_outputs_align_with_input() {
        let series = make_series(&(0..40).map(|i| 50.0 + i as f64).collect::<Vec<_>>());
        let macd = IndicatorEngine::macd(&series);
        assert_eq!(macd.macd.dates(), series.dates().as_slice());
        assert_eq!(IndicatorEngine::sma(&series, 10).len(), 40);
    }
}
