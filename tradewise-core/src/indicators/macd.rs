//! Moving Average Convergence Divergence (MACD).
//!
//! MACD line = EMA(fast) - EMA(slow) of close.
//! Signal    = EMA(signal) of the MACD line, seeded from its first defined value.
//! Histogram = MACD - Signal.
//! Lookback: slow - 1 for the line, slow + signal - 2 for signal and histogram.

use super::ema::ema_of_series;
use super::indicator::Indicator;
use crate::domain::Bar;

pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    name: String,
}

/// The three aligned MACD components.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdValues {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl MacdValues {
    fn undefined(n: usize) -> Self {
        Self {
            macd: vec![f64::NAN; n],
            signal: vec![f64::NAN; n],
            histogram: vec![f64::NAN; n],
        }
    }
}

impl Macd {
    /// Periods are clamped so that `1 <= fast < slow` and `signal >= 1`.
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        let fast = fast.max(1);
        let slow = slow.max(fast + 1);
        let signal = signal.max(1);
        Self {
            fast,
            slow,
            signal,
            name: format!("MACD {fast}/{slow}/{signal}"),
        }
    }

    pub fn slow(&self) -> usize {
        self.slow
    }

    /// Compute line, signal and histogram in one pass.
    pub fn compute_all(&self, bars: &[Bar]) -> MacdValues {
        let n = bars.len();
        if n < self.slow {
            return MacdValues::undefined(n);
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let fast = ema_of_series(&closes, self.fast);
        let slow = ema_of_series(&closes, self.slow);

        let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();

        let mut signal = vec![f64::NAN; n];
        if let Some(start) = macd.iter().position(|v| !v.is_nan()) {
            let tail = ema_of_series(&macd[start..], self.signal);
            signal[start..].copy_from_slice(&tail);
        }

        let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

        MacdValues {
            macd,
            signal,
            histogram,
        }
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new(MACD_FAST, MACD_SLOW, MACD_SIGNAL)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.slow - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        self.compute_all(bars).macd
    }
}
