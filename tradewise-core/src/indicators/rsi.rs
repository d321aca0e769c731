//! Relative Strength Index (RSI).
//!
//! Wilder smoothing of average gains and average losses over `length` closes.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: length. Edge cases: avg_loss == 0 → RSI = 100; avg_gain == 0 → RSI = 0.

use super::indicator::Indicator;
use crate::domain::Bar;

/// Lookback used everywhere the dashboard shows or alerts on RSI.
pub const RSI_LENGTH: usize = 14;

#[derive(Debug, Clone)]
pub struct Rsi {
    length: usize,
    name: String,
}

impl Rsi {
    /// A zero length is treated as one.
    pub fn new(length: usize) -> Self {
        let length = length.max(1);
        Self {
            length,
            name: format!("RSI {length}"),
        }
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(RSI_LENGTH)
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.length
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        // One change per bar after the first; `length` changes seed the averages.
        if n < self.length + 1 {
            return result;
        }

        let changes: Vec<f64> = bars.windows(2).map(|w| w[1].close - w[0].close).collect();

        let mut avg_gain = 0.0;
        let mut avg_loss = 0.0;
        for &ch in &changes[..self.length] {
            if ch.is_nan() {
                return result;
            }
            if ch > 0.0 {
                avg_gain += ch;
            } else {
                avg_loss -= ch;
            }
        }
        avg_gain /= self.length as f64;
        avg_loss /= self.length as f64;

        result[self.length] = rsi_from_averages(avg_gain, avg_loss);

        let alpha = 1.0 / self.length as f64;
        for i in (self.length + 1)..n {
            let ch = changes[i - 1];
            if ch.is_nan() {
                // Void bar poisons everything after it
                return result;
            }

            let gain = ch.max(0.0);
            let loss = (-ch).max(0.0);

            avg_gain = alpha * gain + (1.0 - alpha) * avg_gain;
            avg_loss = alpha * loss + (1.0 - alpha) * avg_loss;

            result[i] = rsi_from_averages(avg_gain, avg_loss);
        }

        result
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
