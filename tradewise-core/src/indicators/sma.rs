//! Simple moving average of Close.
//!
//! The first `period - 1` positions are undefined. A window containing an
//! undefined close is itself undefined.

use super::indicator::Indicator;
use crate::domain::Bar;

/// Period range exposed by the dashboard controls.
pub const SMA_PERIOD_RANGE: std::ops::RangeInclusive<usize> = 5..=200;

/// Default dashboard period.
pub const DEFAULT_SMA_PERIOD: usize = 50;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    /// A zero period is treated as one.
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            period,
            name: format!("SMA {period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        rolling_mean(&closes, self.period)
    }
}

/// Trailing mean over `period` values, tracking how many undefined values sit
/// in the current window instead of rescanning it.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let mut sum = 0.0;
    let mut undefined = 0usize;
    for (i, &entering) in values.iter().enumerate() {
        if entering.is_nan() {
            undefined += 1;
        } else {
            sum += entering;
        }
        if i >= period {
            let leaving = values[i - period];
            if leaving.is_nan() {
                undefined -= 1;
            } else {
                sum -= leaving;
            }
        }
        if i + 1 >= period && undefined == 0 {
            out[i] = sum / period as f64;
        }
    }
    out
}
