//! Indicator trait.
//!
//! Indicators are pure functions: bar history in, numeric series out, one value
//! per input bar. Nothing here knows about charts.

use crate::domain::{Bar, PriceSeries};

use super::series::DerivedSeries;

/// Trait for single-output indicators.
///
/// The output has the same length as the input; the first `lookback()` values
/// are `f64::NAN` (insufficient history). An input shorter than the lookback
/// yields an all-NaN output, never a panic.
///
/// No value at bar t may depend on bars after t.
pub trait Indicator: Send + Sync {
    /// Human-readable name, e.g. "SMA 50".
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar slice.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;

    /// Compute over a price series and keep the result aligned to its dates.
    fn derive(&self, series: &PriceSeries) -> DerivedSeries {
        DerivedSeries::new(self.name(), series.dates(), self.compute(series.bars()))
    }
}
