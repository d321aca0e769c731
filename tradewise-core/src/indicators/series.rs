//! DerivedSeries: indicator output aligned one-to-one with its source dates.

use chrono::NaiveDate;

use crate::window::Window;

/// Indicator values keyed by the dates of the series they were computed from.
///
/// Undefined positions (warmup, insufficient history) hold `f64::NAN`.
#[derive(Debug, Clone)]
pub struct DerivedSeries {
    name: String,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl DerivedSeries {
    pub fn new(name: impl Into<String>, dates: Vec<NaiveDate>, values: Vec<f64>) -> Self {
        assert_eq!(
            dates.len(),
            values.len(),
            "derived series must align with its source"
        );
        Self {
            name: name.into(),
            dates,
            values,
        }
    }

    /// All-undefined series over `dates`.
    pub fn undefined(name: impl Into<String>, dates: Vec<NaiveDate>) -> Self {
        let values = vec![f64::NAN; dates.len()];
        Self::new(name, dates, values)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`, `None` when out of range or undefined.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().filter(|v| !v.is_nan())
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    /// True when there is nothing to draw.
    pub fn is_all_undefined(&self) -> bool {
        self.values.iter().all(|v| v.is_nan())
    }

    /// Most recent defined value.
    pub fn last_defined(&self) -> Option<f64> {
        self.values.iter().rev().copied().find(|v| !v.is_nan())
    }

    /// Defined (date, value) pairs in order.
    pub fn points(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates
            .iter()
            .zip(&self.values)
            .filter(|(_, v)| !v.is_nan())
            .map(|(d, v)| (*d, *v))
    }

    /// Cut to a display window anchored at this series' own last date.
    ///
    /// Values keep the lookback computed over the full history.
    pub fn window(&self, window: Window) -> DerivedSeries {
        let start = window.start_index_for(&self.dates);
        DerivedSeries {
            name: self.name.clone(),
            dates: self.dates[start..].to_vec(),
            values: self.values[start..].to_vec(),
        }
    }
}

/// MACD output as three aligned derived series.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub macd: DerivedSeries,
    pub signal: DerivedSeries,
    pub histogram: DerivedSeries,
}

impl MacdSeries {
    pub fn window(&self, window: Window) -> MacdSeries {
        MacdSeries {
            macd: self.macd.window(window),
            signal: self.signal.window(window),
            histogram: self.histogram.window(window),
        }
    }

    pub fn is_all_undefined(&self) -> bool {
        self.macd.is_all_undefined()
    }
}
