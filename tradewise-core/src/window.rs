//! Quick-range windows over a price series.
//!
//! A window selects the bars whose date falls strictly after a cutoff. The
//! cutoff is derived from the series' own latest date, so stale data still
//! yields a sensible window.

use std::fmt;

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::PriceSeries;

/// Named relative time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Window {
    FiveDays,
    OneMonth,
    SixMonths,
    YearToDate,
    OneYear,
    FiveYears,
    Max,
    #[default]
    Custom,
}

impl Window {
    /// Every window in selector order.
    pub const ALL: [Window; 8] = [
        Window::Custom,
        Window::FiveDays,
        Window::OneMonth,
        Window::SixMonths,
        Window::YearToDate,
        Window::OneYear,
        Window::FiveYears,
        Window::Max,
    ];

    /// Lenient parse of a period tag ("5d", "1mo", "ytd", ...) or a selector label ("5D", "1M", ...).
    ///
    /// Empty and unrecognized tags map to `Custom`, which selects the full series.
    pub fn from_tag(tag: &str) -> Window {
        match tag.trim().to_ascii_lowercase().as_str() {
            "5d" => Window::FiveDays,
            "1m" | "1mo" => Window::OneMonth,
            "6m" | "6mo" => Window::SixMonths,
            "ytd" => Window::YearToDate,
            "1y" => Window::OneYear,
            "5y" => Window::FiveYears,
            "max" => Window::Max,
            _ => Window::Custom,
        }
    }

    /// Short period tag.
    pub fn tag(self) -> &'static str {
        match self {
            Window::FiveDays => "5d",
            Window::OneMonth => "1mo",
            Window::SixMonths => "6mo",
            Window::YearToDate => "ytd",
            Window::OneYear => "1y",
            Window::FiveYears => "5y",
            Window::Max => "max",
            Window::Custom => "",
        }
    }

    /// Selector label.
    pub fn label(self) -> &'static str {
        match self {
            Window::FiveDays => "5D",
            Window::OneMonth => "1M",
            Window::SixMonths => "6M",
            Window::YearToDate => "YTD",
            Window::OneYear => "1Y",
            Window::FiveYears => "5Y",
            Window::Max => "MAX",
            Window::Custom => "Custom",
        }
    }

    /// Window used for charts: Custom falls back to one year.
    pub fn for_display(self) -> Window {
        match self {
            Window::Custom => Window::OneYear,
            other => other,
        }
    }

    /// Whether this window keeps the whole series.
    pub fn is_full(self) -> bool {
        matches!(self, Window::Max | Window::Custom)
    }

    /// Cutoff date relative to `anchor`. `None` means no cutoff (full series).
    ///
    /// Month and year arithmetic clamps to the end of shorter months
    /// (Mar 31 minus one month is Feb 29 in a leap year).
    pub fn cutoff(self, anchor: NaiveDate) -> Option<NaiveDate> {
        match self {
            Window::FiveDays => anchor.checked_sub_signed(Duration::days(5)),
            Window::OneMonth => anchor.checked_sub_months(Months::new(1)),
            Window::SixMonths => anchor.checked_sub_months(Months::new(6)),
            Window::OneYear => anchor.checked_sub_months(Months::new(12)),
            Window::FiveYears => anchor.checked_sub_months(Months::new(60)),
            Window::YearToDate => NaiveDate::from_ymd_opt(anchor.year(), 1, 1),
            Window::Max | Window::Custom => None,
        }
    }

    /// Select the sub-series that falls inside this window.
    ///
    /// Bars dated exactly on the cutoff are excluded. Empty input yields empty output.
    pub fn filter(self, series: &PriceSeries) -> PriceSeries {
        series.suffix_from(self.start_index_for(&series.dates()))
    }

    /// Index of the first bar inside the window for a series anchored at its last date.
    ///
    /// Shared by price and derived series so both are cut identically.
    pub fn start_index_for(self, dates: &[NaiveDate]) -> usize {
        let Some(&anchor) = dates.last() else {
            return 0;
        };
        match self.cutoff(anchor) {
            None => 0,
            Some(cutoff) => dates.partition_point(|d| *d <= cutoff),
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Free-function form of [`Window::filter`].
pub fn filter(series: &PriceSeries, window: Window) -> PriceSeries {
    window.filter(series)
}
