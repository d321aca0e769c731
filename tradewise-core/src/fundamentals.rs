//! Display formatting for company info, fundamentals and headline metrics.
//!
//! Missing values render as [`NOT_AVAILABLE`], each field independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, CompanyInfo, PriceSeries};

pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_SUMMARY: &str = "No summary available for this ticker.";

/// Rows per fundamentals table; the ten rows are shown as two tables.
pub const FUNDAMENTALS_SPLIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundamentalRow {
    pub label: String,
    pub value: String,
}

/// Compact numeric rendering: T/B/M suffixes for large magnitudes, otherwise
/// four significant digits in general format (`0.2531`, `29.5`, `1.61e+05`).
pub fn format_value(value: Option<f64>) -> String {
    let Some(v) = value.filter(|v| v.is_finite()) else {
        return NOT_AVAILABLE.to_string();
    };
    let magnitude = v.abs();
    if magnitude >= 1e12 {
        format!("{:.2}T", v / 1e12)
    } else if magnitude >= 1e9 {
        format!("{:.2}B", v / 1e9)
    } else if magnitude >= 1e6 {
        format!("{:.2}M", v / 1e6)
    } else {
        format_general(v, 4)
    }
}

/// `%g`-style formatting with `precision` significant digits.
pub fn format_general(v: f64, precision: usize) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let precision = precision.max(1);
    // Scientific form gives the exponent after rounding to `precision` digits.
    let sci = format!("{:.*e}", precision - 1, v);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= precision as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", strip_zeros(mantissa), exp.abs())
    } else {
        let decimals = (precision as i32 - 1 - exp).max(0) as usize;
        strip_zeros(&format!("{v:.decimals$}")).to_string()
    }
}

fn strip_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

fn round_to(v: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (v * factor).round() / factor
}

/// The ten fundamentals rows in display order.
pub fn fundamentals(info: &CompanyInfo) -> Vec<FundamentalRow> {
    let rows: [(&'static str, Option<f64>); 10] = [
        ("Market Cap", info.market_cap),
        ("Beta", info.beta),
        ("EPS", info.trailing_eps),
        ("PE Ratio", info.trailing_pe),
        ("Quick Ratio", info.quick_ratio),
        ("Revenue per share", info.revenue_per_share),
        ("Profit Margins", info.profit_margins.map(|m| round_to(m, 4))),
        ("Debt to Equity", info.debt_to_equity),
        ("Return on Equity", info.return_on_equity),
        ("Dividend Yield", info.dividend_yield),
    ];
    rows.into_iter()
        .map(|(label, value)| FundamentalRow {
            label: label.to_string(),
            value: format_value(value),
        })
        .collect()
}

/// Fundamentals split into the left and right tables.
pub fn fundamentals_tables(info: &CompanyInfo) -> (Vec<FundamentalRow>, Vec<FundamentalRow>) {
    let mut left = fundamentals(info);
    let right = left.split_off(FUNDAMENTALS_SPLIT);
    (left, right)
}

/// Truncate to `max_chars` characters. Returns whether anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte, _)) => (&text[..byte], true),
        None => (text, false),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overview {
    pub summary: String,
    pub sector: String,
    pub employees: String,
    pub website: String,
}

impl Overview {
    pub fn from_info(info: &CompanyInfo, summary_max_chars: usize) -> Self {
        let summary = match info.long_business_summary.as_deref() {
            Some(text) => match truncate_chars(text, summary_max_chars) {
                (cut, true) => format!("{cut}..."),
                (whole, false) => whole.to_string(),
            },
            None => NO_SUMMARY.to_string(),
        };
        let or_na = |v: Option<&str>| v.unwrap_or(NOT_AVAILABLE).to_string();
        Self {
            summary,
            sector: or_na(info.sector.as_deref()),
            employees: info
                .full_time_employees
                .map_or_else(|| NOT_AVAILABLE.to_string(), |n| n.to_string()),
            website: or_na(info.website.as_deref()),
        }
    }
}

/// Price, change and last-bar values shown above the tabs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopMetrics {
    pub price: f64,
    pub change: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
}

impl TopMetrics {
    /// `None` for an empty series. A one-bar series has zero change.
    pub fn from_series(series: &PriceSeries) -> Option<Self> {
        let last = series.last()?;
        let previous = series.previous_close()?;
        Some(Self {
            price: last.close,
            change: last.close - previous,
            open: last.open,
            high: last.high,
            low: last.low,
        })
    }

    pub fn price_text(&self) -> String {
        format!("{:.2}", self.price)
    }

    pub fn change_text(&self) -> String {
        format!("{:+.2}", self.change)
    }
}

/// The last `rows` bars with prices rounded to four decimals.
pub fn recent_rows(series: &PriceSeries, rows: usize) -> Vec<Bar> {
    series
        .tail(rows)
        .iter()
        .map(|bar| Bar {
            open: round_to(bar.open, 4),
            high: round_to(bar.high, 4),
            low: round_to(bar.low, 4),
            close: round_to(bar.close, 4),
            ..*bar
        })
        .collect()
}
