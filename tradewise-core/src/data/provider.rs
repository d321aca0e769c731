//! Market-data collaborator traits and structured error types.
//!
//! `HistoryProvider` and `InfoProvider` abstract over data sources (Yahoo
//! Finance, synthetic data, in-memory fakes) so the dashboard can swap them and
//! tests can mock them. The cache sits above these traits.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Bar, CompanyInfo, PriceSeries};

/// Raw daily row from a provider, before canonicalization. Any field may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

impl RawBar {
    /// Holiday / non-trading rows carry no values at all.
    pub fn is_blank(&self) -> bool {
        self.open.is_none()
            && self.high.is_none()
            && self.low.is_none()
            && self.close.is_none()
            && self.volume.is_none()
    }

    /// Complete bar, or `None` when any price is missing or NaN. Missing volume reads as zero.
    pub fn to_bar(&self) -> Option<Bar> {
        let price = |v: Option<f64>| v.filter(|p| !p.is_nan());
        Some(Bar {
            date: self.date,
            open: price(self.open)?,
            high: price(self.high)?,
            low: price(self.low)?,
            close: price(self.close)?,
            volume: self.volume.unwrap_or(0),
        })
    }
}

/// Structured error types for data operations.
///
/// Displayable in both CLI and TUI contexts.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Historical OHLCV collaborator.
///
/// An `Ok` empty series is a valid "no data" answer; the dashboard treats it
/// the same as an error: a terminal state for that render cycle.
pub trait HistoryProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for `ticker` in `[start, end)`, ascending.
    fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError>;
}

/// Company profile / fundamentals collaborator.
pub trait InfoProvider: Send + Sync {
    fn name(&self) -> &str;

    fn fetch_info(&self, ticker: &str) -> Result<CompanyInfo, DataError>;
}
