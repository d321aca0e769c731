//! TradeWise Core: single-ticker equity analysis.
//!
//! This crate holds everything below the presentation layer:
//! - Price series and company domain types
//! - Quick-range windows over a series
//! - RSI, SMA and MACD indicators
//! - Price and RSI threshold alerts
//! - Keyword sentiment for headlines
//! - Market-data, company-info and news collaborators with a history cache
//! - Fundamentals formatting, chart specifications and CSV export
//! - The dashboard orchestrator that wires it all together

pub mod alerts;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod domain;
pub mod export;
pub mod fundamentals;
pub mod indicators;
pub mod news;
pub mod sentiment;
pub mod window;

pub use dashboard::{Dashboard, DashboardReport, DashboardRequest};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types shared with the TUI worker thread are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::PriceSeries>();
        require_sync::<domain::PriceSeries>();
        require_send::<domain::CompanyInfo>();
        require_sync::<domain::CompanyInfo>();
        require_send::<domain::ScoredNews>();
        require_sync::<domain::ScoredNews>();

        // Derived output
        require_send::<indicators::DerivedSeries>();
        require_sync::<indicators::DerivedSeries>();
        require_send::<indicators::MacdSeries>();
        require_sync::<indicators::MacdSeries>();
        require_send::<alerts::AlertStatus>();
        require_sync::<alerts::AlertStatus>();
        require_send::<chart::ChartSpec>();
        require_sync::<chart::ChartSpec>();

        // Collaborators and orchestration
        require_send::<data::HistoryCache>();
        require_sync::<data::HistoryCache>();
        require_send::<data::CachedHistory>();
        require_sync::<data::CachedHistory>();
        require_send::<config::DashboardConfig>();
        require_sync::<config::DashboardConfig>();
        require_send::<Dashboard>();
        require_sync::<Dashboard>();
        require_send::<DashboardRequest>();
        require_send::<DashboardReport>();
    }

    /// Architecture contract: the chart adapter only consumes numeric output.
    ///
    /// `rsi_chart` takes a `DerivedSeries`, not a `PriceSeries`, so the chart
    /// cannot compute its own RSI. The alert path reads the same series.
    #[test]
    fn chart_adapter_takes_computed_rsi() {
        fn _check(
            builder: &chart::ChartBuilder<'_>,
            rsi: &indicators::DerivedSeries,
        ) -> chart::ChartSpec {
            builder.rsi_chart(rsi)
        }
    }
}
