//! Deterministic synthetic market data for offline use.
//!
//! Each ticker gets its own seeded random walk starting at a fixed epoch, so
//! overlapping date ranges for the same ticker always agree on shared dates.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, HistoryProvider, InfoProvider};
use crate::domain::{Bar, CompanyInfo, NewsItem, PriceSeries};

/// First trading day of every synthetic walk.
pub fn synthetic_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 3).unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone, Default)]
pub struct SyntheticProvider {
    master_seed: u64,
}

impl SyntheticProvider {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    /// FNV-1a over the ticker, mixed with the master seed.
    fn seed_for(&self, ticker: &str) -> u64 {
        let hash = ticker.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |h, b| {
            (h ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3)
        });
        hash ^ self.master_seed
    }

    fn walk(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
        let mut rng = StdRng::seed_from_u64(self.seed_for(ticker));
        let mut close: f64 = rng.gen_range(20.0..300.0);
        let mut bars = Vec::new();

        let mut date = synthetic_epoch().min(start);
        while date < end {
            if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                let open = close * (1.0 + rng.gen_range(-0.01..0.01));
                close = (open * (1.0 + rng.gen_range(-0.03..0.03))).max(1.0);
                let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
                let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
                let volume = rng.gen_range(100_000..5_000_000);
                if date >= start {
                    bars.push(Bar {
                        date,
                        open,
                        high,
                        low,
                        close,
                        volume,
                    });
                }
            }
            let Some(next) = date.succ_opt() else { break };
            date = next;
        }
        bars
    }
}

impl HistoryProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        if ticker.is_empty() {
            return Err(DataError::InvalidRequest("empty ticker".into()));
        }
        PriceSeries::new(ticker, self.walk(ticker, start, end))
            .map_err(|e| DataError::Other(e.to_string()))
    }
}

impl InfoProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch_info(&self, ticker: &str) -> Result<CompanyInfo, DataError> {
        let mut rng = StdRng::seed_from_u64(self.seed_for(ticker));
        Ok(CompanyInfo {
            long_business_summary: Some(format!(
                "{ticker} is a synthetic company used for offline demonstrations. \
                 Its prices follow a seeded random walk."
            )),
            sector: Some("Synthetic".into()),
            full_time_employees: Some(rng.gen_range(100..200_000)),
            website: None,
            market_cap: Some(rng.gen_range(1.0e8..3.0e12)),
            beta: Some(rng.gen_range(0.5..2.0)),
            trailing_eps: Some(rng.gen_range(-2.0..12.0)),
            trailing_pe: Some(rng.gen_range(5.0..60.0)),
            quick_ratio: None,
            revenue_per_share: Some(rng.gen_range(1.0..120.0)),
            profit_margins: Some(rng.gen_range(-0.1..0.4)),
            debt_to_equity: None,
            return_on_equity: None,
            dividend_yield: None,
            news: vec![NewsItem {
                headline: format!("{ticker} posts record quarter"),
                summary: String::new(),
                source: "Synthetic Wire".into(),
                url: String::new(),
                published_at: String::new(),
            }],
        })
    }
}
