//! Company profile and fundamentals as returned by the info collaborator.
//!
//! Every field is optional: absent values render as "N/A" independently.

use serde::{Deserialize, Serialize};

use super::news::NewsItem;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub long_business_summary: Option<String>,
    pub sector: Option<String>,
    pub full_time_employees: Option<u64>,
    pub website: Option<String>,

    pub market_cap: Option<f64>,
    pub beta: Option<f64>,
    pub trailing_eps: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub quick_ratio: Option<f64>,
    pub revenue_per_share: Option<f64>,
    pub profit_margins: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub dividend_yield: Option<f64>,

    /// Headlines embedded in the company profile; second link of the news fallback chain.
    pub news: Vec<NewsItem>,
}

impl CompanyInfo {
    pub fn is_empty(&self) -> bool {
        *self == CompanyInfo::default()
    }
}
