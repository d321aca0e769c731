//! Domain types for TradeWise

pub mod bar;
pub mod company;
pub mod news;

pub use bar::{Bar, BarError, PriceSeries};
pub use company::CompanyInfo;
pub use news::{NewsItem, NewsOrigin, ScoredNews};
