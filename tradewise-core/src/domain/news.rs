//! News items and their sentiment annotation.

use serde::{Deserialize, Serialize};

use crate::sentiment::Sentiment;

/// One headline as delivered by a news collaborator. Passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub headline: String,
    pub summary: String,
    pub source: String,
    pub url: String,
    /// Provider timestamp string, empty when unknown.
    pub published_at: String,
}

impl NewsItem {
    /// Text fed to the sentiment scorer.
    pub fn scoring_text(&self) -> String {
        format!("{} {}", self.headline, self.summary)
    }
}

/// A news item annotated with its heuristic sentiment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredNews {
    pub item: NewsItem,
    pub sentiment: Sentiment,
}

/// Which link of the fallback chain produced the headlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NewsOrigin {
    Provider,
    CompanyInfo,
    SummaryFallback,
}
