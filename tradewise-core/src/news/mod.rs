//! News collaborator and the headline fallback chain.

pub mod fallback;
pub mod newsapi;

pub use fallback::{gather_news, NewsOutcome, EMBEDDED_NEWS_LIMIT};
pub use newsapi::NewsApiProvider;

use thiserror::Error;

use crate::domain::NewsItem;

#[derive(Debug, Error)]
pub enum NewsError {
    #[error("news provider has no API key configured")]
    MissingApiKey,

    #[error("news request failed: {0}")]
    Request(String),

    #[error("news provider returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed news payload: {0}")]
    Malformed(String),
}

/// Source of recent headlines for a query.
pub trait NewsProvider: Send + Sync {
    fn name(&self) -> &str;

    /// At most `page_size` items, newest first. An empty list is not an error.
    fn fetch_news(&self, query: &str, page_size: usize) -> Result<Vec<NewsItem>, NewsError>;
}
