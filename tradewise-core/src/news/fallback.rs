//! Headline fallback chain with sentiment annotation.
//!
//! Order: news provider, then headlines embedded in the company info, then a
//! single item built from the company summary. Provider failures never escape;
//! they become notices on the outcome.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::NewsProvider;
use crate::domain::{CompanyInfo, NewsItem, NewsOrigin, ScoredNews};
use crate::fundamentals::truncate_chars;
use crate::sentiment;

/// Embedded company-info headlines used at most.
pub const EMBEDDED_NEWS_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsOutcome {
    pub items: Vec<ScoredNews>,
    pub origin: NewsOrigin,
    /// User-facing messages about fallbacks taken.
    pub notices: Vec<String>,
}

/// Collect headlines for `ticker` and score each one.
///
/// `provider` is `None` when the external news source is disabled or has no key.
pub fn gather_news(
    ticker: &str,
    provider: Option<&dyn NewsProvider>,
    page_size: usize,
    company: &CompanyInfo,
    summary_max_chars: usize,
) -> NewsOutcome {
    let mut notices = Vec::new();

    if let Some(provider) = provider {
        match provider.fetch_news(ticker, page_size) {
            Ok(items) if !items.is_empty() => {
                info!(%ticker, count = items.len(), provider = provider.name(), "news from provider");
                let items = items.into_iter().take(page_size).collect();
                return scored(items, NewsOrigin::Provider, notices);
            }
            Ok(_) => {
                info!(%ticker, "news provider returned no results");
            }
            Err(e) => {
                warn!(%ticker, error = %e, "news provider failed, falling back");
                notices.push(format!(
                    "External news fetch failed ({e}). Falling back to summary-based headline."
                ));
            }
        }
    }

    if !company.news.is_empty() {
        info!(%ticker, "using headlines embedded in company info");
        let items = company.news.iter().take(EMBEDDED_NEWS_LIMIT).cloned().collect();
        return scored(items, NewsOrigin::CompanyInfo, notices);
    }

    info!(%ticker, "no headlines available, using company summary");
    let summary = company
        .long_business_summary
        .as_deref()
        .map(|s| truncate_chars(s, summary_max_chars).0.to_string())
        .unwrap_or_default();
    let item = NewsItem {
        headline: format!("{ticker} — latest summary"),
        summary,
        ..NewsItem::default()
    };
    scored(vec![item], NewsOrigin::SummaryFallback, notices)
}

fn scored(items: Vec<NewsItem>, origin: NewsOrigin, notices: Vec<String>) -> NewsOutcome {
    let items = items
        .into_iter()
        .map(|item| ScoredNews {
            sentiment: sentiment::score(&item.scoring_text()),
            item,
        })
        .collect();
    NewsOutcome {
        items,
        origin,
        notices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::NewsError;
    use crate::sentiment::SentimentLabel;

    struct FixedNews(Result<Vec<NewsItem>, ()>);

    impl NewsProvider for FixedNews {
        fn name(&self) -> &str {
            "fixed"
        }

        fn fetch_news(&self, _query: &str, _page_size: usize) -> Result<Vec<NewsItem>, NewsError> {
            self.0
                .clone()
                .map_err(|_| NewsError::Request("timed out".into()))
        }
    }

    fn headline(text: &str) -> NewsItem {
        NewsItem {
            headline: text.into(),
            ..NewsItem::default()
        }
    }

    fn company_with_news(n: usize) -> CompanyInfo {
        CompanyInfo {
            long_business_summary: Some("Makes cars.".into()),
            news: (0..n).map(|i| headline(&format!("Embedded {i}"))).collect(),
            ..CompanyInfo::default()
        }
    }

    #[test]
    fn provider_items_are_scored() {
        let provider = FixedNews(Ok(vec![headline("Shares surge on record profit")]));
        let outcome = gather_news("TSLA", Some(&provider), 6, &CompanyInfo::default(), 800);
        assert_eq!(outcome.origin, NewsOrigin::Provider);
        assert_eq!(outcome.items[0].sentiment.label, SentimentLabel::Positive);
        assert_eq!(outcome.items[0].sentiment.score, 3);
        assert!(outcome.notices.is_empty());
    }

    #[test]
    fn provider_failure_falls_back_to_embedded() {
        let provider = FixedNews(Err(()));
        let outcome = gather_news("TSLA", Some(&provider), 6, &company_with_news(8), 800);
        assert_eq!(outcome.origin, NewsOrigin::CompanyInfo);
        assert_eq!(outcome.items.len(), EMBEDDED_NEWS_LIMIT);
        assert_eq!(outcome.notices.len(), 1);
    }

    #[test]
    fn empty_provider_result_falls_back_silently() {
        let provider = FixedNews(Ok(Vec::new()));
        let outcome = gather_news("TSLA", Some(&provider), 6, &company_with_news(2), 800);
        assert_eq!(outcome.origin, NewsOrigin::CompanyInfo);
        assert_eq!(outcome.items.len(), 2);
        assert!(outcome.notices.is_empty());
    }

    #[test]
    fn summary_item_is_last_resort() {
        let company = CompanyInfo {
            long_business_summary: Some("x".repeat(1000)),
            ..CompanyInfo::default()
        };
        let outcome = gather_news("TSLA", None, 6, &company, 800);
        assert_eq!(outcome.origin, NewsOrigin::SummaryFallback);
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0].item.headline, "TSLA — latest summary");
        assert_eq!(outcome.items[0].item.summary.len(), 800);
    }

    #[test]
    fn summary_item_without_summary() {
        let outcome = gather_news("XYZ", None, 6, &CompanyInfo::default(), 800);
        assert_eq!(outcome.items.len(), 1);
        assert!(outcome.items[0].item.summary.is_empty());
        assert_eq!(outcome.items[0].sentiment.label, SentimentLabel::Neutral);
    }

    #[test]
    fn provider_items_capped_at_page_size() {
        let provider = FixedNews(Ok((0..10).map(|i| headline(&format!("n{i}"))).collect()));
        let outcome = gather_news("TSLA", Some(&provider), 6, &CompanyInfo::default(), 800);
        assert_eq!(outcome.items.len(), 6);
    }
}
