//! NewsAPI `/v2/everything` client.

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

use super::{NewsError, NewsProvider};
use crate::config::NewsConfig;
use crate::domain::NewsItem;

const EVERYTHING_URL: &str = "https://newsapi.org/v2/everything";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    articles: Vec<Article>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Article {
    #[serde(default)]
    source: ArticleSource,
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ArticleSource {
    name: Option<String>,
}

impl Article {
    fn into_item(self) -> NewsItem {
        let summary = self
            .description
            .filter(|d| !d.is_empty())
            .or(self.content)
            .unwrap_or_default();
        NewsItem {
            headline: self.title.unwrap_or_default(),
            summary,
            source: self.source.name.unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            published_at: self.published_at.unwrap_or_default(),
        }
    }
}

pub struct NewsApiProvider {
    api_key: String,
    language: String,
    client: reqwest::blocking::Client,
}

impl NewsApiProvider {
    pub fn new(config: &NewsConfig) -> Result<Self, NewsError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(NewsError::MissingApiKey)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NewsError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            api_key,
            language: config.language.clone(),
            client,
        })
    }

    fn parse(body: EverythingResponse, page_size: usize) -> Result<Vec<NewsItem>, NewsError> {
        if body.status != "ok" {
            return Err(NewsError::Malformed(
                body.message.unwrap_or_else(|| format!("status {}", body.status)),
            ));
        }
        Ok(body
            .articles
            .into_iter()
            .take(page_size)
            .map(Article::into_item)
            .collect())
    }
}

impl NewsProvider for NewsApiProvider {
    fn name(&self) -> &str {
        "newsapi"
    }

    fn fetch_news(&self, query: &str, page_size: usize) -> Result<Vec<NewsItem>, NewsError> {
        info!(%query, page_size, "fetching news from NewsAPI");

        let page = page_size.to_string();
        let response = self
            .client
            .get(EVERYTHING_URL)
            .query(&[
                ("q", query),
                ("language", self.language.as_str()),
                ("pageSize", page.as_str()),
                ("sortBy", "publishedAt"),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .map_err(|e| {
                error!(error = %e, "NewsAPI request failed");
                NewsError::Request(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            error!(status = status.as_u16(), "NewsAPI returned an error status");
            return Err(NewsError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: EverythingResponse = response
            .json()
            .map_err(|e| NewsError::Malformed(e.to_string()))?;
        Self::parse(body, page_size)
    }
}
