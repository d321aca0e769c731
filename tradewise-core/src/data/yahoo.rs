//! Yahoo Finance data provider.
//!
//! Fetches daily OHLCV bars from Yahoo's v8 chart API and company profile data
//! from the v10 quoteSummary API. Handles rate limiting, retries with
//! exponential backoff, response parsing, and the circuit breaker.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, HistoryProvider, InfoProvider, RawBar};
use crate::config::MarketDataConfig;
use crate::domain::{CompanyInfo, NewsItem, PriceSeries};

const CHART_BASE: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const SUMMARY_BASE: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const SEARCH_URL: &str = "https://query2.finance.yahoo.com/v1/finance/search";
const SUMMARY_MODULES: &str = "assetProfile,summaryDetail,defaultKeyStatistics,financialData";

/// Longest single wait between retries.
const MAX_RETRY_WAIT: Duration = Duration::from_secs(120);

/// Embedded headlines requested alongside the profile.
pub const EMBEDDED_NEWS_COUNT: usize = 5;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds.
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResponse {
    quote_summary: SummaryResult,
}

#[derive(Debug, Deserialize)]
struct SummaryResult {
    result: Option<Vec<Value>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<SearchNews>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchNews {
    title: String,
    #[serde(default)]
    publisher: String,
    #[serde(default)]
    link: String,
    provider_publish_time: Option<i64>,
}

/// Yahoo Finance provider for both history and company info.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooProvider {
    pub fn new(
        circuit_breaker: Arc<CircuitBreaker>,
        config: &MarketDataConfig,
    ) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Chart URL for `[start, end)`; period2 is midnight of `end`, which excludes it.
    fn chart_url(symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Url, DataError> {
        let ts = |d: NaiveDate| d.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        Url::parse_with_params(
            &format!("{CHART_BASE}/{symbol}"),
            &[
                ("period1", ts(start).to_string()),
                ("period2", ts(end).to_string()),
                ("interval", "1d".to_string()),
            ],
        )
        .map_err(|e| DataError::InvalidRequest(format!("bad chart url for {symbol}: {e}")))
    }

    fn summary_url(symbol: &str) -> Result<Url, DataError> {
        Url::parse_with_params(
            &format!("{SUMMARY_BASE}/{symbol}"),
            &[("modules", SUMMARY_MODULES)],
        )
        .map_err(|e| DataError::InvalidRequest(format!("bad summary url for {symbol}: {e}")))
    }

    fn search_url(symbol: &str) -> Result<Url, DataError> {
        Url::parse_with_params(
            SEARCH_URL,
            &[
                ("q", symbol.to_string()),
                ("quotesCount", "0".to_string()),
                ("newsCount", EMBEDDED_NEWS_COUNT.to_string()),
            ],
        )
        .map_err(|e| DataError::InvalidRequest(format!("bad search url for {symbol}: {e}")))
    }

    /// Parse the chart API response into raw rows. A result without timestamps means no bars.
    fn parse_chart(symbol: &str, resp: ChartResponse) -> Result<Vec<RawBar>, DataError> {
        let result = resp.chart.result.ok_or_else(|| api_error(symbol, resp.chart.error))?;

        let Some(data) = result.into_iter().next() else {
            return Ok(Vec::new());
        };
        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };

        let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

        timestamps
            .iter()
            .enumerate()
            .map(|(i, &ts)| {
                let date = exchange_date(ts, data.meta.gmtoffset).ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;
                Ok(RawBar {
                    date,
                    open: quote.open.get(i).copied().flatten(),
                    high: quote.high.get(i).copied().flatten(),
                    low: quote.low.get(i).copied().flatten(),
                    close: quote.close.get(i).copied().flatten(),
                    volume: quote.volume.get(i).copied().flatten(),
                })
            })
            .collect()
    }

    /// Map the quoteSummary modules onto `CompanyInfo`.
    fn parse_summary(symbol: &str, resp: SummaryResponse) -> Result<CompanyInfo, DataError> {
        let result = resp
            .quote_summary
            .result
            .ok_or_else(|| api_error(symbol, resp.quote_summary.error))?;
        let modules = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("summary result is empty".into()))?;

        let profile = &modules["assetProfile"];
        let detail = &modules["summaryDetail"];
        let stats = &modules["defaultKeyStatistics"];
        let financial = &modules["financialData"];

        Ok(CompanyInfo {
            long_business_summary: text(profile, "longBusinessSummary"),
            sector: text(profile, "sector"),
            full_time_employees: number(profile, "fullTimeEmployees")
                .filter(|n| *n >= 0.0)
                .map(|n| n as u64),
            website: text(profile, "website"),
            market_cap: number(detail, "marketCap"),
            beta: number(detail, "beta").or_else(|| number(stats, "beta")),
            trailing_eps: number(stats, "trailingEps"),
            trailing_pe: number(detail, "trailingPE"),
            quick_ratio: number(financial, "quickRatio"),
            revenue_per_share: number(financial, "revenuePerShare"),
            profit_margins: number(financial, "profitMargins")
                .or_else(|| number(stats, "profitMargins")),
            debt_to_equity: number(financial, "debtToEquity"),
            return_on_equity: number(financial, "returnOnEquity"),
            dividend_yield: number(detail, "dividendYield"),
            news: Vec::new(),
        })
    }

    fn parse_search(resp: SearchResponse) -> Vec<NewsItem> {
        resp.news
            .into_iter()
            .take(EMBEDDED_NEWS_COUNT)
            .map(|n| NewsItem {
                headline: n.title,
                summary: String::new(),
                source: n.publisher,
                url: n.link,
                published_at: n
                    .provider_publish_time
                    .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
                    .map(|dt| dt.to_rfc3339())
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// GET `url` and decode the JSON body, retrying throttled, failed and
    /// timed-out attempts with doubling delays. The breaker is consulted
    /// before every attempt.
    fn get_json<T: DeserializeOwned>(&self, url: &Url, symbol: &str) -> Result<T, DataError> {
        let mut last_error = DataError::Other(format!("no attempt made for {symbol}"));
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = retry_delay(self.base_delay, attempt, &last_error);
                debug!(%symbol, attempt, ?delay, error = %last_error, "retrying market data request");
                std::thread::sleep(delay);
            }
            if !self.circuit_breaker.is_allowed() {
                warn!(
                    %symbol,
                    remaining_secs = self.circuit_breaker.remaining_cooldown().as_secs(),
                    "market data requests paused by breaker"
                );
                return Err(DataError::CircuitBreakerTripped);
            }
            match self.attempt(url, symbol) {
                Ok(body) => return Ok(body),
                Err(Attempt::Retry(e)) => last_error = e,
                Err(Attempt::Fail(e)) => return Err(e),
            }
        }
        Err(last_error)
    }

    fn attempt<T: DeserializeOwned>(&self, url: &Url, symbol: &str) -> Result<T, Attempt> {
        let resp = self.client.get(url.clone()).send().map_err(|e| {
            let retryable = e.is_connect() || e.is_timeout();
            let err = DataError::NetworkUnreachable(e.to_string());
            if retryable {
                Attempt::Retry(err)
            } else {
                Attempt::Fail(err)
            }
        })?;

        match resp.status() {
            // Yahoo answers an IP ban with 403.
            StatusCode::FORBIDDEN => {
                self.circuit_breaker.trip();
                return Err(Attempt::Fail(DataError::CircuitBreakerTripped));
            }
            StatusCode::TOO_MANY_REQUESTS => {
                self.circuit_breaker.record_failure();
                return Err(Attempt::Retry(DataError::RateLimited {
                    retry_after_secs: retry_after_secs(resp.headers()),
                }));
            }
            StatusCode::UNAUTHORIZED => {
                return Err(Attempt::Fail(DataError::AuthenticationRequired(
                    "Yahoo Finance rejected the request as unauthenticated".into(),
                )));
            }
            StatusCode::NOT_FOUND => {
                return Err(Attempt::Fail(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                }));
            }
            status if !status.is_success() => {
                self.circuit_breaker.record_failure();
                return Err(Attempt::Retry(DataError::Other(format!(
                    "HTTP {status} for {symbol}"
                ))));
            }
            _ => {}
        }

        let body = resp.json::<T>().map_err(|e| {
            Attempt::Fail(DataError::ResponseFormatChanged(format!(
                "undecodable Yahoo response for {symbol}: {e}"
            )))
        })?;
        self.circuit_breaker.record_success();
        Ok(body)
    }
}

/// Outcome of a failed HTTP attempt.
enum Attempt {
    Retry(DataError),
    Fail(DataError),
}

/// Delay before retry `attempt` (1-based): doubling from `base`, but never
/// shorter than a rate limit's `Retry-After`, capped at [`MAX_RETRY_WAIT`].
fn retry_delay(base: Duration, attempt: u32, last_error: &DataError) -> Duration {
    let backoff = base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)));
    let delay = match last_error {
        DataError::RateLimited { retry_after_secs } => {
            backoff.max(Duration::from_secs(*retry_after_secs))
        }
        _ => backoff,
    };
    delay.min(MAX_RETRY_WAIT)
}

/// Calendar date of a bar timestamp in the exchange's own time zone.
fn exchange_date(ts: i64, gmtoffset: i64) -> Option<NaiveDate> {
    let local = ts.checked_add(gmtoffset)?;
    chrono::DateTime::from_timestamp(local, 0).map(|dt| dt.naive_utc().date())
}

/// `Retry-After` in seconds, 60 when absent or not a plain integer.
fn retry_after_secs(headers: &HeaderMap) -> u64 {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(60)
}

impl HistoryProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch_history(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        info!(%ticker, %start, %end, "fetching price history");
        let chart: ChartResponse = self.get_json(&Self::chart_url(ticker, start, end)?, ticker)?;
        let raw = Self::parse_chart(ticker, chart)?;
        let series = PriceSeries::from_raw(ticker, raw);
        info!(%ticker, bars = series.len(), "price history fetched");
        Ok(series)
    }
}

impl InfoProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch_info(&self, ticker: &str) -> Result<CompanyInfo, DataError> {
        info!(%ticker, "fetching company info");
        let summary: SummaryResponse = self.get_json(&Self::summary_url(ticker)?, ticker)?;
        let mut company = Self::parse_summary(ticker, summary)?;

        // Headlines are a separate endpoint; losing them must not lose the profile.
        match Self::search_url(ticker).and_then(|url| self.get_json::<SearchResponse>(&url, ticker)) {
            Ok(search) => company.news = Self::parse_search(search),
            Err(e) => warn!(%ticker, error = %e, "embedded news unavailable"),
        }

        Ok(company)
    }
}

fn api_error(symbol: &str, error: Option<ApiError>) -> DataError {
    match error {
        Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        },
        Some(err) => DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description)),
        None => DataError::ResponseFormatChanged("empty result with no error".into()),
    }
}

/// Numeric field that may be a bare number or a `{ "raw": .., "fmt": .. }` object.
fn number(module: &Value, key: &str) -> Option<f64> {
    let field = &module[key];
    field["raw"].as_f64().or_else(|| field.as_f64())
}

fn text(module: &Value, key: &str) -> Option<String> {
    module[key]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}
