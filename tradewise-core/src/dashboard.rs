//! Dashboard orchestrator: one request in, one report out.
//!
//! Pipeline per render:
//! 1. validate the request (warnings, never errors)
//! 2. company info, degrading to an empty profile
//! 3. cached price history; an empty or failed fetch ends the cycle with "no data"
//! 4. metrics, recent rows and windowed charts
//! 5. RSI over the full series, shared by the indicator chart and the alerts
//! 6. alerts, then news with sentiment
//!
//! Collaborators are trait objects so callers can swap real, synthetic and fake sources.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::alerts::{self, AlertConditions, AlertStatus};
use crate::chart::{ChartBuilder, ChartSpec};
use crate::config::DashboardConfig;
use crate::data::{
    CachedHistory, CircuitBreaker, DataError, HistoryProvider, InfoProvider, SyntheticProvider,
    YahooProvider,
};
use crate::domain::{Bar, CompanyInfo, PriceSeries};
use crate::fundamentals::{fundamentals_tables, recent_rows, FundamentalRow, Overview, TopMetrics};
use crate::indicators::{IndicatorEngine, DEFAULT_SMA_PERIOD, SMA_PERIOD_RANGE};
use crate::news::{gather_news, NewsApiProvider, NewsOutcome, NewsProvider};
use crate::window::Window;

pub const DEFAULT_TICKER: &str = "TSLA";
pub const NO_DATA_MESSAGE: &str = "No historical data found for this ticker/date-range.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChartType {
    #[default]
    Candle,
    Line,
}

impl ChartType {
    pub const ALL: [ChartType; 2] = [ChartType::Candle, ChartType::Line];

    pub fn label(self) -> &'static str {
        match self {
            ChartType::Candle => "Candle",
            ChartType::Line => "Line",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IndicatorChoice {
    #[default]
    None,
    Rsi,
    Macd,
    MovingAverage {
        period: usize,
    },
}

impl IndicatorChoice {
    pub fn label(self) -> &'static str {
        match self {
            IndicatorChoice::None => "None",
            IndicatorChoice::Rsi => "RSI",
            IndicatorChoice::Macd => "MACD",
            IndicatorChoice::MovingAverage { .. } => "Moving Average",
        }
    }

    /// Selector order with the given SMA period for the moving-average entry.
    pub fn all(sma_period: usize) -> [IndicatorChoice; 4] {
        [
            IndicatorChoice::None,
            IndicatorChoice::Rsi,
            IndicatorChoice::Macd,
            IndicatorChoice::MovingAverage { period: sma_period },
        ]
    }
}

/// Everything a user can set in the sidebar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardRequest {
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub window: Window,
    pub chart_type: ChartType,
    pub indicator: IndicatorChoice,
    pub alerts: AlertConditions,
    /// Ask the external news provider before falling back.
    pub use_news_provider: bool,
}

/// One year back from `today` on the same month and day (clamped for Feb 29).
pub fn default_range(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today.checked_sub_months(Months::new(12)).unwrap_or(today);
    (start, today)
}

impl DashboardRequest {
    pub fn new(ticker: impl Into<String>, today: NaiveDate) -> Self {
        let (start, end) = default_range(today);
        Self {
            ticker: ticker.into(),
            start,
            end,
            window: Window::Custom,
            chart_type: ChartType::default(),
            indicator: IndicatorChoice::default(),
            alerts: AlertConditions::default(),
            use_news_provider: true,
        }
    }

    /// Normalize user input. Invalid pieces are reset and described in the returned warnings.
    pub fn validated(&self, today: NaiveDate) -> (DashboardRequest, Vec<String>) {
        let mut request = self.clone();
        let mut warnings = Vec::new();

        request.ticker = request.ticker.trim().to_uppercase();
        if request.ticker.is_empty() {
            warnings.push(format!("Ticker symbol is empty. Using {DEFAULT_TICKER}."));
            request.ticker = DEFAULT_TICKER.to_string();
        }

        if request.start >= request.end {
            warnings.push("Start date must be before end date. Resetting to defaults.".into());
            (request.start, request.end) = default_range(today);
        }

        if let IndicatorChoice::MovingAverage { period } = request.indicator {
            if !SMA_PERIOD_RANGE.contains(&period) {
                let clamped = period.clamp(*SMA_PERIOD_RANGE.start(), *SMA_PERIOD_RANGE.end());
                warnings.push(format!("SMA period {period} out of range. Using {clamped}."));
                request.indicator = IndicatorChoice::MovingAverage { period: clamped };
            }
        }

        for (name, condition) in [
            ("Price", &mut request.alerts.price),
            ("RSI", &mut request.alerts.rsi),
        ] {
            if !condition.threshold.is_finite() {
                warnings.push(format!("{name} alert threshold is not a number. Disabled."));
                condition.threshold = 0.0;
            }
        }

        (request, warnings)
    }
}

/// Charts, metrics and alerts for a cycle that had price data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryView {
    /// Full fetched series; exports and indicators use all of it.
    pub series: PriceSeries,
    pub display_window: Window,
    pub metrics: TopMetrics,
    pub recent: Vec<Bar>,
    pub price_chart: ChartSpec,
    pub volume_chart: ChartSpec,
    /// `None` when no indicator is selected.
    pub indicator_chart: Option<ChartSpec>,
    /// Last defined RSI(14) over the full series.
    pub latest_rsi: Option<f64>,
    pub alerts: AlertStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardReport {
    pub request: DashboardRequest,
    pub warnings: Vec<String>,
    pub overview: Overview,
    pub fundamentals_left: Vec<FundamentalRow>,
    pub fundamentals_right: Vec<FundamentalRow>,
    /// `None` is the "no data" state: indicators, alerts and news did not run.
    pub history: Option<HistoryView>,
    pub news: Option<NewsOutcome>,
}

impl DashboardReport {
    pub fn has_data(&self) -> bool {
        self.history.is_some()
    }

    /// `NotChecked` in the no-data state.
    pub fn alert_status(&self) -> AlertStatus {
        self.history
            .as_ref()
            .map(|h| h.alerts.clone())
            .unwrap_or_default()
    }
}

pub struct Dashboard {
    config: Arc<DashboardConfig>,
    history: Arc<dyn HistoryProvider>,
    info: Arc<dyn InfoProvider>,
    news: Option<Arc<dyn NewsProvider>>,
}

impl Dashboard {
    pub fn new(
        config: Arc<DashboardConfig>,
        history: Arc<dyn HistoryProvider>,
        info: Arc<dyn InfoProvider>,
        news: Option<Arc<dyn NewsProvider>>,
    ) -> Self {
        Self {
            config,
            history,
            info,
            news,
        }
    }

    /// Yahoo Finance behind the history cache, plus NewsAPI when a key is configured.
    pub fn with_yahoo(config: Arc<DashboardConfig>) -> Result<Self, DataError> {
        let market = &config.market_data;
        let breaker = Arc::new(CircuitBreaker::from_config(market));
        let yahoo = Arc::new(YahooProvider::new(breaker, market)?);
        let history = Arc::new(CachedHistory::new(
            yahoo.clone(),
            Duration::from_secs(market.cache_ttl_secs),
        ));
        let news = Self::configured_news(&config);
        Ok(Self::new(config, history, yahoo, news))
    }

    /// Offline dashboard over seeded synthetic data.
    pub fn with_synthetic(config: Arc<DashboardConfig>, seed: u64) -> Self {
        let synthetic = Arc::new(SyntheticProvider::new(seed));
        let history = Arc::new(CachedHistory::new(
            synthetic.clone(),
            Duration::from_secs(config.market_data.cache_ttl_secs),
        ));
        Self::new(config, history, synthetic, None)
    }

    fn configured_news(config: &DashboardConfig) -> Option<Arc<dyn NewsProvider>> {
        if !config.news.is_active() {
            return None;
        }
        match NewsApiProvider::new(&config.news) {
            Ok(provider) => Some(Arc::new(provider)),
            Err(e) => {
                warn!(error = %e, "news provider unavailable");
                None
            }
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// A request pre-filled from configuration defaults.
    pub fn default_request(&self, ticker: &str, today: NaiveDate) -> DashboardRequest {
        let mut request = DashboardRequest::new(ticker, today);
        request.window = self.config.default_window();
        request
    }

    pub fn render(&self, request: &DashboardRequest) -> DashboardReport {
        self.render_on(request, chrono::Local::now().date_naive())
    }

    /// Render with an explicit "today" (used for default date ranges).
    pub fn render_on(&self, request: &DashboardRequest, today: NaiveDate) -> DashboardReport {
        let (request, mut warnings) = request.validated(today);
        let display = &self.config.display;
        let ticker = request.ticker.as_str();
        info!(%ticker, start = %request.start, end = %request.end, "rendering dashboard");

        let company = self.info.fetch_info(ticker).unwrap_or_else(|e| {
            warn!(%ticker, error = %e, "company info unavailable");
            CompanyInfo::default()
        });
        let overview = Overview::from_info(&company, display.summary_max_chars);
        let (fundamentals_left, fundamentals_right) = fundamentals_tables(&company);

        let series = match self.history.fetch_history(ticker, request.start, request.end) {
            Ok(series) if !series.is_empty() => Some(series),
            Ok(_) => {
                info!(%ticker, "history fetch returned no bars");
                None
            }
            Err(e) => {
                warn!(%ticker, error = %e, "history fetch failed");
                None
            }
        };

        let Some(series) = series else {
            warnings.push(NO_DATA_MESSAGE.to_string());
            return DashboardReport {
                request,
                warnings,
                overview,
                fundamentals_left,
                fundamentals_right,
                history: None,
                news: None,
            };
        };

        let history = self.analyze(&request, series);

        let provider = self.news.as_deref().filter(|_| request.use_news_provider);
        let news = gather_news(
            ticker,
            provider,
            self.config.news.page_size,
            &company,
            display.summary_max_chars,
        );

        DashboardReport {
            request,
            warnings,
            overview,
            fundamentals_left,
            fundamentals_right,
            history,
            news: Some(news),
        }
    }

    /// Everything derived from a non-empty series.
    fn analyze(&self, request: &DashboardRequest, series: PriceSeries) -> Option<HistoryView> {
        let metrics = TopMetrics::from_series(&series)?;
        let display = &self.config.display;
        let window = request.window.for_display();
        let charts = ChartBuilder::new(&self.config.palette, window);

        let price_chart = match request.chart_type {
            ChartType::Candle => charts.candlestick(&series),
            ChartType::Line => charts.close_chart(&series),
        };
        let volume_chart = charts.volume_chart(&series, display.volume_tail);

        let rsi = IndicatorEngine::rsi(&series);
        let latest_rsi = rsi.last_defined();

        let indicator_chart = match request.indicator {
            IndicatorChoice::None => None,
            IndicatorChoice::Rsi => Some(charts.rsi_chart(&rsi)),
            IndicatorChoice::Macd => Some(charts.macd_chart(&IndicatorEngine::macd(&series))),
            IndicatorChoice::MovingAverage { period } => {
                let sma = IndicatorEngine::sma(&series, period);
                Some(charts.sma_chart(&series, &sma, period))
            }
        };

        let alerts = alerts::evaluate(&request.ticker, metrics.price, latest_rsi, &request.alerts);
        if let AlertStatus::Triggered(fired) = &alerts {
            for alert in fired {
                info!(ticker = %request.ticker, message = %alert.message, "alert triggered");
            }
        }

        Some(HistoryView {
            recent: recent_rows(&series, display.recent_rows),
            series,
            display_window: window,
            metrics,
            price_chart,
            volume_chart,
            indicator_chart,
            latest_rsi,
            alerts,
        })
    }
}

/// Moving average at the configured default period.
pub fn default_moving_average(config: &DashboardConfig) -> IndicatorChoice {
    let period = if SMA_PERIOD_RANGE.contains(&config.display.default_sma_period) {
        config.display.default_sma_period
    } else {
        DEFAULT_SMA_PERIOD
    };
    IndicatorChoice::MovingAverage { period }
}
