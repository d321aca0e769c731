//! App state persistence: JSON save/load across restarts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use tradewise_core::dashboard::{ChartType, IndicatorChoice, DEFAULT_TICKER};
use tradewise_core::indicators::{DEFAULT_SMA_PERIOD, SMA_PERIOD_RANGE};
use tradewise_core::window::Window;

use crate::app::{AppState, Overlay, Tab};

/// Serializable subset of app state that persists across restarts.
///
/// Dates and alert thresholds are not kept. Every session starts from the
/// default one-year range with alerts off.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub ticker: String,
    pub window: String,
    pub chart_type: ChartType,
    pub indicator: IndicatorChoice,
    pub sma_period: usize,
    pub use_news_provider: bool,
    pub active_tab: Tab,
    pub help_dismissed: bool,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            ticker: DEFAULT_TICKER.into(),
            window: Window::OneYear.tag().into(),
            chart_type: ChartType::default(),
            indicator: IndicatorChoice::default(),
            sma_period: DEFAULT_SMA_PERIOD,
            use_news_provider: true,
            active_tab: Tab::Overview,
            help_dismissed: false,
        }
    }
}

/// `<config dir>/tradewise/state.json`, or `./tradewise/state.json` when the
/// platform has no config directory.
pub fn default_state_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tradewise")
        .join("state.json")
}

/// Load persisted state from disk. Returns defaults if file is missing or corrupt.
pub fn load(path: &Path) -> PersistedState {
    let Ok(content) = std::fs::read_to_string(path) else {
        return PersistedState::default();
    };
    serde_json::from_str(&content).unwrap_or_else(|e| {
        warn!(error = %e, path = %path.display(), "ignoring unreadable UI state");
        PersistedState::default()
    })
}

/// Save persisted state to disk. Creates parent directories if needed.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Extract persisted state from AppState.
pub fn extract(app: &AppState) -> PersistedState {
    PersistedState {
        ticker: app.request.ticker.clone(),
        window: app.request.window.tag().into(),
        chart_type: app.request.chart_type,
        indicator: app.request.indicator,
        sma_period: app.sma_period,
        use_news_provider: app.request.use_news_provider,
        active_tab: app.active_tab,
        help_dismissed: app.overlay != Overlay::Help,
    }
}

/// Apply persisted state to AppState. Out-of-range values fall back to defaults.
pub fn apply(app: &mut AppState, state: PersistedState) {
    if !state.ticker.trim().is_empty() {
        app.request.ticker = state.ticker.trim().to_uppercase();
    }
    if !state.window.is_empty() {
        app.request.window = Window::from_tag(&state.window);
    }
    app.request.chart_type = state.chart_type;
    app.sma_period = if SMA_PERIOD_RANGE.contains(&state.sma_period) {
        state.sma_period
    } else {
        DEFAULT_SMA_PERIOD
    };
    app.request.indicator = match state.indicator {
        IndicatorChoice::MovingAverage { .. } => IndicatorChoice::MovingAverage {
            period: app.sma_period,
        },
        other => other,
    };
    app.request.use_news_provider = state.use_news_provider;
    app.active_tab = state.active_tab;
    if !state.help_dismissed {
        app.overlay = Overlay::Help;
    }
}
