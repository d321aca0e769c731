//! Tradewise TUI: a single-ticker equity dashboard in the terminal.
//!
//! A sidebar of request controls drives four tabs:
//! - Overview: company profile, fundamentals, recent bars
//! - Charts: candlestick or line price chart with volume
//! - Indicators: RSI, MACD or moving average, with the alerts panel
//! - News: scored headlines
//!
//! Fetching and indicator work happens on a worker thread; the UI thread only
//! draws and handles keys.

pub mod app;
pub mod input;
pub mod logging;
pub mod persistence;
pub mod theme;
pub mod ui;
pub mod worker;

pub use app::AppState;
pub use theme::Theme;
