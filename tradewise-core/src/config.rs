//! Dashboard configuration.
//!
//! Loaded once at process start and shared read-only afterwards. Sources, later
//! ones winning: built-in defaults, a TOML file, environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::indicators::SMA_PERIOD_RANGE;
use crate::window::Window;

/// Looked up in the working directory when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "tradewise.toml";

pub const ENV_NEWSAPI_KEY: &str = "NEWSAPI_KEY";
pub const ENV_CACHE_TTL: &str = "TRADEWISE_CACHE_TTL_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Chart and table colours as `#rrggbb` strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub accent: String,
    pub positive: String,
    pub negative: String,
    pub muted: String,
    pub signal: String,
    pub sma: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            accent: "#1f77b4".into(),
            positive: "#2ca02c".into(),
            negative: "#d62728".into(),
            muted: "#6c757d".into(),
            signal: "#ff7f0e".into(),
            sma: "#b36bff".into(),
        }
    }
}

impl Palette {
    fn entries(&self) -> [(&'static str, &str); 6] {
        [
            ("accent", &self.accent),
            ("positive", &self.positive),
            ("negative", &self.negative),
            ("muted", &self.muted),
            ("signal", &self.signal),
            ("sma", &self.sma),
        ]
    }
}

/// Parse `#rrggbb` (leading `#` optional).
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsConfig {
    /// Never compiled in; comes from the file or `NEWSAPI_KEY`.
    pub api_key: Option<String>,
    pub enabled: bool,
    pub page_size: usize,
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            enabled: true,
            page_size: 6,
            language: "en".into(),
            timeout_secs: 10,
        }
    }
}

impl NewsConfig {
    /// The provider is only worth calling with a key.
    pub fn is_active(&self) -> bool {
        self.enabled && self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub cache_ttl_secs: u64,
    pub breaker_cooldown_secs: u64,
    pub breaker_failure_threshold: u32,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            cache_ttl_secs: 3600,
            breaker_cooldown_secs: 1800,
            breaker_failure_threshold: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub summary_max_chars: usize,
    pub recent_rows: usize,
    pub volume_tail: usize,
    pub default_sma_period: usize,
    pub default_window: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            summary_max_chars: 800,
            recent_rows: 10,
            volume_tail: 180,
            default_sma_period: 50,
            default_window: "1y".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub palette: Palette,
    pub news: NewsConfig,
    pub market_data: MarketDataConfig,
    pub display: DisplayConfig,
}

impl DashboardConfig {
    /// Parse a config from a TOML string. Missing sections and keys keep their defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Full load: explicit file, else `tradewise.toml` when present, else defaults;
    /// then environment overrides; then validation.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_NEWSAPI_KEY).filter(|k| !k.trim().is_empty()) {
            self.news.api_key = Some(key);
        }
        if let Some(raw) = lookup(ENV_CACHE_TTL) {
            self.market_data.cache_ttl_secs =
                raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                    key: ENV_CACHE_TTL,
                    value: raw.clone(),
                })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in self.palette.entries() {
            if hex_to_rgb(value).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "palette.{name} is not a #rrggbb colour: {value}"
                )));
            }
        }
        if self.news.page_size == 0 {
            return Err(ConfigError::Invalid("news.page_size must be > 0".into()));
        }
        if !SMA_PERIOD_RANGE.contains(&self.display.default_sma_period) {
            return Err(ConfigError::Invalid(format!(
                "display.default_sma_period must be in {}..={}",
                SMA_PERIOD_RANGE.start(),
                SMA_PERIOD_RANGE.end()
            )));
        }
        Ok(())
    }

    /// Window used when a request does not name one.
    pub fn default_window(&self) -> Window {
        Window::from_tag(&self.display.default_window)
    }

    /// Serialized form with the API key masked, for display.
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        let mut shown = self.clone();
        if shown.news.api_key.is_some() {
            shown.news.api_key = Some("********".into());
        }
        toml::to_string_pretty(&shown).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
