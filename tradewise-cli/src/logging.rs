use anyhow::{anyhow, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_level: String,
    pub ansi: bool,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self {
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            ansi: std::env::var_os("NO_COLOR").is_none(),
        }
    }

    /// Verbose and quiet flags win over `RUST_LOG`.
    pub fn with_override(mut self, verbose: bool, quiet: bool) -> Self {
        if verbose {
            self.log_level = "debug".into();
        } else if quiet {
            self.log_level = "warn".into();
        }
        self
    }
}

/// Console logging on stderr so stdout stays clean for reports and JSON.
pub fn init_console(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| anyhow!("invalid log filter '{}': {e}", config.log_level))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(config.ansi)
                .with_target(false),
        )
        .try_init()?;

    Ok(())
}
