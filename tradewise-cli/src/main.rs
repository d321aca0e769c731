//! TradeWise CLI: single-ticker analysis from the terminal.
//!
//! Commands:
//! - `analyze`: render the dashboard for one ticker as text or JSON
//! - `export`: write the fetched price history as `{TICKER}_history.csv`
//! - `news`: headlines with keyword sentiment
//! - `config`: print the effective configuration (API key masked)

mod logging;
mod render;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tradewise_core::alerts::AlertConditions;
use tradewise_core::config::DashboardConfig;
use tradewise_core::dashboard::{
    default_moving_average, ChartType, IndicatorChoice, DEFAULT_TICKER,
};
use tradewise_core::data::{CircuitBreaker, HistoryProvider, InfoProvider, SyntheticProvider, YahooProvider};
use tradewise_core::export::save_csv;
use tradewise_core::news::{gather_news, NewsApiProvider, NewsProvider};
use tradewise_core::window::Window;
use tradewise_core::{Dashboard, DashboardRequest};

use crate::logging::LoggingConfig;

#[derive(Parser)]
#[command(
    name = "tradewise",
    version,
    about = "TradeWise CLI: price history, indicators, alerts and headline sentiment"
)]
struct Cli {
    /// Path to a TOML config file. Defaults to ./tradewise.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    /// Warnings only.
    #[arg(short, long, global = true, default_value_t = false)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the dashboard for one ticker.
    Analyze {
        /// Ticker symbol (e.g., TSLA). Defaults to TSLA.
        ticker: Option<String>,

        #[command(flatten)]
        range: RangeArgs,

        /// Quick range: 5d, 1mo, 6mo, ytd, 1y, 5y, max. Defaults to the configured window.
        #[arg(long)]
        window: Option<String>,

        /// Price chart style.
        #[arg(long, value_enum, default_value_t = ChartStyle::Candle)]
        chart_type: ChartStyle,

        /// Indicator panel.
        #[arg(long, value_enum, default_value_t = IndicatorArg::None)]
        indicator: IndicatorArg,

        /// SMA period (5-200) for `--indicator sma`. Defaults to the configured period.
        #[arg(long)]
        sma_period: Option<usize>,

        /// Alert when the latest close is at or above this price. 0 disables.
        #[arg(long, default_value_t = 0.0)]
        price_alert: f64,

        /// Alert when the latest RSI(14) is at or below this value. 0 disables.
        #[arg(long, default_value_t = 0.0)]
        rsi_alert: f64,

        /// Skip the external news provider.
        #[arg(long, default_value_t = false)]
        no_news: bool,

        #[command(flatten)]
        source: SourceArgs,

        /// Print the report as JSON instead of text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write the price history for a ticker as CSV.
    Export {
        /// Ticker symbol.
        ticker: String,

        #[command(flatten)]
        range: RangeArgs,

        /// Output directory. Defaults to the working directory.
        #[arg(long, default_value = ".")]
        out: PathBuf,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Show headlines with keyword sentiment.
    News {
        /// Ticker symbol.
        ticker: String,

        /// Skip the external news provider.
        #[arg(long, default_value_t = false)]
        no_news: bool,

        #[command(flatten)]
        source: SourceArgs,
    },
    /// Print the effective configuration.
    Config,
}

#[derive(clap::Args)]
struct RangeArgs {
    /// Start date (YYYY-MM-DD). Defaults to one year before the end date.
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD), exclusive. Defaults to today.
    #[arg(long)]
    end: Option<String>,
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Offline mode: seeded synthetic data instead of Yahoo Finance.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Seed for synthetic data.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Clone, Copy, ValueEnum)]
enum ChartStyle {
    Candle,
    Line,
}

#[derive(Clone, Copy, ValueEnum)]
enum IndicatorArg {
    None,
    Rsi,
    Macd,
    Sma,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init_console(&LoggingConfig::from_env().with_override(cli.verbose, cli.quiet))?;

    let config = Arc::new(
        DashboardConfig::load(cli.config.as_deref()).context("failed to load configuration")?,
    );
    let today = chrono::Local::now().date_naive();

    match cli.command {
        Commands::Analyze {
            ticker,
            range,
            window,
            chart_type,
            indicator,
            sma_period,
            price_alert,
            rsi_alert,
            no_news,
            source,
            json,
        } => {
            let dashboard = build_dashboard(config, &source)?;
            let mut request = dashboard
                .default_request(ticker.as_deref().unwrap_or(DEFAULT_TICKER), today);
            apply_range(&mut request, &range)?;
            if let Some(tag) = window {
                request.window = parse_window(&tag)?;
            }
            request.chart_type = match chart_type {
                ChartStyle::Candle => ChartType::Candle,
                ChartStyle::Line => ChartType::Line,
            };
            request.indicator = indicator_choice(indicator, sma_period, dashboard.config());
            request.alerts = AlertConditions::new(price_alert, rsi_alert);
            request.use_news_provider = !no_news;
            run_analyze(&dashboard, &request, json)
        }
        Commands::Export {
            ticker,
            range,
            out,
            source,
        } => run_export(&config, &ticker, &range, &out, &source, today),
        Commands::News {
            ticker,
            no_news,
            source,
        } => run_news(&config, &ticker, no_news, &source),
        Commands::Config => {
            print!("{}", config.to_redacted_toml()?);
            Ok(())
        }
    }
}

fn build_dashboard(config: Arc<DashboardConfig>, source: &SourceArgs) -> Result<Dashboard> {
    if source.synthetic {
        info!(seed = source.seed, "using synthetic market data");
        return Ok(Dashboard::with_synthetic(config, source.seed));
    }
    Dashboard::with_yahoo(config).context("failed to set up Yahoo Finance client")
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}'"))
}

fn apply_range(request: &mut DashboardRequest, range: &RangeArgs) -> Result<()> {
    let end = range.end.as_deref().map(parse_date).transpose()?;
    let start = range.start.as_deref().map(parse_date).transpose()?;
    if let Some(end) = end {
        request.end = end;
        request.start = tradewise_core::dashboard::default_range(end).0;
    }
    if let Some(start) = start {
        request.start = start;
    }
    Ok(())
}

fn parse_window(tag: &str) -> Result<Window> {
    let window = Window::from_tag(tag);
    if window == Window::Custom && !tag.trim().is_empty() {
        bail!("unknown window '{tag}'. Valid: 5d, 1mo, 6mo, ytd, 1y, 5y, max");
    }
    Ok(window)
}

fn indicator_choice(
    arg: IndicatorArg,
    sma_period: Option<usize>,
    config: &DashboardConfig,
) -> IndicatorChoice {
    match arg {
        IndicatorArg::None => IndicatorChoice::None,
        IndicatorArg::Rsi => IndicatorChoice::Rsi,
        IndicatorArg::Macd => IndicatorChoice::Macd,
        IndicatorArg::Sma => match sma_period {
            Some(period) => IndicatorChoice::MovingAverage { period },
            None => default_moving_average(config),
        },
    }
}

fn run_analyze(dashboard: &Dashboard, request: &DashboardRequest, json: bool) -> Result<()> {
    let report = dashboard.render(request);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let stdout = std::io::stdout();
        render::write_report(&mut stdout.lock(), &report)?;
    }

    if !report.has_data() {
        std::process::exit(2);
    }
    Ok(())
}

fn run_export(
    config: &Arc<DashboardConfig>,
    ticker: &str,
    range: &RangeArgs,
    out: &Path,
    source: &SourceArgs,
    today: NaiveDate,
) -> Result<()> {
    let mut request = DashboardRequest::new(ticker, today);
    apply_range(&mut request, range)?;
    let (request, warnings) = request.validated(today);
    for warning in &warnings {
        warn!("{warning}");
    }

    let provider = history_provider(config, source)?;
    let series = provider
        .fetch_history(&request.ticker, request.start, request.end)
        .with_context(|| format!("failed to fetch history for {}", request.ticker))?;
    if series.is_empty() {
        bail!(
            "no historical data for {} between {} and {}",
            request.ticker,
            request.start,
            request.end
        );
    }

    std::fs::create_dir_all(out)
        .with_context(|| format!("failed to create {}", out.display()))?;
    let path = save_csv(&series, out)?;
    println!("Exported {} bars to {}", series.len(), path.display());
    Ok(())
}

fn run_news(
    config: &Arc<DashboardConfig>,
    ticker: &str,
    no_news: bool,
    source: &SourceArgs,
) -> Result<()> {
    let ticker = ticker.trim().to_uppercase();
    if ticker.is_empty() {
        bail!("ticker symbol is empty");
    }

    let info = info_provider(config, source)?;
    let company = info.fetch_info(&ticker).unwrap_or_else(|e| {
        warn!(%ticker, error = %e, "company info unavailable");
        Default::default()
    });

    let external: Option<NewsApiProvider> = if no_news || !config.news.is_active() {
        None
    } else {
        Some(NewsApiProvider::new(&config.news)?)
    };
    let outcome = gather_news(
        &ticker,
        external.as_ref().map(|p| p as &dyn NewsProvider),
        config.news.page_size,
        &company,
        config.display.summary_max_chars,
    );

    let stdout = std::io::stdout();
    render::write_news(&mut stdout.lock(), &outcome)?;
    Ok(())
}

fn history_provider(
    config: &DashboardConfig,
    source: &SourceArgs,
) -> Result<Arc<dyn HistoryProvider>> {
    if source.synthetic {
        return Ok(Arc::new(SyntheticProvider::new(source.seed)));
    }
    Ok(Arc::new(yahoo(config)?))
}

fn info_provider(config: &DashboardConfig, source: &SourceArgs) -> Result<Arc<dyn InfoProvider>> {
    if source.synthetic {
        return Ok(Arc::new(SyntheticProvider::new(source.seed)));
    }
    Ok(Arc::new(yahoo(config)?))
}

fn yahoo(config: &DashboardConfig) -> Result<YahooProvider> {
    let market = &config.market_data;
    let breaker = Arc::new(CircuitBreaker::from_config(market));
    Ok(YahooProvider::new(breaker, market)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn synthetic() -> SourceArgs {
        SourceArgs {
            synthetic: true,
            seed: 42,
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_analyze_flags() {
        let cli = Cli::try_parse_from([
            "tradewise",
            "analyze",
            "aapl",
            "--window",
            "ytd",
            "--indicator",
            "sma",
            "--sma-period",
            "20",
            "--rsi-alert",
            "30",
            "--synthetic",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze {
                ticker,
                window,
                indicator,
                sma_period,
                rsi_alert,
                source,
                ..
            } => {
                assert_eq!(ticker.as_deref(), Some("aapl"));
                assert_eq!(window.as_deref(), Some("ytd"));
                assert!(matches!(indicator, IndicatorArg::Sma));
                assert_eq!(sma_period, Some(20));
                assert_eq!(rsi_alert, 30.0);
                assert!(source.synthetic);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn range_defaults_to_one_year_before_end() {
        let mut request = DashboardRequest::new("TSLA", d(2024, 6, 1));
        let range = RangeArgs {
            start: None,
            end: Some("2023-03-31".into()),
        };
        apply_range(&mut request, &range).unwrap();
        assert_eq!(request.start, d(2022, 3, 31));
        assert_eq!(request.end, d(2023, 3, 31));
    }

    #[test]
    fn bad_date_is_an_error() {
        let mut request = DashboardRequest::new("TSLA", d(2024, 6, 1));
        let range = RangeArgs {
            start: Some("2024/01/01".into()),
            end: None,
        };
        assert!(apply_range(&mut request, &range).is_err());
    }

    #[test]
    fn window_tags() {
        assert_eq!(parse_window("YTD").unwrap(), Window::YearToDate);
        assert_eq!(parse_window("5y").unwrap(), Window::FiveYears);
        assert!(parse_window("2w").is_err());
    }

    #[test]
    fn sma_indicator_uses_configured_period() {
        let config = DashboardConfig::default();
        assert_eq!(
            indicator_choice(IndicatorArg::Sma, None, &config),
            IndicatorChoice::MovingAverage { period: 50 }
        );
        assert_eq!(
            indicator_choice(IndicatorArg::Sma, Some(10), &config),
            IndicatorChoice::MovingAverage { period: 10 }
        );
    }

    #[test]
    fn export_writes_csv_for_synthetic_history() {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(DashboardConfig::default());
        let range = RangeArgs {
            start: Some("2024-01-01".into()),
            end: Some("2024-02-01".into()),
        };
        run_export(&config, "spy", &range, dir.path(), &synthetic(), d(2024, 6, 1)).unwrap();

        let csv = std::fs::read_to_string(dir.path().join("SPY_history.csv")).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Date,Open,High,Low,Close,Volume"));
        // 23 weekdays in January 2024
        assert_eq!(lines.count(), 23);
    }

    #[test]
    fn export_of_empty_range_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(DashboardConfig::default());
        let range = RangeArgs {
            start: Some("2024-06-01".into()),
            end: Some("2024-06-03".into()),
        };
        let err = run_export(&config, "SPY", &range, dir.path(), &synthetic(), d(2024, 6, 4))
            .unwrap_err();
        assert!(err.to_string().contains("no historical data"));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
