//! Tradewise terminal dashboard.
//!
//! Layout: header metrics, sidebar controls on the left, four tabs on the
//! right (Overview, Charts, Indicators, News), status bar at the bottom.

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{info, warn};

use tradewise_core::config::DashboardConfig;
use tradewise_core::dashboard::DEFAULT_TICKER;
use tradewise_core::indicators::SMA_PERIOD_RANGE;
use tradewise_core::{Dashboard, DashboardRequest};

use tradewise_tui::app::AppState;
use tradewise_tui::theme::Theme;
use tradewise_tui::worker::{self, WorkerCommand};
use tradewise_tui::{input, logging, persistence, ui};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Redraw cadence; also the longest a worker response waits to be shown.
const TICK: Duration = Duration::from_millis(50);

#[derive(Debug, Parser)]
#[command(name = "tradewise-tui", version, about = "Terminal equity dashboard")]
struct Args {
    /// TOML config file (defaults to ./tradewise.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use seeded synthetic prices instead of Yahoo Finance
    #[arg(long)]
    synthetic: bool,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Log file (defaults to the platform data directory)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_path = args.log_file.clone().unwrap_or_else(logging::default_log_path);
    logging::init_file(&log_path)?;
    install_panic_hook();

    let config = Arc::new(
        DashboardConfig::load(args.config.as_deref()).context("failed to load configuration")?,
    );
    let dashboard = if args.synthetic {
        info!(seed = args.seed, "using synthetic market data");
        Dashboard::with_synthetic(Arc::clone(&config), args.seed)
    } else {
        Dashboard::with_yahoo(Arc::clone(&config)).context("failed to set up Yahoo Finance client")?
    };

    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle = worker::spawn_worker(Arc::new(dashboard), cmd_rx, resp_tx)
        .context("failed to spawn worker thread")?;

    let mut request = DashboardRequest::new(DEFAULT_TICKER, chrono::Local::now().date_naive());
    request.window = config.default_window();
    let export_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut app = AppState::new(
        cmd_tx.clone(),
        resp_rx,
        request,
        Theme::from_palette(&config.palette),
        export_dir,
    );
    if SMA_PERIOD_RANGE.contains(&config.display.default_sma_period) {
        app.sma_period = config.display.default_sma_period;
    }

    let state_path = persistence::default_state_path();
    persistence::apply(&mut app, persistence::load(&state_path));
    app.submit();

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut app);

    if let Err(e) = persistence::save(&state_path, &persistence::extract(&app)) {
        warn!(error = %e, path = %state_path.display(), "failed to save UI state");
    }
    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    if worker_handle.join().is_err() {
        warn!("worker thread panicked");
    }

    restore_terminal(&mut terminal)?;
    result
}

/// Leave raw mode and the alternate screen before the default hook prints.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(panic);
    }));
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut out = io::stdout();
    execute!(out, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(out))?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn event_loop(terminal: &mut Tui, app: &mut AppState) -> Result<()> {
    while app.running {
        terminal.draw(|f| ui::draw(f, app))?;

        while let Ok(resp) = app.worker_rx.try_recv() {
            app.handle_response(resp);
        }

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }
    }
    Ok(())
}
