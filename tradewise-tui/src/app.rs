//! Application state: single owner, main thread only.
//!
//! All TUI state lives here. The worker thread communicates via channels.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use tradewise_core::alerts::AlertStatus;
use tradewise_core::dashboard::{ChartType, IndicatorChoice};
use tradewise_core::indicators::{DEFAULT_SMA_PERIOD, SMA_PERIOD_RANGE};
use tradewise_core::window::Window;
use tradewise_core::{DashboardReport, DashboardRequest};

use crate::theme::Theme;
use crate::worker::{WorkerCommand, WorkerResponse};

const ERROR_HISTORY_CAP: usize = 50;
const SMA_STEP: usize = 5;
const PRICE_ALERT_STEP: f64 = 1.0;
const RSI_ALERT_STEP: f64 = 5.0;

/// Which tab is shown in the content area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tab {
    Overview,
    Charts,
    Indicators,
    News,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Overview, Tab::Charts, Tab::Indicators, Tab::News];

    pub fn index(self) -> usize {
        match self {
            Tab::Overview => 0,
            Tab::Charts => 1,
            Tab::Indicators => 2,
            Tab::News => 3,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        Tab::ALL.get(i).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Charts => "Charts",
            Tab::Indicators => "Indicators",
            Tab::News => "News",
        }
    }

    pub fn next(self) -> Tab {
        Tab::ALL[(self.index() + 1) % Tab::ALL.len()]
    }

    pub fn prev(self) -> Tab {
        Tab::ALL[(self.index() + Tab::ALL.len() - 1) % Tab::ALL.len()]
    }
}

/// One row of the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Ticker,
    Start,
    End,
    Window,
    ChartType,
    Indicator,
    SmaPeriod,
    PriceAlert,
    RsiAlert,
    NewsProvider,
}

impl Control {
    pub const ALL: [Control; 10] = [
        Control::Ticker,
        Control::Start,
        Control::End,
        Control::Window,
        Control::ChartType,
        Control::Indicator,
        Control::SmaPeriod,
        Control::PriceAlert,
        Control::RsiAlert,
        Control::NewsProvider,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Control::Ticker => "Ticker",
            Control::Start => "Start",
            Control::End => "End",
            Control::Window => "Quick range",
            Control::ChartType => "Chart type",
            Control::Indicator => "Indicator",
            Control::SmaPeriod => "SMA period",
            Control::PriceAlert => "Price alert >=",
            Control::RsiAlert => "RSI alert <=",
            Control::NewsProvider => "News API",
        }
    }

    /// Free-text controls open the edit prompt on Enter.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            Control::Ticker
                | Control::Start
                | Control::End
                | Control::SmaPeriod
                | Control::PriceAlert
                | Control::RsiAlert
        )
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// Error category for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Data,
    Input,
    Export,
    Worker,
    Other,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Data => "DATA",
            ErrorCategory::Input => "INPUT",
            ErrorCategory::Export => "EXPORT",
            ErrorCategory::Worker => "WORKER",
            ErrorCategory::Other => "ERR",
        }
    }

    fn from_worker(category: &str) -> Self {
        match category {
            "data" => ErrorCategory::Data,
            "export" => ErrorCategory::Export,
            "worker" => ErrorCategory::Worker,
            _ => ErrorCategory::Other,
        }
    }
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

/// In-progress text edit of a sidebar control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub control: Control,
    pub buffer: String,
}

/// Which overlay (if any) is shown on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    Help,
    ErrorHistory,
    Edit(EditState),
}

/// Top-level application state.
pub struct AppState {
    // Navigation
    pub active_tab: Tab,
    pub running: bool,
    pub cursor: usize,
    pub scroll: u16,

    // What the user asked for, and what the worker last produced
    pub request: DashboardRequest,
    /// Remembered while another indicator is selected.
    pub sma_period: usize,
    pub report: Option<DashboardReport>,
    pub in_flight: usize,

    // Worker communication
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,

    // Cross-cutting
    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,
    pub theme: Theme,

    // Paths
    pub export_dir: PathBuf,
}

impl AppState {
    pub fn new(
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        request: DashboardRequest,
        theme: Theme,
        export_dir: PathBuf,
    ) -> Self {
        let sma_period = match request.indicator {
            IndicatorChoice::MovingAverage { period } => period,
            _ => DEFAULT_SMA_PERIOD,
        };
        Self {
            active_tab: Tab::Overview,
            running: true,
            cursor: 0,
            scroll: 0,
            request,
            sma_period,
            report: None,
            in_flight: 0,
            worker_tx,
            worker_rx,
            status_message: None,
            error_history: VecDeque::with_capacity(ERROR_HISTORY_CAP),
            error_scroll: 0,
            overlay: Overlay::None,
            theme,
            export_dir,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn selected_control(&self) -> Control {
        Control::ALL[self.cursor.min(Control::ALL.len() - 1)]
    }

    pub fn select_tab(&mut self, tab: Tab) {
        if self.active_tab != tab {
            self.active_tab = tab;
            self.scroll = 0;
        }
    }

    /// Ask the worker for a fresh report of the current request.
    pub fn submit(&mut self) {
        let request = Box::new(self.request.clone());
        match self.worker_tx.send(WorkerCommand::Render { request }) {
            Ok(()) => {
                self.in_flight += 1;
                self.set_status(format!("Loading {}...", self.request.ticker));
            }
            Err(_) => self.push_error(
                ErrorCategory::Worker,
                "Worker thread is not running".into(),
                "render".into(),
            ),
        }
    }

    /// Export the full fetched history of the current report.
    pub fn export(&mut self) {
        let Some(history) = self.report.as_ref().and_then(|r| r.history.as_ref()) else {
            self.set_warning("Nothing to export: no price data loaded");
            return;
        };
        let cmd = WorkerCommand::Export {
            series: Box::new(history.series.clone()),
            dir: self.export_dir.clone(),
        };
        if self.worker_tx.send(cmd).is_err() {
            self.push_error(
                ErrorCategory::Worker,
                "Worker thread is not running".into(),
                "export".into(),
            );
        } else {
            self.set_status("Exporting CSV...");
        }
    }

    pub fn handle_response(&mut self, resp: WorkerResponse) {
        match resp {
            WorkerResponse::Rendered { report } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                if self.in_flight == 0 {
                    // Show the normalized request (upper-cased ticker, reset dates).
                    self.request = report.request.clone();
                }
                self.announce(&report);
                self.report = Some(*report);
            }
            WorkerResponse::Exported { path, bars } => {
                self.set_status(format!("Exported {bars} bars to {}", path.display()));
            }
            WorkerResponse::Error {
                category,
                message,
                context,
            } => {
                self.push_error(ErrorCategory::from_worker(&category), message, context);
            }
        }
    }

    fn announce(&mut self, report: &DashboardReport) {
        let ticker = report.request.ticker.clone();
        if !report.has_data() {
            for warning in &report.warnings {
                self.push_error(ErrorCategory::Data, warning.clone(), ticker.clone());
            }
            return;
        }
        if let AlertStatus::Triggered(fired) = report.alert_status() {
            let messages: Vec<&str> = fired.iter().map(|a| a.message.as_str()).collect();
            self.set_warning(messages.join(" | "));
        } else if !report.warnings.is_empty() {
            self.set_warning(report.warnings.join(" "));
        } else {
            self.set_status(format!("{ticker} updated"));
        }
    }

    // ── Sidebar ──────────────────────────────────────────────────────

    pub fn move_cursor(&mut self, delta: isize) {
        let len = Control::ALL.len() as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, len - 1) as usize;
    }

    /// Display text for a control's current value.
    pub fn control_value(&self, control: Control) -> String {
        let r = &self.request;
        match control {
            Control::Ticker => r.ticker.clone(),
            Control::Start => r.start.to_string(),
            Control::End => r.end.to_string(),
            Control::Window => r.window.label().to_string(),
            Control::ChartType => r.chart_type.label().to_string(),
            Control::Indicator => r.indicator.label().to_string(),
            Control::SmaPeriod => self.sma_period.to_string(),
            Control::PriceAlert => threshold_text(r.alerts.price.threshold),
            Control::RsiAlert => threshold_text(r.alerts.rsi.threshold),
            Control::NewsProvider => {
                let state = if r.use_news_provider { "On" } else { "Off" };
                state.to_string()
            }
        }
    }

    /// Step the selected control left (`-1`) or right (`+1`). Returns whether anything changed.
    pub fn adjust(&mut self, direction: i32) -> bool {
        let before = (self.request.clone(), self.sma_period);
        let control = self.selected_control();
        let r = &mut self.request;
        match control {
            Control::Ticker => {}
            Control::Start => r.start = shift_date(r.start, direction),
            Control::End => r.end = shift_date(r.end, direction),
            Control::Window => r.window = cycle(&Window::ALL, r.window, direction),
            Control::ChartType => r.chart_type = cycle(&ChartType::ALL, r.chart_type, direction),
            Control::Indicator => {
                r.indicator = cycle(&IndicatorChoice::all(self.sma_period), r.indicator, direction)
            }
            Control::SmaPeriod => {
                let step = SMA_STEP as i64 * i64::from(direction);
                let next = (self.sma_period as i64 + step).clamp(
                    *SMA_PERIOD_RANGE.start() as i64,
                    *SMA_PERIOD_RANGE.end() as i64,
                );
                self.set_sma_period(next as usize);
            }
            Control::PriceAlert => {
                let t = &mut r.alerts.price.threshold;
                *t = (*t + PRICE_ALERT_STEP * f64::from(direction)).max(0.0);
            }
            Control::RsiAlert => {
                let t = &mut r.alerts.rsi.threshold;
                *t = (*t + RSI_ALERT_STEP * f64::from(direction)).clamp(0.0, 100.0);
            }
            Control::NewsProvider => r.use_news_provider = !r.use_news_provider,
        }
        (self.request.clone(), self.sma_period) != before
    }

    fn set_sma_period(&mut self, period: usize) {
        self.sma_period = period;
        if let IndicatorChoice::MovingAverage { .. } = self.request.indicator {
            self.request.indicator = IndicatorChoice::MovingAverage { period };
        }
    }

    /// Open the edit prompt for a text control. Choice controls step right instead.
    pub fn begin_edit(&mut self) -> bool {
        let control = self.selected_control();
        if control.is_text() {
            let buffer = match control {
                Control::PriceAlert | Control::RsiAlert => {
                    let v = self.control_value(control);
                    if v == "Off" {
                        String::new()
                    } else {
                        v
                    }
                }
                _ => self.control_value(control),
            };
            self.overlay = Overlay::Edit(EditState { control, buffer });
            false
        } else {
            self.adjust(1)
        }
    }

    /// Apply the edit prompt. Returns whether the request changed.
    pub fn commit_edit(&mut self) -> bool {
        let Overlay::Edit(edit) = std::mem::replace(&mut self.overlay, Overlay::None) else {
            return false;
        };
        let text = edit.buffer.trim();
        let before = (self.request.clone(), self.sma_period);

        let result: Result<(), String> = match edit.control {
            Control::Ticker => {
                self.request.ticker = text.to_uppercase();
                Ok(())
            }
            Control::Start => parse_date(text).map(|d| self.request.start = d),
            Control::End => parse_date(text).map(|d| self.request.end = d),
            Control::SmaPeriod => parse_sma_period(text).map(|p| self.set_sma_period(p)),
            Control::PriceAlert => {
                parse_threshold(text).map(|t| self.request.alerts.price.threshold = t)
            }
            Control::RsiAlert => parse_threshold(text)
                .and_then(|t| {
                    if t <= 100.0 {
                        Ok(t)
                    } else {
                        Err(format!("RSI threshold {t} is above 100"))
                    }
                })
                .map(|t| self.request.alerts.rsi.threshold = t),
            _ => Ok(()),
        };

        if let Err(message) = result {
            self.push_error(ErrorCategory::Input, message, edit.control.label().into());
            return false;
        }
        (self.request.clone(), self.sma_period) != before
    }

    // ── Status ───────────────────────────────────────────────────────

    /// Push an error to the history, capping at 50.
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > ERROR_HISTORY_CAP {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }
}

fn threshold_text(threshold: f64) -> String {
    if threshold > 0.0 {
        format!("{threshold:.2}")
    } else {
        "Off".into()
    }
}

fn shift_date(date: NaiveDate, direction: i32) -> NaiveDate {
    date.checked_add_signed(Duration::days(i64::from(direction)))
        .unwrap_or(date)
}

fn cycle<T: Copy + PartialEq>(options: &[T], current: T, direction: i32) -> T {
    let len = options.len();
    let idx = options.iter().position(|o| *o == current).unwrap_or(0);
    let next = if direction >= 0 {
        (idx + 1) % len
    } else {
        (idx + len - 1) % len
    };
    options[next]
}

fn parse_date(text: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|_| format!("'{text}' is not a YYYY-MM-DD date"))
}

fn parse_sma_period(text: &str) -> Result<usize, String> {
    let period = text
        .parse::<usize>()
        .map_err(|_| format!("'{text}' is not a whole number"))?;
    if SMA_PERIOD_RANGE.contains(&period) {
        Ok(period)
    } else {
        Err(format!(
            "SMA period must be between {} and {}",
            SMA_PERIOD_RANGE.start(),
            SMA_PERIOD_RANGE.end()
        ))
    }
}

/// Empty input disables the alert.
fn parse_threshold(text: &str) -> Result<f64, String> {
    if text.is_empty() {
        return Ok(0.0);
    }
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(format!("'{text}' is not a non-negative number")),
    }
}
