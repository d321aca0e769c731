//! Background worker thread: fetching, indicators and exports run here.
//!
//! The main thread never blocks on the network. Requests arrive over an
//! `mpsc` channel; when several renders queue up while one is running, only the
//! newest is rendered.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use tradewise_core::domain::PriceSeries;
use tradewise_core::export::save_csv;
use tradewise_core::{Dashboard, DashboardReport, DashboardRequest};

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Render { request: Box<DashboardRequest> },
    Export { series: Box<PriceSeries>, dir: PathBuf },
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug)]
pub enum WorkerResponse {
    Rendered { report: Box<DashboardReport> },
    Exported { path: PathBuf, bars: usize },
    Error {
        category: String,
        message: String,
        context: String,
    },
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    dashboard: Arc<Dashboard>,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("tradewise-worker".into())
        .spawn(move || worker_loop(&dashboard, rx, tx))
}

fn worker_loop(dashboard: &Dashboard, rx: Receiver<WorkerCommand>, tx: Sender<WorkerResponse>) {
    let mut pending = VecDeque::new();
    loop {
        let cmd = match pending.pop_front() {
            Some(cmd) => cmd,
            None => match rx.recv() {
                Ok(cmd) => cmd,
                Err(_) => break,
            },
        };
        let cmd = match cmd {
            WorkerCommand::Render { request } => coalesce(request, &rx, &mut pending),
            other => other,
        };
        if matches!(cmd, WorkerCommand::Shutdown) {
            break;
        }
        if handle_command(dashboard, cmd, &tx).is_err() {
            // UI side hung up
            break;
        }
    }
    debug!("worker exiting");
}

/// Replace `request` with the newest render already queued.
///
/// Other commands found while draining keep their order in `pending`.
fn coalesce(
    mut request: Box<DashboardRequest>,
    rx: &Receiver<WorkerCommand>,
    pending: &mut VecDeque<WorkerCommand>,
) -> WorkerCommand {
    while let Ok(cmd) = rx.try_recv() {
        match cmd {
            WorkerCommand::Render { request: newer } => {
                debug!(ticker = %request.ticker, "render superseded");
                request = newer;
            }
            other => pending.push_back(other),
        }
    }
    WorkerCommand::Render { request }
}

fn handle_command(
    dashboard: &Dashboard,
    cmd: WorkerCommand,
    tx: &Sender<WorkerResponse>,
) -> Result<(), std::sync::mpsc::SendError<WorkerResponse>> {
    match cmd {
        WorkerCommand::Render { request } => {
            let report = dashboard.render(&request);
            info!(
                ticker = %report.request.ticker,
                has_data = report.has_data(),
                "render complete"
            );
            tx.send(WorkerResponse::Rendered {
                report: Box::new(report),
            })
        }
        WorkerCommand::Export { series, dir } => {
            let response = match std::fs::create_dir_all(&dir)
                .map_err(|e| e.to_string())
                .and_then(|()| save_csv(&series, &dir).map_err(|e| e.to_string()))
            {
                Ok(path) => WorkerResponse::Exported {
                    path,
                    bars: series.len(),
                },
                Err(message) => WorkerResponse::Error {
                    category: "export".into(),
                    message,
                    context: series.symbol().to_string(),
                },
            };
            tx.send(response)
        }
        WorkerCommand::Shutdown => Ok(()),
    }
}
