//! Plain-text rendering of a dashboard report.

use std::io::{self, Write};

use tradewise_core::alerts::AlertStatus;
use tradewise_core::chart::{ChartSpec, TraceData};
use tradewise_core::dashboard::HistoryView;
use tradewise_core::domain::NewsOrigin;
use tradewise_core::fundamentals::FundamentalRow;
use tradewise_core::news::NewsOutcome;
use tradewise_core::DashboardReport;

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const SPARK_WIDTH: usize = 60;

pub fn write_report<W: Write>(out: &mut W, report: &DashboardReport) -> io::Result<()> {
    let request = &report.request;
    writeln!(out)?;
    writeln!(out, "=== {} ===", request.ticker)?;
    writeln!(
        out,
        "Range:          {} to {} ({})",
        request.start,
        request.end,
        request.window.label()
    )?;
    for warning in &report.warnings {
        writeln!(out, "WARNING: {warning}")?;
    }

    writeln!(out)?;
    writeln!(out, "--- Overview ---")?;
    writeln!(out, "Sector:         {}", report.overview.sector)?;
    writeln!(out, "Employees:      {}", report.overview.employees)?;
    writeln!(out, "Website:        {}", report.overview.website)?;
    writeln!(out, "{}", report.overview.summary)?;

    writeln!(out)?;
    writeln!(out, "--- Fundamentals ---")?;
    write_fundamentals(out, &report.fundamentals_left, &report.fundamentals_right)?;

    if let Some(history) = &report.history {
        write_history(out, history)?;
    }

    if let Some(news) = &report.news {
        writeln!(out)?;
        write_news(out, news)?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_fundamentals<W: Write>(
    out: &mut W,
    left: &[FundamentalRow],
    right: &[FundamentalRow],
) -> io::Result<()> {
    let rows = left.len().max(right.len());
    for i in 0..rows {
        let cell = |side: &[FundamentalRow]| {
            side.get(i)
                .map(|r| format!("{:<18} {:>12}", r.label, r.value))
                .unwrap_or_default()
        };
        writeln!(out, "{:<33}  {}", cell(left), cell(right))?;
    }
    Ok(())
}

fn write_history<W: Write>(out: &mut W, history: &HistoryView) -> io::Result<()> {
    let m = &history.metrics;
    writeln!(out)?;
    writeln!(out, "--- Price ---")?;
    writeln!(out, "Price:          {} ({})", m.price_text(), m.change_text())?;
    writeln!(
        out,
        "Open/High/Low:  {:.2} / {:.2} / {:.2}",
        m.open, m.high, m.low
    )?;
    match history.latest_rsi {
        Some(rsi) => writeln!(out, "RSI(14):        {rsi:.2}")?,
        None => writeln!(out, "RSI(14):        N/A")?,
    }

    writeln!(out)?;
    writeln!(out, "--- Charts ---")?;
    write_chart(out, &history.price_chart)?;
    if let Some(chart) = &history.indicator_chart {
        write_chart(out, chart)?;
    }
    write_chart(out, &history.volume_chart)?;

    writeln!(out)?;
    writeln!(out, "--- Recent ---")?;
    writeln!(
        out,
        "{:<12} {:>12} {:>12} {:>12} {:>12} {:>14}",
        "Date", "Open", "High", "Low", "Close", "Volume"
    )?;
    for bar in history.recent.iter().rev() {
        writeln!(
            out,
            "{:<12} {:>12} {:>12} {:>12} {:>12} {:>14}",
            bar.date, bar.open, bar.high, bar.low, bar.close, bar.volume
        )?;
    }

    writeln!(out)?;
    writeln!(out, "--- Alerts ---")?;
    match &history.alerts {
        AlertStatus::NotChecked => writeln!(out, "Not checked")?,
        AlertStatus::Clear => writeln!(out, "No alerts triggered")?,
        AlertStatus::Triggered(fired) => {
            for alert in fired {
                writeln!(out, "ALERT: {}", alert.message)?;
            }
        }
    }
    Ok(())
}

fn write_chart<W: Write>(out: &mut W, chart: &ChartSpec) -> io::Result<()> {
    writeln!(out, "{}", chart.title)?;
    if chart.is_blank() {
        writeln!(out, "  (not enough history)")?;
        return Ok(());
    }
    for trace in &chart.traces {
        let values = trace_values(&trace.data);
        let last = values.last().map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
        writeln!(
            out,
            "  {:<12} {:>5} pts  last {:>10}  {}",
            trace.name,
            values.len(),
            last,
            sparkline(&values, SPARK_WIDTH)
        )?;
    }
    Ok(())
}

fn trace_values(data: &TraceData) -> Vec<f64> {
    match data {
        TraceData::Line(points) => points.iter().map(|p| p.1).collect(),
        TraceData::Candles { bars, .. } => bars.iter().map(|b| b.close).collect(),
        TraceData::Bars(points) => points.iter().map(|p| p.value).collect(),
    }
}

/// Unicode block sparkline, resampled to at most `width` cells.
pub fn sparkline(values: &[f64], width: usize) -> String {
    if values.is_empty() || width == 0 {
        return String::new();
    }
    let step = values.len().div_ceil(width);
    let sampled: Vec<f64> = values.chunks(step).filter_map(|c| c.last().copied()).collect();

    let (lo, hi) = sampled
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let span = hi - lo;

    sampled
        .iter()
        .map(|&v| {
            if span <= 0.0 {
                return SPARK_LEVELS[SPARK_LEVELS.len() / 2];
            }
            let level = ((v - lo) / span * (SPARK_LEVELS.len() - 1) as f64).round() as usize;
            SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
        })
        .collect()
}

pub fn write_news<W: Write>(out: &mut W, news: &NewsOutcome) -> io::Result<()> {
    let origin = match news.origin {
        NewsOrigin::Provider => "news provider",
        NewsOrigin::CompanyInfo => "company info",
        NewsOrigin::SummaryFallback => "company summary",
    };
    writeln!(out, "--- News ({origin}) ---")?;
    for notice in &news.notices {
        writeln!(out, "NOTE: {notice}")?;
    }
    for scored in &news.items {
        let s = scored.sentiment;
        writeln!(out, "[{} {:+}] {}", s.label, s.score, scored.item.headline)?;
        if !scored.item.source.is_empty() {
            writeln!(out, "    {}", scored.item.source)?;
        }
        if !scored.item.url.is_empty() {
            writeln!(out, "    {}", scored.item.url)?;
        }
    }
    Ok(())
}
