//! Overview tab: company profile, fundamentals tables and the most recent bars.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table, Wrap};
use ratatui::Frame;

use tradewise_core::domain::Bar;
use tradewise_core::fundamentals::FundamentalRow;
use tradewise_core::DashboardReport;

use crate::app::AppState;
use crate::ui::bordered;

pub fn render(f: &mut Frame, area: Rect, app: &AppState, report: &DashboardReport) {
    let fundamentals_rows = report
        .fundamentals_left
        .len()
        .max(report.fundamentals_right.len()) as u16;
    let recent_rows = report.history.as_ref().map_or(0, |h| h.recent.len()) as u16;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),
            Constraint::Length(fundamentals_rows + 2),
            Constraint::Length(if recent_rows > 0 { recent_rows + 3 } else { 0 }),
        ])
        .split(area);

    render_profile(f, chunks[0], app, report);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    render_fundamentals(f, halves[0], app, &report.fundamentals_left);
    render_fundamentals(f, halves[1], app, &report.fundamentals_right);

    if let Some(history) = &report.history {
        render_recent(f, chunks[2], app, &history.recent);
    }
}

fn render_profile(f: &mut Frame, area: Rect, app: &AppState, report: &DashboardReport) {
    let theme = &app.theme;
    let overview = &report.overview;
    let field = |label: &'static str, value: &str| {
        Line::from(vec![
            Span::styled(format!("{label:<11}"), theme.muted()),
            Span::styled(value.to_string(), theme.text()),
        ])
    };

    let mut lines = vec![
        field("Sector", &overview.sector),
        field("Employees", &overview.employees),
        field("Website", &overview.website),
        Line::from(""),
    ];
    lines.extend(
        overview
            .summary
            .lines()
            .map(|l| Line::from(Span::styled(l.to_string(), theme.text()))),
    );

    let para = Paragraph::new(lines)
        .block(bordered(app, "Company Overview"))
        .wrap(Wrap { trim: true })
        .scroll((app.scroll, 0));
    f.render_widget(para, area);
}

fn render_fundamentals(f: &mut Frame, area: Rect, app: &AppState, rows: &[FundamentalRow]) {
    let theme = &app.theme;
    let table_rows: Vec<Row> = rows
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(Span::styled(r.label.clone(), theme.muted())),
                Cell::from(Span::styled(r.value.clone(), theme.text())),
            ])
        })
        .collect();
    let table = Table::new(
        table_rows,
        [Constraint::Percentage(55), Constraint::Percentage(45)],
    )
    .block(bordered(app, "Fundamentals"));
    f.render_widget(table, area);
}

fn render_recent(f: &mut Frame, area: Rect, app: &AppState, bars: &[Bar]) {
    let theme = &app.theme;
    let header = Row::new(["Date", "Open", "High", "Low", "Close", "Volume"])
        .style(theme.accent().add_modifier(Modifier::BOLD));

    // Newest first
    let rows: Vec<Row> = bars
        .iter()
        .rev()
        .map(|b| {
            let close_style = Style::default().fg(theme.change_color(b.close - b.open));
            Row::new(vec![
                Cell::from(b.date.to_string()),
                Cell::from(format!("{:.4}", b.open)),
                Cell::from(format!("{:.4}", b.high)),
                Cell::from(format!("{:.4}", b.low)),
                Cell::from(Span::styled(format!("{:.4}", b.close), close_style)),
                Cell::from(b.volume.to_string()),
            ])
            .style(theme.text())
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(11),
            Constraint::Length(11),
            Constraint::Length(11),
            Constraint::Length(11),
            Constraint::Length(11),
            Constraint::Min(8),
        ],
    )
    .header(header)
    .block(bordered(app, "Recent"));
    f.render_widget(table, area);
}
