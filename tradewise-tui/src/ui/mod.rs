//! Top-level UI layout: header metrics, sidebar controls, tabbed content, status bar.

pub mod candle_chart;
pub mod charts;
pub mod indicators;
pub mod news;
pub mod overlays;
pub mod overview;
pub mod sidebar;
pub mod spec_chart;
pub mod status_bar;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs, Wrap};
use ratatui::Frame;

use tradewise_core::DashboardReport;

use crate::app::{AppState, Overlay, Tab};

const SIDEBAR_WIDTH: u16 = 32;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, rows[0], app);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(10)])
        .split(rows[1]);

    sidebar::render(f, columns[0], app);
    draw_content(f, columns[1], app);
    status_bar::render(f, rows[2], app);

    match &app.overlay {
        Overlay::Help => overlays::render_help(f, rows[1], app),
        Overlay::ErrorHistory => overlays::render_error_history(f, rows[1], app),
        Overlay::Edit(edit) => overlays::render_edit(f, rows[1], app, edit),
        Overlay::None => {}
    }
}

/// Ticker with latest price, daily change and the day's range.
fn draw_header(f: &mut Frame, area: Rect, app: &AppState) {
    let theme = &app.theme;
    let mut spans = vec![Span::styled(
        format!(" {} ", app.request.ticker),
        theme.accent_bold().add_modifier(Modifier::REVERSED),
    )];

    let metrics = app
        .report
        .as_ref()
        .and_then(|r| r.history.as_ref())
        .map(|h| h.metrics);
    match metrics {
        Some(m) => {
            spans.push(Span::styled(format!("  {}", m.price_text()), theme.text()));
            spans.push(Span::styled(
                format!(" {}", m.change_text()),
                Style::default().fg(theme.change_color(m.change)),
            ));
            spans.push(Span::styled(
                format!("   O {:.2}  H {:.2}  L {:.2}", m.open, m.high, m.low),
                theme.muted(),
            ));
        }
        None => spans.push(Span::styled("  --", theme.muted())),
    }
    if app.is_loading() {
        spans.push(Span::styled("   loading...", theme.warning()));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_content(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    let titles: Vec<Line> = Tab::ALL
        .iter()
        .map(|t| Line::from(format!("{} {}", t.index() + 1, t.label())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.active_tab.index())
        .style(app.theme.muted())
        .highlight_style(app.theme.accent_bold())
        .divider("|");
    f.render_widget(tabs, chunks[0]);

    let body = chunks[1];
    let Some(report) = &app.report else {
        let text = if app.is_loading() {
            "Loading..."
        } else {
            "Press r to load data."
        };
        f.render_widget(
            Paragraph::new(Span::styled(text, app.theme.muted())).block(bordered(app, "")),
            body,
        );
        return;
    };

    match app.active_tab {
        Tab::Overview => overview::render(f, body, app, report),
        Tab::Charts => charts::render(f, body, app, report),
        Tab::Indicators => indicators::render(f, body, app, report),
        Tab::News => news::render(f, body, app, report),
    }
}

/// Message shown in chart tabs when the cycle produced no price data.
pub fn render_no_data(f: &mut Frame, area: Rect, app: &AppState, report: &DashboardReport) {
    let mut lines = vec![Line::from(Span::styled(
        format!("No price data for {}.", report.request.ticker),
        app.theme.warning(),
    ))];
    for warning in &report.warnings {
        lines.push(Line::from(Span::styled(warning.as_str(), app.theme.muted())));
    }
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(bordered(app, "")),
        area,
    );
}

pub fn bordered<'a>(app: &AppState, title: &'a str) -> Block<'a> {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border(false));
    if title.is_empty() {
        block
    } else {
        block.title(Span::styled(format!(" {title} "), app.theme.accent_bold()))
    }
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
