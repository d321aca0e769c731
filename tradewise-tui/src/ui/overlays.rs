//! Overlay widgets: help, error history, edit prompt.

use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{AppState, Control, EditState};
use crate::theme::Theme;
use crate::ui::centered_rect;

/// Key reference. Shown on first run and with `?`.
pub fn render_help(f: &mut Frame, area: Rect, app: &AppState) {
    let theme = &app.theme;
    let popup = centered_rect(70, 80, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.accent())
        .title(Span::styled(" Tradewise Help ", theme.accent_bold()));

    let mut lines: Vec<Line> = Vec::new();
    section(&mut lines, theme, "Navigation");
    key(&mut lines, theme, "1-4", "Overview / Charts / Indicators / News");
    key(&mut lines, theme, "Tab / Shift+Tab", "Cycle tabs");
    key(&mut lines, theme, "PgUp / PgDn", "Scroll overview and news");
    key(&mut lines, theme, "q", "Quit");
    lines.push(Line::from(""));

    section(&mut lines, theme, "Controls");
    key(&mut lines, theme, "j / k", "Move between controls");
    key(&mut lines, theme, "h / l", "Step a value (dates by one day)");
    key(&mut lines, theme, "Enter", "Edit text values, step choices");
    key(&mut lines, theme, "r", "Refresh with the current controls");
    lines.push(Line::from(""));

    section(&mut lines, theme, "Other");
    key(&mut lines, theme, "x", "Export price history to CSV");
    key(&mut lines, theme, "e", "Error history");
    key(&mut lines, theme, "?", "This help");
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Alert thresholds of 0 are off. Press any key to dismiss.",
        theme.muted(),
    )));

    let para = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    f.render_widget(para, popup);
}

fn section<'a>(lines: &mut Vec<Line<'a>>, theme: &Theme, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme.accent_bold())));
}

fn key<'a>(lines: &mut Vec<Line<'a>>, theme: &Theme, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {keys:>16}  "), theme.accent()),
        Span::styled(desc.to_string(), theme.muted()),
    ]));
}

/// Error history overlay.
pub fn render_error_history(f: &mut Frame, area: Rect, app: &AppState) {
    let theme = &app.theme;
    let popup = centered_rect(80, 70, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.negative())
        .title(Span::styled(
            format!(
                " Error History ({}) [Esc]close [j/k]scroll ",
                app.error_history.len()
            ),
            theme.negative(),
        ));

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    if app.error_history.is_empty() {
        let text = Paragraph::new(Span::styled("No errors recorded.", theme.muted()));
        f.render_widget(text, inner);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for (i, err) in app
        .error_history
        .iter()
        .enumerate()
        .skip(app.error_scroll)
        .take(inner.height as usize)
    {
        let style = if i == app.error_scroll {
            theme.negative().add_modifier(Modifier::BOLD)
        } else {
            theme.muted()
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("[{}] ", err.timestamp.format("%H:%M:%S")),
                theme.muted(),
            ),
            Span::styled(format!("[{}] ", err.category.label()), theme.warning()),
            Span::styled(err.message.as_str(), style),
        ]));
        if !err.context.is_empty() {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(err.context.as_str(), theme.muted()),
            ]));
        }
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn edit_hint(control: Control) -> &'static str {
    match control {
        Control::Ticker => "Ticker symbol, e.g. AAPL",
        Control::Start | Control::End => "Date as YYYY-MM-DD",
        Control::SmaPeriod => "Whole number of days, 5 to 200",
        Control::PriceAlert | Control::RsiAlert => "Number, empty to turn the alert off",
        _ => "",
    }
}

/// Text prompt for a sidebar control.
pub fn render_edit(f: &mut Frame, area: Rect, app: &AppState, edit: &EditState) {
    let theme = &app.theme;
    let popup = centered_rect(50, 30, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.accent())
        .title(Span::styled(
            format!(" {} [Enter]apply [Esc]cancel ", edit.control.label()),
            theme.accent_bold(),
        ));
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let text = vec![
        Line::from(Span::styled(edit_hint(edit.control), theme.muted())),
        Line::from(""),
        Line::from(vec![
            Span::styled("> ", theme.accent()),
            Span::styled(edit.buffer.as_str(), theme.accent_bold()),
            Span::styled("_", theme.accent()),
        ]),
    ];
    f.render_widget(Paragraph::new(text), inner);
}
