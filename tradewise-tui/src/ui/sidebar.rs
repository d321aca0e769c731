//! Sidebar: one row per request control, cursor highlighted.

use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{AppState, Control};

const LABEL_WIDTH: usize = 15;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let theme = &app.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border(true))
        .title(Span::styled(" Controls ", theme.accent_bold()));

    let selected = app.selected_control();
    let mut lines: Vec<Line> = Vec::new();
    for control in Control::ALL {
        let is_selected = control == selected;
        let marker = if is_selected { "> " } else { "  " };
        let value = app.control_value(control);
        let value_style = if is_selected {
            theme.accent_bold().add_modifier(Modifier::REVERSED)
        } else {
            theme.text()
        };
        let hint = if control.is_text() { "" } else { " <>" };

        lines.push(Line::from(vec![
            Span::styled(marker, theme.accent()),
            Span::styled(format!("{:<LABEL_WIDTH$}", control.label()), theme.muted()),
            Span::styled(value, value_style),
            Span::styled(hint, theme.muted()),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "j/k move  h/l change",
        theme.muted(),
    )));
    lines.push(Line::from(Span::styled(
        "Enter edit  r refresh",
        theme.muted(),
    )));

    f.render_widget(Paragraph::new(lines).block(block), area);
}
