//! Indicators tab: the selected indicator chart and the alerts panel.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use tradewise_core::alerts::AlertStatus;
use tradewise_core::dashboard::HistoryView;
use tradewise_core::DashboardReport;

use crate::app::AppState;
use crate::ui::{bordered, render_no_data, spec_chart};

const ALERTS_HEIGHT: u16 = 6;

pub fn render(f: &mut Frame, area: Rect, app: &AppState, report: &DashboardReport) {
    let Some(history) = &report.history else {
        render_no_data(f, area, app, report);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(ALERTS_HEIGHT)])
        .split(area);

    match &history.indicator_chart {
        Some(spec) => spec_chart::draw(f, chunks[0], spec, &app.theme),
        None => {
            let hint = Paragraph::new(Span::styled(
                "No indicator selected. Pick one in the sidebar.",
                app.theme.muted(),
            ))
            .block(bordered(app, "Indicator"));
            f.render_widget(hint, chunks[0]);
        }
    }

    render_alerts(f, chunks[1], app, history);
}

fn render_alerts(f: &mut Frame, area: Rect, app: &AppState, history: &HistoryView) {
    let theme = &app.theme;
    let color = theme.alert_color(&history.alerts);
    let rsi_text = history
        .latest_rsi
        .map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"));

    let mut lines = vec![Line::from(vec![
        Span::styled("Latest RSI ", theme.muted()),
        Span::styled(rsi_text, theme.text()),
    ])];
    match &history.alerts {
        AlertStatus::NotChecked => lines.push(Line::from(Span::styled(
            "Alerts not checked",
            Style::default().fg(color),
        ))),
        AlertStatus::Clear => lines.push(Line::from(Span::styled(
            "No alerts triggered",
            Style::default().fg(color),
        ))),
        AlertStatus::Triggered(fired) => {
            for alert in fired {
                lines.push(Line::from(Span::styled(
                    format!("ALERT: {}", alert.message),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )));
            }
        }
    }

    f.render_widget(Paragraph::new(lines).block(bordered(app, "Alerts")), area);
}

#[cfg(test)]
mod tests {
    use tradewise_core::alerts::AlertStatus;
    use tradewise_core::dashboard::IndicatorChoice;

    use crate::app::Tab;
    use crate::ui::tests::{draw_app, loaded_app};

    #[test]
    fn macd_chart_with_thresholds_off_reads_clear() {
        let mut app = loaded_app(IndicatorChoice::Macd);
        app.select_tab(Tab::Indicators);
        assert_eq!(
            app.report.as_ref().and_then(|r| r.history.as_ref()).map(|h| &h.alerts),
            Some(&AlertStatus::Clear)
        );
        let text = draw_app(&app, 140, 45);
        assert!(text.contains("MACD"));
        assert!(text.contains("No alerts triggered"));
        assert!(!text.contains("not checked"));
        assert!(text.contains("Latest RSI"));
    }

    #[test]
    fn no_indicator_shows_hint() {
        let mut app = loaded_app(IndicatorChoice::None);
        app.select_tab(Tab::Indicators);
        assert!(draw_app(&app, 140, 45).contains("No indicator selected"));
    }

    #[test]
    fn triggered_alert_is_listed() {
        let mut app = loaded_app(IndicatorChoice::Rsi);
        app.select_tab(Tab::Indicators);
        let history = app
            .report
            .as_mut()
            .and_then(|r| r.history.as_mut())
            .unwrap();
        history.alerts = tradewise_core::alerts::AlertStatus::Triggered(vec![
            tradewise_core::alerts::TriggeredAlert {
                kind: tradewise_core::alerts::AlertKind::Price,
                threshold: 1.0,
                current: 2.0,
                message: "Price above 1.00".into(),
            },
        ]);
        assert!(draw_app(&app, 140, 45).contains("ALERT: Price above 1.00"));
    }
}
