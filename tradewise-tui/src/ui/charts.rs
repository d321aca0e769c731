//! Charts tab: price chart above recent volume.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::Frame;

use tradewise_core::DashboardReport;

use crate::app::AppState;
use crate::ui::{render_no_data, spec_chart};

const VOLUME_HEIGHT: u16 = 10;

pub fn render(f: &mut Frame, area: Rect, app: &AppState, report: &DashboardReport) {
    let Some(history) = &report.history else {
        render_no_data(f, area, app, report);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(VOLUME_HEIGHT)])
        .split(area);

    spec_chart::draw(f, chunks[0], &history.price_chart, &app.theme);
    spec_chart::draw(f, chunks[1], &history.volume_chart, &app.theme);
}

#[cfg(test)]
mod tests {
    use tradewise_core::dashboard::{ChartType, IndicatorChoice};

    use crate::app::Tab;
    use crate::ui::tests::{draw_app, loaded_app};

    #[test]
    fn candle_and_volume_titles() {
        let mut app = loaded_app(IndicatorChoice::None);
        app.select_tab(Tab::Charts);
        let history = app.report.as_ref().unwrap().history.as_ref().unwrap();
        assert_eq!(app.request.chart_type, ChartType::Candle);
        let price_title = history.price_chart.title.clone();

        let text = draw_app(&app, 140, 45);
        assert!(text.contains(&price_title));
        assert!(text.contains("Volume (recent)"));
        assert!(text.contains("\u{2588}") || text.contains("\u{2593}"));
    }
}
