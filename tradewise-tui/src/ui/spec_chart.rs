//! Draws a [`ChartSpec`] with ratatui's `Chart` widget.
//!
//! Dates map to `num_days_from_ce` on the x axis. Line traces become braille
//! line datasets, bar traces become one `GraphType::Bar` dataset per colour,
//! and reference lines become two-point line datasets across the x range.
//! Candlestick specs go to [`CandleChart`](super::candle_chart::CandleChart).

use chrono::{Datelike, NaiveDate};
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph};
use ratatui::Frame;

use tradewise_core::chart::{ChartSpec, TraceData};

use crate::theme::Theme;
use crate::ui::candle_chart::CandleChart;

fn x_of(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

/// One dataset's worth of points plus how to draw it.
struct Series {
    name: Option<String>,
    points: Vec<(f64, f64)>,
    style: Style,
    graph: GraphType,
    marker: Marker,
}

fn collect_series(spec: &ChartSpec, theme: &Theme) -> Vec<Series> {
    let mut out = Vec::new();
    for trace in &spec.traces {
        let mut style = Style::default().fg(theme.spec_color(&trace.color));
        if trace.dashed {
            style = style.add_modifier(Modifier::DIM);
        }
        match &trace.data {
            TraceData::Line(points) => out.push(Series {
                name: Some(trace.name.clone()),
                points: points
                    .iter()
                    .filter(|(_, v)| v.is_finite())
                    .map(|(d, v)| (x_of(*d), *v))
                    .collect(),
                style,
                graph: GraphType::Line,
                marker: Marker::Braille,
            }),
            TraceData::Bars(points) => {
                // Group by colour, keeping first-seen order
                let mut groups: Vec<(String, Vec<(f64, f64)>)> = Vec::new();
                for p in points.iter().filter(|p| p.value.is_finite()) {
                    let xy = (x_of(p.date), p.value);
                    match groups.iter_mut().find(|(c, _)| *c == p.color) {
                        Some((_, pts)) => pts.push(xy),
                        None => groups.push((p.color.clone(), vec![xy])),
                    }
                }
                for (i, (color, points)) in groups.into_iter().enumerate() {
                    out.push(Series {
                        name: (i == 0).then(|| trace.name.clone()),
                        points,
                        style: Style::default().fg(theme.spec_color(&color)),
                        graph: GraphType::Bar,
                        marker: Marker::HalfBlock,
                    });
                }
            }
            // Closes stand in when a candle trace is mixed into a line chart
            TraceData::Candles { bars, .. } => out.push(Series {
                name: Some(trace.name.clone()),
                points: bars.iter().map(|b| (x_of(b.date), b.close)).collect(),
                style,
                graph: GraphType::Line,
                marker: Marker::Braille,
            }),
        }
    }
    out
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Draw `spec` into `area`. Blank specs show a placeholder.
pub fn draw(f: &mut Frame, area: Rect, spec: &ChartSpec, theme: &Theme) {
    if let Some(candles) = spec.traces.iter().find_map(|t| match &t.data {
        TraceData::Candles {
            bars,
            increasing,
            decreasing,
        } if !bars.is_empty() => Some((bars, increasing, decreasing)),
        _ => None,
    }) {
        let (bars, up, down) = candles;
        let widget = CandleChart::new(bars, &spec.title, theme)
            .colors(theme.spec_color(up), theme.spec_color(down));
        f.render_widget(widget, area);
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border(false))
        .title(Span::styled(format!(" {} ", spec.title), theme.accent_bold()));

    let mut series = collect_series(spec, theme);
    let Some((x_min, x_max)) = bounds(series.iter().flat_map(|s| s.points.iter().map(|p| p.0)))
    else {
        let placeholder = Paragraph::new(Span::styled("Not enough history", theme.muted()))
            .block(block);
        f.render_widget(placeholder, area);
        return;
    };

    let data_range = bounds(
        series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.1))
            .chain(spec.hlines.iter().map(|h| h.y))
            .chain(
                series
                    .iter()
                    .filter(|s| s.graph == GraphType::Bar)
                    .map(|_| 0.0),
            ),
    );
    let (y_min, y_max) = match (spec.y_range, data_range) {
        (Some(fixed), _) => fixed,
        (None, Some((lo, hi))) => {
            let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
            (lo - pad, hi + pad)
        }
        (None, None) => (0.0, 1.0),
    };

    for h in &spec.hlines {
        let mut style = Style::default().fg(theme.spec_color(&h.color));
        if h.dashed {
            style = style.add_modifier(Modifier::DIM);
        }
        series.push(Series {
            name: None,
            points: vec![(x_min, h.y), (x_max, h.y)],
            style,
            graph: GraphType::Line,
            marker: Marker::Dot,
        });
    }

    let datasets: Vec<Dataset> = series
        .iter()
        .map(|s| {
            let ds = Dataset::default()
                .marker(s.marker)
                .graph_type(s.graph)
                .style(s.style)
                .data(&s.points);
            match &s.name {
                Some(name) => ds.name(name.clone()),
                None => ds,
            }
        })
        .collect();

    let date_label = |x: f64| {
        NaiveDate::from_num_days_from_ce_opt(x as i32)
            .map(|d| d.to_string())
            .unwrap_or_default()
    };
    let x_span = if x_max > x_min { x_max - x_min } else { 1.0 };

    let chart = Chart::new(datasets)
        .block(block)
        .legend_position(Some(LegendPosition::TopLeft))
        .x_axis(
            Axis::default()
                .style(theme.muted())
                .bounds([x_min, x_min + x_span])
                .labels(vec![
                    Span::styled(date_label(x_min), theme.muted()),
                    Span::styled(date_label(x_max), theme.muted()),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(theme.muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(axis_number(y_min), theme.muted()),
                    Span::styled(axis_number((y_min + y_max) / 2.0), theme.muted()),
                    Span::styled(axis_number(y_max), theme.muted()),
                ]),
        );
    f.render_widget(chart, area);
}

/// Compact axis label: volumes in millions, prices with two decimals.
fn axis_number(v: f64) -> String {
    if v.abs() >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else {
        format!("{v:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tradewise_core::config::DashboardConfig;
    use tradewise_core::{Dashboard, DashboardRequest};

    use crate::ui::tests::buffer_text;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn report_charts() -> Vec<ChartSpec> {
        let dashboard = Dashboard::with_synthetic(Arc::new(DashboardConfig::default()), 3);
        let mut request = DashboardRequest::new("NVDA", today());
        request.indicator = tradewise_core::dashboard::IndicatorChoice::Rsi;
        let report = dashboard.render_on(&request, today());
        let history = report.history.unwrap();
        vec![
            history.price_chart,
            history.volume_chart,
            history.indicator_chart.unwrap(),
        ]
    }

    fn render(spec: &ChartSpec) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        let theme = Theme::default();
        terminal
            .draw(|f| draw(f, f.area(), spec, &theme))
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn every_report_chart_draws_its_title() {
        for spec in report_charts() {
            let text = render(&spec);
            assert!(text.contains(&spec.title), "missing title {}", spec.title);
        }
    }

    #[test]
    fn rsi_chart_uses_fixed_range() {
        let charts = report_charts();
        let rsi = &charts[2];
        assert_eq!(rsi.y_range, Some((0.0, 100.0)));
        let text = render(rsi);
        assert!(text.contains("100.00"));
        assert!(text.contains("0.00"));
    }

    #[test]
    fn bar_points_group_by_colour() {
        let charts = report_charts();
        let volume = &charts[1];
        let colours: std::collections::HashSet<&str> = match &volume.traces[0].data {
            TraceData::Bars(points) => points.iter().map(|p| p.color.as_str()).collect(),
            other => panic!("unexpected trace data {other:?}"),
        };
        let series = collect_series(volume, &Theme::default());
        assert_eq!(series.len(), colours.len());
        assert!(series.iter().all(|s| s.graph == GraphType::Bar));
        assert_eq!(series.iter().filter(|s| s.name.is_some()).count(), 1);
    }

    #[test]
    fn blank_spec_shows_placeholder() {
        let mut spec = report_charts().remove(2);
        for trace in &mut spec.traces {
            trace.data = TraceData::Line(Vec::new());
        }
        assert!(spec.is_blank());
        assert!(render(&spec).contains("Not enough history"));
    }

    #[test]
    fn axis_numbers() {
        assert_eq!(axis_number(2_500_000.0), "2.5M");
        assert_eq!(axis_number(187.456), "187.46");
    }
}
