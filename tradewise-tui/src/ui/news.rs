//! News tab: scored headlines with their sentiment, plus any fallback notices.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use ratatui::Frame;

use tradewise_core::domain::NewsOrigin;
use tradewise_core::DashboardReport;

use crate::app::AppState;
use crate::ui::bordered;

fn origin_label(origin: NewsOrigin) -> &'static str {
    match origin {
        NewsOrigin::Provider => "News (provider)",
        NewsOrigin::CompanyInfo => "News (company info)",
        NewsOrigin::SummaryFallback => "News (company summary)",
    }
}

pub fn render(f: &mut Frame, area: Rect, app: &AppState, report: &DashboardReport) {
    let theme = &app.theme;
    let Some(news) = &report.news else {
        let para = Paragraph::new(Span::styled(
            "No news without price data.",
            theme.muted(),
        ))
        .block(bordered(app, "News"));
        f.render_widget(para, area);
        return;
    };

    let mut lines: Vec<Line> = Vec::new();
    for notice in &news.notices {
        lines.push(Line::from(Span::styled(notice.as_str(), theme.warning())));
    }
    if !news.notices.is_empty() {
        lines.push(Line::from(""));
    }

    if news.items.is_empty() {
        lines.push(Line::from(Span::styled("No headlines.", theme.muted())));
    }
    for scored in &news.items {
        let sentiment = &scored.sentiment;
        let color = theme.sentiment_color(sentiment.label);
        lines.push(Line::from(vec![
            Span::styled(
                format!("[{} {:+}] ", sentiment.label, sentiment.score),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(scored.item.headline.as_str(), theme.text()),
        ]));

        let mut meta = Vec::new();
        if !scored.item.source.is_empty() {
            meta.push(scored.item.source.as_str());
        }
        if !scored.item.published_at.is_empty() {
            meta.push(scored.item.published_at.as_str());
        }
        if !meta.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("    {}", meta.join(" | ")),
                theme.muted(),
            )));
        }
        if !scored.item.summary.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("    {}", scored.item.summary),
                theme.muted(),
            )));
        }
        if !scored.item.url.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("    {}", scored.item.url),
                theme.accent(),
            )));
        }
        lines.push(Line::from(""));
    }

    let para = Paragraph::new(lines)
        .block(bordered(app, origin_label(news.origin)))
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));
    f.render_widget(para, area);
}
