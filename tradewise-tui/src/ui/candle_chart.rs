//! Candlestick widget drawn with direct buffer writes.
//!
//! - One terminal column per bar, newest bars kept when the area is narrow
//! - Body: full block for up bars, medium shade for down bars
//! - Wicks: `|` from body to high/low

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Widget};

use tradewise_core::domain::Bar;

use crate::theme::Theme;

const LABEL_WIDTH: u16 = 9;

pub struct CandleChart<'a> {
    bars: &'a [Bar],
    title: &'a str,
    up: Color,
    down: Color,
    theme: &'a Theme,
}

impl<'a> CandleChart<'a> {
    pub fn new(bars: &'a [Bar], title: &'a str, theme: &'a Theme) -> Self {
        Self {
            bars,
            title,
            up: theme.positive,
            down: theme.negative,
            theme,
        }
    }

    /// Override the up/down body colours.
    pub fn colors(mut self, up: Color, down: Color) -> Self {
        self.up = up;
        self.down = down;
        self
    }
}

/// Map a price to a row in the plot area (0 = top).
fn price_to_y(price: f64, y_min: f64, y_max: f64, plot_height: u16) -> u16 {
    if (y_max - y_min).abs() < 1e-9 || plot_height == 0 {
        return 0;
    }
    let last_row = f64::from(plot_height.saturating_sub(1));
    let frac = (price - y_min) / (y_max - y_min);
    (last_row * (1.0 - frac)).round().clamp(0.0, last_row) as u16
}

impl Widget for CandleChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.bars.is_empty() {
            Block::default()
                .title(format!(" {} [No Data] ", self.title))
                .borders(Borders::ALL)
                .border_style(self.theme.muted())
                .style(Style::default().bg(self.theme.background))
                .render(area, buf);
            return;
        }

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL)
            .border_style(self.theme.accent())
            .style(Style::default().bg(self.theme.background));
        let inner = block.inner(area);
        block.render(area, buf);

        // Y labels on the left, one row at the bottom for the date span.
        let plot_left = inner.x + LABEL_WIDTH;
        let plot_top = inner.y;
        let plot_width = inner.width.saturating_sub(LABEL_WIDTH);
        let plot_height = inner.height.saturating_sub(1);
        if plot_width == 0 || plot_height == 0 {
            return;
        }

        let start = self.bars.len().saturating_sub(plot_width as usize);
        let visible = &self.bars[start..];

        let y_min = visible.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let y_max = visible.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let range = y_max - y_min;
        let pad = if range > 0.0 { range * 0.05 } else { 1.0 };
        let y_lower = y_min - pad;
        let y_upper = y_max + pad;

        let labels = [y_upper, (y_upper + y_lower) / 2.0, y_lower];
        let rows = [0u16, plot_height / 2, plot_height.saturating_sub(1)];
        for (value, row) in labels.iter().zip(rows.iter()) {
            buf.set_string(inner.x, plot_top + row, format!("{value:>8.2}"), self.theme.muted());
        }

        for (i, bar) in visible.iter().enumerate() {
            let x = plot_left + i as u16;
            if x >= inner.right() {
                break;
            }
            let is_up = bar.close >= bar.open;
            let style = Style::default().fg(if is_up { self.up } else { self.down });

            let high_y = price_to_y(bar.high, y_lower, y_upper, plot_height);
            let low_y = price_to_y(bar.low, y_lower, y_upper, plot_height);
            let body_top = price_to_y(bar.open.max(bar.close), y_lower, y_upper, plot_height);
            let body_bottom = price_to_y(bar.open.min(bar.close), y_lower, y_upper, plot_height);

            for y in high_y..body_top {
                buf.set_string(x, plot_top + y, "|", style);
            }
            let body = if is_up { "\u{2588}" } else { "\u{2593}" };
            for y in body_top..=body_bottom {
                buf.set_string(x, plot_top + y, body, style);
            }
            for y in (body_bottom + 1)..=low_y {
                buf.set_string(x, plot_top + y, "|", style);
            }
        }

        // Date span of the visible bars
        if let (Some(first), Some(last)) = (visible.first(), visible.last()) {
            let span = format!("{} .. {}", first.date, last.date);
            buf.set_stringn(
                plot_left,
                plot_top + plot_height,
                span,
                plot_width as usize,
                self.theme.muted(),
            );
        }
    }
}
