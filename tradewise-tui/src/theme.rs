//! Terminal theme derived from the configured chart palette.
//!
//! The palette's hex colours become `Color::Rgb` tokens so the terminal charts
//! match the colours other render sinks use. Surfaces and text stay fixed.

use ratatui::style::{Color, Modifier, Style};

use tradewise_core::alerts::AlertStatus;
use tradewise_core::config::{hex_to_rgb, Palette};
use tradewise_core::sentiment::SentimentLabel;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    /// Deep charcoal surface
    pub background: Color,
    pub accent: Color,
    pub positive: Color,
    pub negative: Color,
    /// Secondary traces (MACD signal line)
    pub signal: Color,
    /// Moving-average overlay
    pub sma: Color,
    pub muted: Color,
    pub warning: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_palette(&Palette::default())
    }
}

/// `#rrggbb` to an RGB colour, or `fallback` when the string does not parse.
pub fn hex_color(hex: &str, fallback: Color) -> Color {
    hex_to_rgb(hex).map_or(fallback, |(r, g, b)| Color::Rgb(r, g, b))
}

impl Theme {
    pub fn from_palette(palette: &Palette) -> Self {
        Self {
            background: Color::Rgb(18, 18, 20),
            accent: hex_color(&palette.accent, Color::Cyan),
            positive: hex_color(&palette.positive, Color::Green),
            negative: hex_color(&palette.negative, Color::Red),
            signal: hex_color(&palette.signal, Color::Yellow),
            sma: hex_color(&palette.sma, Color::Magenta),
            muted: hex_color(&palette.muted, Color::DarkGray),
            warning: Color::Rgb(255, 140, 0),
            text_primary: Color::White,
            text_secondary: Color::Rgb(170, 170, 170),
        }
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn accent_bold(&self) -> Style {
        self.accent().add_modifier(Modifier::BOLD)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn text(&self) -> Style {
        Style::default().fg(self.text_primary)
    }

    pub fn positive(&self) -> Style {
        Style::default().fg(self.positive)
    }

    pub fn negative(&self) -> Style {
        Style::default().fg(self.negative)
    }

    pub fn warning(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn border(&self, focused: bool) -> Style {
        if focused {
            self.accent()
        } else {
            self.muted()
        }
    }

    /// Daily change: up (or flat) green, down red.
    pub fn change_color(&self, change: f64) -> Color {
        if change >= 0.0 {
            self.positive
        } else {
            self.negative
        }
    }

    pub fn sentiment_color(&self, label: SentimentLabel) -> Color {
        match label {
            SentimentLabel::Positive => self.positive,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.text_secondary,
        }
    }

    pub fn alert_color(&self, status: &AlertStatus) -> Color {
        match status {
            AlertStatus::Triggered(_) => self.warning,
            AlertStatus::Clear => self.positive,
            AlertStatus::NotChecked => self.muted,
        }
    }

    /// Colour for a chart-spec colour string, falling back to the accent.
    pub fn spec_color(&self, hex: &str) -> Color {
        hex_color(hex, self.accent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_follows_palette() {
        let theme = Theme::default();
        assert_eq!(theme.background, Color::Rgb(18, 18, 20));
        assert_eq!(theme.accent, Color::Rgb(0x1f, 0x77, 0xb4));
        assert_eq!(theme.positive, Color::Rgb(0x2c, 0xa0, 0x2c));
        assert_eq!(theme.negative, Color::Rgb(0xd6, 0x27, 0x28));
    }

    #[test]
    fn bad_hex_falls_back() {
        let palette = Palette {
            accent: "teal".into(),
            ..Palette::default()
        };
        assert_eq!(Theme::from_palette(&palette).accent, Color::Cyan);
        assert_eq!(Theme::default().spec_color("#zzzzzz"), Theme::default().accent);
    }

    #[test]
    fn change_color() {
        let theme = Theme::default();
        assert_eq!(theme.change_color(1.5), theme.positive);
        assert_eq!(theme.change_color(0.0), theme.positive);
        assert_eq!(theme.change_color(-0.01), theme.negative);
    }

    #[test]
    fn sentiment_and_alert_colors() {
        let theme = Theme::default();
        assert_eq!(theme.sentiment_color(SentimentLabel::Positive), theme.positive);
        assert_eq!(theme.sentiment_color(SentimentLabel::Negative), theme.negative);
        assert_eq!(theme.sentiment_color(SentimentLabel::Neutral), theme.text_secondary);
        assert_eq!(theme.alert_color(&AlertStatus::Clear), theme.positive);
        assert_eq!(theme.alert_color(&AlertStatus::NotChecked), theme.muted);
        assert_eq!(theme.alert_color(&AlertStatus::Triggered(vec![])), theme.warning);
    }
}
