//! Chart specifications for the render sink.
//!
//! The adapter only reads numeric output: price series and derived series go
//! in, and a renderer-agnostic `ChartSpec` comes out. Every chart is cut to the
//! display window here, after indicators were computed over the full history.
//! Undefined values are omitted, so an all-undefined input gives an empty trace.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::Palette;
use crate::domain::{Bar, PriceSeries};
use crate::indicators::{DerivedSeries, MacdSeries};
use crate::window::Window;

pub const OPEN_TRACE_COLOR: &str = "#999999";
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const RSI_OVERSOLD: f64 = 30.0;

pub const PRICE_CHART_HEIGHT: u16 = 520;
pub const RSI_CHART_HEIGHT: u16 = 220;
pub const MACD_CHART_HEIGHT: u16 = 240;
pub const VOLUME_CHART_HEIGHT: u16 = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    Line,
    Candlestick,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TraceData {
    Line(Vec<(NaiveDate, f64)>),
    Candles {
        bars: Vec<Bar>,
        increasing: String,
        decreasing: String,
    },
    Bars(Vec<BarPoint>),
}

impl TraceData {
    pub fn len(&self) -> usize {
        match self {
            TraceData::Line(points) => points.len(),
            TraceData::Candles { bars, .. } => bars.len(),
            TraceData::Bars(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub name: String,
    pub color: String,
    pub width: u8,
    pub dashed: bool,
    pub data: TraceData,
}

impl Trace {
    fn line(name: impl Into<String>, color: &str, width: u8, points: Vec<(NaiveDate, f64)>) -> Self {
        Self {
            name: name.into(),
            color: color.to_string(),
            width,
            dashed: false,
            data: TraceData::Line(points),
        }
    }

    fn dashed(mut self) -> Self {
        self.dashed = true;
        self
    }
}

/// Horizontal reference line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HLine {
    pub y: f64,
    pub color: String,
    pub dashed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    pub traces: Vec<Trace>,
    pub hlines: Vec<HLine>,
    pub y_range: Option<(f64, f64)>,
    pub height: u16,
}

impl ChartSpec {
    fn new(title: impl Into<String>, kind: ChartKind, height: u16) -> Self {
        Self {
            title: title.into(),
            kind,
            traces: Vec::new(),
            hlines: Vec::new(),
            y_range: None,
            height,
        }
    }

    pub fn trace(&self, name: &str) -> Option<&Trace> {
        self.traces.iter().find(|t| t.name == name)
    }

    /// True when no trace has anything to draw.
    pub fn is_blank(&self) -> bool {
        self.traces.iter().all(|t| t.data.is_empty())
    }
}

fn close_points(bars: &[Bar]) -> Vec<(NaiveDate, f64)> {
    bars.iter().map(|b| (b.date, b.close)).collect()
}

/// Builds chart specs for one display window with one palette.
#[derive(Debug, Clone, Copy)]
pub struct ChartBuilder<'a> {
    palette: &'a Palette,
    window: Window,
}

impl<'a> ChartBuilder<'a> {
    pub fn new(palette: &'a Palette, window: Window) -> Self {
        Self { palette, window }
    }

    pub fn window(&self) -> Window {
        self.window
    }

    fn title(&self, name: &str) -> String {
        if self.window.is_full() {
            name.to_string()
        } else {
            format!("{name} ({})", self.window.label())
        }
    }

    /// Close (accent, wide) over Open (grey, thin).
    pub fn close_chart(&self, series: &PriceSeries) -> ChartSpec {
        let windowed = self.window.filter(series);
        let mut spec = ChartSpec::new(self.title("Price"), ChartKind::Line, PRICE_CHART_HEIGHT);
        spec.traces.push(Trace::line(
            "Close",
            &self.palette.accent,
            2,
            close_points(windowed.bars()),
        ));
        spec.traces.push(Trace::line(
            "Open",
            OPEN_TRACE_COLOR,
            1,
            windowed.bars().iter().map(|b| (b.date, b.open)).collect(),
        ));
        spec
    }

    pub fn candlestick(&self, series: &PriceSeries) -> ChartSpec {
        let windowed = self.window.filter(series);
        let mut spec = ChartSpec::new(self.title("Price"), ChartKind::Candlestick, PRICE_CHART_HEIGHT);
        spec.traces.push(Trace {
            name: "OHLC".into(),
            color: self.palette.accent.clone(),
            width: 1,
            dashed: false,
            data: TraceData::Candles {
                bars: windowed.bars().to_vec(),
                increasing: self.palette.accent.clone(),
                decreasing: self.palette.negative.clone(),
            },
        });
        spec
    }

    /// RSI line with dashed 70/30 guides on a fixed 0..100 axis.
    pub fn rsi_chart(&self, rsi: &DerivedSeries) -> ChartSpec {
        let windowed = rsi.window(self.window);
        let mut spec = ChartSpec::new(self.title("RSI"), ChartKind::Line, RSI_CHART_HEIGHT);
        spec.traces.push(Trace::line(
            "RSI",
            &self.palette.accent,
            2,
            windowed.points().collect(),
        ));
        spec.hlines = vec![
            HLine {
                y: RSI_OVERBOUGHT,
                color: self.palette.negative.clone(),
                dashed: true,
            },
            HLine {
                y: RSI_OVERSOLD,
                color: self.palette.positive.clone(),
                dashed: true,
            },
        ];
        spec.y_range = Some((0.0, 100.0));
        spec
    }

    /// Close with its simple moving average overlaid.
    pub fn sma_chart(&self, series: &PriceSeries, sma: &DerivedSeries, period: usize) -> ChartSpec {
        let windowed = self.window.filter(series);
        let mut spec = ChartSpec::new(
            self.title("Moving Average"),
            ChartKind::Line,
            PRICE_CHART_HEIGHT,
        );
        spec.traces.push(Trace::line(
            "Close",
            &self.palette.accent,
            2,
            close_points(windowed.bars()),
        ));
        spec.traces.push(Trace::line(
            format!("SMA {period}"),
            &self.palette.sma,
            2,
            sma.window(self.window).points().collect(),
        ));
        spec
    }

    /// MACD and signal lines over a histogram coloured by sign.
    pub fn macd_chart(&self, macd: &MacdSeries) -> ChartSpec {
        let windowed = macd.window(self.window);
        let mut spec = ChartSpec::new(self.title("MACD"), ChartKind::Line, MACD_CHART_HEIGHT);
        spec.traces.push(Trace::line(
            "MACD",
            &self.palette.accent,
            2,
            windowed.macd.points().collect(),
        ));
        spec.traces.push(
            Trace::line(
                "Signal",
                &self.palette.signal,
                1,
                windowed.signal.points().collect(),
            )
            .dashed(),
        );

        let bars = windowed
            .histogram
            .points()
            .map(|(date, value)| BarPoint {
                date,
                value,
                color: self.histogram_color(value).to_string(),
            })
            .collect();
        spec.traces.push(Trace {
            name: "Histogram".into(),
            color: self.palette.positive.clone(),
            width: 1,
            dashed: false,
            data: TraceData::Bars(bars),
        });
        spec
    }

    /// Undefined histogram values count as zero for colouring.
    pub fn histogram_color(&self, value: f64) -> &str {
        let v = if value.is_nan() { 0.0 } else { value };
        if v >= 0.0 {
            &self.palette.positive
        } else {
            &self.palette.negative
        }
    }

    /// Volume of the last `tail` bars. Not windowed.
    pub fn volume_chart(&self, series: &PriceSeries, tail: usize) -> ChartSpec {
        let mut spec = ChartSpec::new("Volume (recent)", ChartKind::Bar, VOLUME_CHART_HEIGHT);
        let bars = series
            .tail(tail)
            .iter()
            .map(|b| BarPoint {
                date: b.date,
                value: b.volume as f64,
                color: self.palette.accent.clone(),
            })
            .collect();
        spec.traces.push(Trace {
            name: "Volume".into(),
            color: self.palette.accent.clone(),
            width: 1,
            dashed: false,
            data: TraceData::Bars(bars),
        });
        spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{make_series, IndicatorEngine};

    fn rising(n: usize) -> PriceSeries {
        make_series(&(0..n).map(|i| 100.0 + i as f64).collect::<Vec<_>>())
    }

    #[test]
    fn close_chart_has_close_and_open() {
        let palette = Palette::default();
        let spec = ChartBuilder::new(&palette, Window::Max).close_chart(&rising(5));
        assert_eq!(spec.kind, ChartKind::Line);
        assert_eq!(spec.trace("Close").unwrap().color, "#1f77b4");
        assert_eq!(spec.trace("Open").unwrap().color, OPEN_TRACE_COLOR);
        assert_eq!(spec.trace("Close").unwrap().data.len(), 5);
        assert_eq!(spec.title, "Price");
    }

    #[test]
    fn window_cuts_price_and_indicator_identically() {
        let palette = Palette::default();
        let series = rising(40);
        let builder = ChartBuilder::new(&palette, Window::FiveDays);
        let price = builder.close_chart(&series);
        let rsi = builder.rsi_chart(&IndicatorEngine::rsi(&series));
        assert_eq!(price.trace("Close").unwrap().data.len(), 5);
        assert_eq!(rsi.trace("RSI").unwrap().data.len(), 5);
        assert_eq!(rsi.title, "RSI (5D)");
    }

    #[test]
    fn rsi_chart_guides() {
        let palette = Palette::default();
        let spec = ChartBuilder::new(&palette, Window::Max).rsi_chart(&IndicatorEngine::rsi(&rising(20)));
        assert_eq!(spec.y_range, Some((0.0, 100.0)));
        assert_eq!(spec.hlines.len(), 2);
        assert_eq!(spec.hlines[0].y, 70.0);
        assert_eq!(spec.hlines[0].color, palette.negative);
        assert_eq!(spec.hlines[1].y, 30.0);
        assert_eq!(spec.hlines[1].color, palette.positive);
        // 20 bars, 14-bar lookback
        assert_eq!(spec.trace("RSI").unwrap().data.len(), 6);
    }

    #[test]
    fn undefined_indicator_gives_empty_trace() {
        let palette = Palette::default();
        let series = rising(10);
        let builder = ChartBuilder::new(&palette, Window::Max);
        let sma = builder.sma_chart(&series, &IndicatorEngine::sma(&series, 50), 50);
        assert!(sma.trace("SMA 50").unwrap().data.is_empty());
        assert_eq!(sma.trace("Close").unwrap().data.len(), 10);

        let macd = builder.macd_chart(&IndicatorEngine::macd(&series));
        assert!(macd.is_blank());
    }

    #[test]
    fn macd_signal_is_dashed_and_histogram_colored() {
        let palette = Palette::default();
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + ((i as f64) * 0.3).sin() * 5.0).collect();
        let spec = ChartBuilder::new(&palette, Window::Max).macd_chart(&IndicatorEngine::macd(&make_series(&closes)));
        assert!(spec.trace("Signal").unwrap().dashed);
        let TraceData::Bars(bars) = &spec.trace("Histogram").unwrap().data else {
            panic!("histogram should be bars");
        };
        assert!(!bars.is_empty());
        for bar in bars {
            let expected = if bar.value >= 0.0 { &palette.positive } else { &palette.negative };
            assert_eq!(&bar.color, expected);
        }
    }

    #[test]
    fn histogram_nan_colours_as_zero() {
        let palette = Palette::default();
        let builder = ChartBuilder::new(&palette, Window::Max);
        assert_eq!(builder.histogram_color(f64::NAN), palette.positive);
        assert_eq!(builder.histogram_color(-0.1), palette.negative);
    }

    #[test]
    fn volume_uses_tail() {
        let palette = Palette::default();
        let spec = ChartBuilder::new(&palette, Window::FiveDays).volume_chart(&rising(300), 180);
        assert_eq!(spec.kind, ChartKind::Bar);
        assert_eq!(spec.traces[0].data.len(), 180);
    }

    #[test]
    fn empty_series_charts_are_blank() {
        let palette = Palette::default();
        let empty = PriceSeries::empty("X");
        let builder = ChartBuilder::new(&palette, Window::OneYear);
        assert!(builder.close_chart(&empty).is_blank());
        assert!(builder.candlestick(&empty).is_blank());
        assert!(builder.rsi_chart(&IndicatorEngine::rsi(&empty)).is_blank());
    }
}
