//! Sparkline widget for daily chart series

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Block characters for different values (8 levels)
const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// A one-row sparkline scaled between the series minimum and maximum
pub struct SeriesSparkline<'a> {
    /// Values in display order
    values: &'a [f64],
    /// Style for the sparkline
    style: Style,
    /// Style for the most recent value
    latest_style: Style,
}

impl<'a> SeriesSparkline<'a> {
    pub fn new(values: &'a [f64]) -> Self {
        Self {
            values,
            style: Style::default().fg(Color::Cyan),
            latest_style: Style::default().fg(Color::Yellow),
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    fn bounds(&self) -> (f64, f64) {
        self.values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            })
    }

    fn value_to_block(value: f64, min: f64, max: f64) -> char {
        let range = max - min;
        // A flat series sits mid-height
        let normalized = if range > 0.0 {
            ((value - min) / range).clamp(0.0, 1.0)
        } else {
            0.5
        };
        let index = ((normalized * 7.0).round() as usize).min(7);
        BLOCKS[index]
    }
}

impl<'a> Widget for SeriesSparkline<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 || self.values.is_empty() {
            return;
        }

        // Keep the most recent points when the series is wider than the area
        let width = area.width as usize;
        let skip = self.values.len().saturating_sub(width);
        let (min, max) = self.bounds();
        let last = self.values.len() - 1;

        for (i, value) in self.values.iter().enumerate().skip(skip) {
            let block = Self::value_to_block(*value, min, max);
            let x = area.x + (i - skip) as u16;
            let style = if i == last {
                self.latest_style
            } else {
                self.style
            };

            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(block).set_style(style);
            }
        }
    }
}
