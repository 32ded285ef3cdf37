//! Candlestick panel.
//!
//! Renders using direct buffer writes:
//! - Each candle = 1 terminal column, the latest candles win when they do not fit
//! - Body: block char, positive color if close ≥ open, negative otherwise
//! - Wicks: vertical line chars to high/low
//! - Bottom row: first and last time on the minute axis

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Widget},
};

use tradeboard_core::chart::CandlePoint;

use crate::panels::equity_chart::minute_label;
use crate::theme::Theme;

/// Width of the price labels on the left.
const LABEL_WIDTH: u16 = 10;

pub struct CandleChartPanel<'a> {
    candles: &'a [CandlePoint],
    title: &'a str,
    theme: &'a Theme,
}

impl<'a> CandleChartPanel<'a> {
    pub fn new(candles: &'a [CandlePoint], title: &'a str, theme: &'a Theme) -> Self {
        Self {
            candles,
            title,
            theme,
        }
    }
}

/// Map a price to a row in the plot area (0 = top).
fn price_to_y(price: f64, y_min: f64, y_max: f64, plot_height: u16) -> u16 {
    if (y_max - y_min).abs() < 1e-12 || plot_height == 0 {
        return 0;
    }
    let frac = (price - y_min) / (y_max - y_min);
    let y = plot_height.saturating_sub(1) as f64 * (1.0 - frac);
    y.round().clamp(0.0, plot_height.saturating_sub(1) as f64) as u16
}

impl<'a> Widget for CandleChartPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title.to_string())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent))
            .style(Style::default().bg(self.theme.background));
        let inner = block.inner(area);
        block.render(area, buf);

        let plot_left = inner.x + LABEL_WIDTH;
        let plot_top = inner.y;
        let plot_width = inner.width.saturating_sub(LABEL_WIDTH);
        let plot_height = inner.height.saturating_sub(1);
        if self.candles.is_empty() || plot_width == 0 || plot_height == 0 {
            return;
        }

        let start = self.candles.len().saturating_sub(plot_width as usize);
        let visible = &self.candles[start..];

        let y_min = visible.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
        let y_max = visible.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
        let range = y_max - y_min;
        let pad = if range > 0.0 { range * 0.05 } else { y_max.abs().max(1.0) * 0.01 };
        let y_lower = y_min - pad;
        let y_upper = y_max + pad;

        let labels = [y_upper, (y_upper + y_lower) / 2.0, y_lower];
        let rows = [0u16, plot_height / 2, plot_height.saturating_sub(1)];
        for (value, row) in labels.iter().zip(rows.iter()) {
            buf.set_stringn(
                inner.x,
                plot_top + row,
                format!("{:>9.2}", value),
                LABEL_WIDTH as usize,
                Style::default().fg(self.theme.muted),
            );
        }

        for (i, candle) in visible.iter().enumerate() {
            let x = plot_left + i as u16;
            if x >= inner.right() {
                break;
            }
            let is_up = candle.is_up();
            let style = Style::default().fg(self.theme.candle_color(is_up));

            let high_y = price_to_y(candle.high, y_lower, y_upper, plot_height);
            let low_y = price_to_y(candle.low, y_lower, y_upper, plot_height);
            let body_top = price_to_y(candle.open.max(candle.close), y_lower, y_upper, plot_height);
            let body_bot = price_to_y(candle.open.min(candle.close), y_lower, y_upper, plot_height);

            for y in high_y..body_top {
                buf.set_string(x, plot_top + y, "│", style);
            }
            let body = if is_up { "█" } else { "▓" };
            for y in body_top..=body_bot {
                buf.set_string(x, plot_top + y, body, style);
            }
            for y in (body_bot + 1)..=low_y {
                buf.set_string(x, plot_top + y, "│", style);
            }
        }

        let axis_y = plot_top + plot_height;
        if let (Some(first), Some(last)) = (visible.first(), visible.last()) {
            let left = minute_label(first.x);
            let right = minute_label(last.x);
            let muted = Style::default().fg(self.theme.muted);
            buf.set_stringn(plot_left, axis_y, &left, plot_width as usize, muted);
            let right_x = inner.right().saturating_sub(right.len() as u16);
            if right_x > plot_left + left.len() as u16 {
                buf.set_string(right_x, axis_y, &right, muted);
            }
        }
    }
}
