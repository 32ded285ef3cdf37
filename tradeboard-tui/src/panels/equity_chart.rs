//! Equity curve panel, drawn with ratatui's `Chart` on a minute time axis.

use chrono::DateTime;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Widget},
};

use crate::theme::Theme;

/// Render a minute-axis coordinate as a UTC `MM-DD HH:MM` label.
pub fn minute_label(x: f64) -> String {
    DateTime::from_timestamp_millis((x * 60_000.0).round() as i64)
        .map(|t| t.format("%m-%d %H:%M").to_string())
        .unwrap_or_else(|| format!("{x:.0}"))
}

pub struct EquityChartPanel<'a> {
    points: &'a [(f64, f64)],
    title: &'a str,
    theme: &'a Theme,
}

impl<'a> EquityChartPanel<'a> {
    pub fn new(points: &'a [(f64, f64)], title: &'a str, theme: &'a Theme) -> Self {
        Self {
            points,
            title,
            theme,
        }
    }
}

impl<'a> Widget for EquityChartPanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(self.title.to_string())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent))
            .style(Style::default().bg(self.theme.background));

        let (x_min, x_max) = bounds(self.points.iter().map(|p| p.0)).unwrap_or((0.0, 1.0));
        let (y_min, y_max) = bounds(self.points.iter().map(|p| p.1)).unwrap_or((0.0, 1.0));
        // A single point still needs a non-degenerate axis.
        let (x_min, x_max) = if x_max > x_min { (x_min, x_max) } else { (x_min - 1.0, x_max + 1.0) };
        let y_range = y_max - y_min;
        let y_pad = if y_range > 0.0 { y_range * 0.05 } else { y_max.abs().max(1.0) * 0.01 };
        let y_lower = y_min - y_pad;
        let y_upper = y_max + y_pad;

        let dataset = Dataset::default()
            .name("Equity")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(self.theme.accent))
            .data(self.points);

        let x_labels = vec![
            Span::raw(minute_label(x_min)),
            Span::raw(minute_label((x_min + x_max) / 2.0)),
            Span::raw(minute_label(x_max)),
        ];
        let y_labels = vec![
            Span::raw(format!("${:.2}", y_lower)),
            Span::raw(format!("${:.2}", (y_lower + y_upper) / 2.0)),
            Span::raw(format!("${:.2}", y_upper)),
        ];

        Chart::new(vec![dataset])
            .block(block)
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(self.theme.muted))
                    .bounds([x_min, x_max])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .title(Span::styled(
                        "Equity",
                        Style::default().fg(self.theme.text_secondary),
                    ))
                    .style(Style::default().fg(self.theme.muted))
                    .bounds([y_lower, y_upper])
                    .labels(y_labels),
            )
            .render(area, buf);
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
