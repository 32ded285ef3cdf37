//! Chart slot: owner of the single live chart instance.
//!
//! Rendering always destroys the previous instance before building a new
//! one, so two charts never coexist on the canvas.

use tradeboard_core::chart::{select_series, ChartSeries, TimeUnit};
use tradeboard_core::BacktestResult;

/// A built chart, ready for a panel to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartInstance {
    pub series: ChartSeries,
    pub unit: TimeUnit,
    pub title: String,
}

impl ChartInstance {
    fn build(series: ChartSeries) -> Self {
        let title = match &series {
            ChartSeries::Candles(c) => format!(" Price | {} candles ", c.len()),
            ChartSeries::Equity(p) => format!(" Equity | {} points ", p.len()),
            ChartSeries::Empty => String::new(),
        };
        Self {
            series,
            unit: TimeUnit::Minute,
            title,
        }
    }
}

impl Drop for ChartInstance {
    fn drop(&mut self) {
        tracing::trace!(title = %self.title, "chart instance destroyed");
    }
}

#[derive(Debug, Default)]
pub struct ChartSlot {
    instance: Option<ChartInstance>,
    created: u64,
}

impl ChartSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the chart with one built from `result`. An empty series leaves
    /// the slot empty.
    pub fn render(&mut self, result: &BacktestResult) {
        self.clear();
        let series = select_series(result);
        if series.is_empty() {
            return;
        }
        self.created += 1;
        self.instance = Some(ChartInstance::build(series));
    }

    /// Destroy the current chart without building a new one.
    pub fn clear(&mut self) {
        self.instance = None;
    }

    pub fn instance(&self) -> Option<&ChartInstance> {
        self.instance.as_ref()
    }

    /// Number of instances ever built by this slot.
    pub fn created(&self) -> u64 {
        self.created
    }
}
