//! Chart series selection.
//!
//! A result is drawn either as candlesticks (when a price series came along
//! with it) or as an equity curve, never both. The time axis is always in
//! minutes, whatever bar interval the run used.

use chrono::{DateTime, Utc};

use crate::domain::{BacktestResult, Candle, EquityPoint};

/// Unit of the chart's x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeUnit {
    #[default]
    Minute,
}

impl TimeUnit {
    /// Axis coordinate for a timestamp.
    pub fn to_x(self, time: DateTime<Utc>) -> f64 {
        match self {
            TimeUnit::Minute => time.timestamp_millis() as f64 / 60_000.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeUnit::Minute => "minute",
        }
    }
}

/// One candlestick in axis coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandlePoint {
    pub x: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl CandlePoint {
    fn from_candle(unit: TimeUnit, c: &Candle) -> Self {
        Self {
            x: unit.to_x(c.time),
            open: c.open,
            high: c.high,
            low: c.low,
            close: c.close,
        }
    }

    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }
}

/// What the chart slot should draw for a result.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartSeries {
    Candles(Vec<CandlePoint>),
    /// `(x, equity)` pairs.
    Equity(Vec<(f64, f64)>),
    Empty,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        matches!(self, ChartSeries::Empty)
    }

    /// `(min, max)` of the x axis, `None` for an empty series.
    pub fn x_bounds(&self) -> Option<(f64, f64)> {
        let xs: Box<dyn Iterator<Item = f64> + '_> = match self {
            ChartSeries::Candles(c) => Box::new(c.iter().map(|p| p.x)),
            ChartSeries::Equity(e) => Box::new(e.iter().map(|p| p.0)),
            ChartSeries::Empty => return None,
        };
        bounds(xs)
    }

    /// `(min, max)` of the y axis: candle lows/highs, or equity values.
    pub fn y_bounds(&self) -> Option<(f64, f64)> {
        match self {
            ChartSeries::Candles(c) => bounds(c.iter().flat_map(|p| [p.low, p.high])),
            ChartSeries::Equity(e) => bounds(e.iter().map(|p| p.1)),
            ChartSeries::Empty => None,
        }
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Pick the series for a result: candles if any, else equity if any, else
/// nothing.
pub fn select_series(result: &BacktestResult) -> ChartSeries {
    let unit = TimeUnit::Minute;
    if let Some(candles) = result.candles.as_ref().filter(|c| !c.is_empty()) {
        return ChartSeries::Candles(
            candles
                .iter()
                .map(|c| CandlePoint::from_candle(unit, c))
                .collect(),
        );
    }
    if !result.equity.is_empty() {
        return ChartSeries::Equity(equity_points(unit, &result.equity));
    }
    ChartSeries::Empty
}

fn equity_points(unit: TimeUnit, equity: &[EquityPoint]) -> Vec<(f64, f64)> {
    equity.iter().map(|p| (unit.to_x(p.time), p.equity)).collect()
}
