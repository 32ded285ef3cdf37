//! BacktestResult: the one view model every renderer reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Candle, Stats, Trade};

/// Account equity at one sampling tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub time: DateTime<Utc>,
    pub equity: f64,
}

/// Normalized outcome of one run, regardless of which backend produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub stats: Stats,
    /// Chronological, in execution order.
    pub trades: Vec<Trade>,
    /// Chronological; empty for backends that do not report a curve.
    pub equity: Vec<EquityPoint>,
    /// Present only when the caller fetched a price series alongside the run.
    pub candles: Option<Vec<Candle>>,
}

impl BacktestResult {
    pub fn has_candles(&self) -> bool {
        self.candles.as_ref().is_some_and(|c| !c.is_empty())
    }
}
