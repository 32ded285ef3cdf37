//! Candle: one OHLC bar as served by `/api/candles`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLC bar keyed by its open time.
///
/// `low <= open, close <= high` is the server's promise; nothing here checks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl Candle {
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }
}
