//! Trade: one closed position as reported by the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A closed trade in execution order.
///
/// Numeric fields are `None` when the server omitted them or sent something
/// that is not a number, so "no data" never turns into a zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub time: DateTime<Utc>,
    /// Server-formatted time (`time_str`), preferred for display.
    pub display_time: Option<String>,
    pub entry: Option<f64>,
    pub exit: Option<f64>,
    pub profit: Option<f64>,
    /// Running account balance right after this trade.
    pub balance_after: Option<f64>,
    pub reason: String,
}

impl Trade {
    /// Winners include break-even trades, matching the server's tally.
    pub fn is_non_loss(&self) -> Option<bool> {
        self.profit.map(|p| p >= 0.0)
    }
}
