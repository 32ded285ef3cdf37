//! Canonical view-model types shared by every dashboard surface.

pub mod candle;
pub mod interval;
pub mod result;
pub mod stats;
pub mod timestamp;
pub mod trade;

pub use candle::Candle;
pub use interval::Interval;
pub use result::{BacktestResult, EquityPoint};
pub use stats::Stats;
pub use timestamp::parse_wire_time;
pub use trade::Trade;

/// Symbol type alias
pub type Symbol = String;
