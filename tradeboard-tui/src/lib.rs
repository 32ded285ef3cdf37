//! TradeBoard TUI: terminal dashboard for a remote backtest service.
//!
//! - Run form for the symbol and parameterized backends
//! - CSV upload
//! - Summary line, trade ledger, candlestick or equity chart

pub mod app;
pub mod chart_slot;
pub mod input;
pub mod panels;
pub mod persistence;
pub mod theme;
pub mod ui;
pub mod worker;

pub use app::AppState;
pub use input::handle_key;
pub use theme::Theme;
