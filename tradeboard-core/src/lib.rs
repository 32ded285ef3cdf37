//! TradeBoard Core: request building, backend gateway, response
//! normalization, and ledger/chart shaping for the backtest dashboard.
//!
//! The dashboard and the CLI share everything in here:
//! - Domain view model (stats, trades, equity points, candles)
//! - Request builder for the symbol, params and CSV-upload flows
//! - Backend gateway trait with a blocking HTTP implementation
//! - Normalizer that folds both backend response dialects into one result
//! - Ledger rows, CSV export and chart series selection
//! - Configuration, locale strings and logging setup

pub mod chart;
pub mod config;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod ledger;
pub mod locale;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod request;

pub use config::TradeboardConfig;
pub use domain::{BacktestResult, Candle, EquityPoint, Interval, Stats, Trade};
pub use error::{ErrorCategory, GatewayError, RunError, SchemaError, UserInputError};
pub use gateway::{BackendGateway, HttpGateway, RawResponse, ResponseShape};
pub use locale::Locale;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything the worker thread hands back to the UI
    /// thread is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<BacktestResult>();
        require_sync::<BacktestResult>();
        require_send::<RunError>();
        require_sync::<RunError>();
        require_send::<request::FormState>();
        require_sync::<request::FormState>();
        require_send::<request::BacktestRequest>();
        require_sync::<request::BacktestRequest>();
        require_send::<HttpGateway>();
        require_sync::<HttpGateway>();
        require_send::<ledger::LedgerRow>();
        require_sync::<ledger::LedgerRow>();
        require_send::<chart::ChartSeries>();
        require_sync::<chart::ChartSeries>();
    }

    /// The gateway trait stays object safe so the dashboard can hold a
    /// `Box<dyn BackendGateway>` and tests can swap in a scripted one.
    #[test]
    fn gateway_is_object_safe() {
        fn _takes_dyn(_: &dyn BackendGateway) {}
    }
}
