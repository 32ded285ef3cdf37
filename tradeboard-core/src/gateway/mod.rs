//! Backend gateway trait and response interpretation.
//!
//! The BackendGateway trait abstracts over the HTTP client so the run pipeline
//! and the dashboard can be driven by a scripted gateway in tests.

pub mod http;

pub use http::HttpGateway;

use reqwest::StatusCode;
use serde_json::Value;

use crate::domain::{Candle, Interval};
use crate::error::GatewayError;
use crate::request::BacktestRequest;

/// Symbol offered when the backend cannot list its own.
pub const DEFAULT_SYMBOL: &str = "ETHUSDT";

/// Which response layout a body follows, decided by the endpoint that
/// produced it and never by inspecting the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `/api/backtest`: flat `stats` object plus `trades`.
    Summary,
    /// `/api/run_backtest`: top-level `final_balance`, win/loss tally,
    /// `trades` and an `equity` curve.
    EquityCurve,
}

impl ResponseShape {
    pub fn label(self) -> &'static str {
        match self {
            ResponseShape::Summary => "summary",
            ResponseShape::EquityCurve => "equity-curve",
        }
    }
}

/// A successfully parsed body, tagged with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub shape: ResponseShape,
    pub body: Value,
}

/// Network exchange with the backtest server.
///
/// Every call performs exactly one request. Retrying is the caller's choice.
pub trait BackendGateway: Send + Sync {
    /// Submit a backtest and return the raw body tagged with its shape.
    fn submit(&self, request: &BacktestRequest) -> Result<RawResponse, GatewayError>;

    /// Fetch a price series for charting the symbol flow.
    fn fetch_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, GatewayError>;

    /// List the symbols the server can backtest.
    fn fetch_symbols(&self) -> Result<Vec<String>, GatewayError>;
}

/// Turn an HTTP status and body text into JSON or a gateway error.
///
/// An `error` field wins over the status code: the server uses it for both
/// 4xx rejections and 5xx upstream failures, and its text is what the user
/// needs to see.
pub fn interpret_body(status: StatusCode, text: &str) -> Result<Value, GatewayError> {
    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            return Err(if status.is_success() {
                GatewayError::Transport(format!("malformed response body: {e}"))
            } else {
                GatewayError::Transport(format!("HTTP {status}"))
            });
        }
    };

    if let Some(err) = value.get("error").filter(|e| !e.is_null()) {
        let message = match err {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(GatewayError::Application(message));
    }

    if !status.is_success() {
        return Err(GatewayError::Transport(format!("HTTP {status}")));
    }

    Ok(value)
}

/// Symbols for the picker, falling back to [`DEFAULT_SYMBOL`] rather than
/// leaving the user with nothing to choose.
pub fn symbols_or_default(gateway: &dyn BackendGateway) -> Vec<String> {
    match gateway.fetch_symbols() {
        Ok(symbols) if !symbols.is_empty() => symbols,
        Ok(_) => {
            tracing::warn!("backend listed no symbols, using default");
            vec![DEFAULT_SYMBOL.to_string()]
        }
        Err(e) => {
            tracing::warn!(error = %e, "symbol list unavailable, using default");
            vec![DEFAULT_SYMBOL.to_string()]
        }
    }
}
