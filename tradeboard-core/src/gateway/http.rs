//! reqwest-backed gateway.

use std::time::Duration;

use reqwest::blocking::{multipart, Client};
use serde::Deserialize;

use super::{interpret_body, BackendGateway, RawResponse};
use crate::domain::{Candle, Interval};
use crate::error::GatewayError;
use crate::request::{BacktestRequest, ParameterizedRequest, CSV_FIELD};

#[derive(Debug, Deserialize)]
struct CandlesBody {
    candles: Vec<Candle>,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    #[serde(default)]
    symbols: Option<Vec<String>>,
}

/// Blocking HTTP gateway. Meant to live on a worker thread.
pub struct HttpGateway {
    client: Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl HttpGateway {
    /// `timeout: None` waits for the server indefinitely.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, GatewayError> {
        // The blocking client applies a 30s default unless told otherwise.
        let client = Client::builder()
            .user_agent(concat!("tradeboard/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn classify(&self, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout {
                secs: self.timeout.map(|t| t.as_secs()).unwrap_or_default(),
            }
        } else {
            GatewayError::Transport(e.to_string())
        }
    }

    fn exchange(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> Result<serde_json::Value, GatewayError> {
        let resp = request.send().map_err(|e| self.classify(e))?;
        let status = resp.status();
        let text = resp.text().map_err(|e| self.classify(e))?;
        interpret_body(status, &text)
    }
}

impl BackendGateway for HttpGateway {
    fn submit(&self, request: &BacktestRequest) -> Result<RawResponse, GatewayError> {
        let url = self.url(request.endpoint());
        tracing::info!(%url, shape = request.response_shape().label(), "submitting backtest");

        let builder = match request {
            BacktestRequest::Parameterized(ParameterizedRequest::Symbol(body)) => {
                self.client.post(&url).json(body)
            }
            BacktestRequest::Parameterized(ParameterizedRequest::Params(body)) => {
                self.client.post(&url).json(body)
            }
            BacktestRequest::CsvUpload(upload) => {
                let part = multipart::Part::bytes(upload.bytes.clone())
                    .file_name(upload.file_name.clone())
                    .mime_str("text/csv")
                    .map_err(|e| GatewayError::Transport(e.to_string()))?;
                let form = multipart::Form::new().part(CSV_FIELD, part);
                self.client.post(&url).multipart(form)
            }
        };

        let body = self.exchange(builder)?;
        Ok(RawResponse {
            shape: request.response_shape(),
            body,
        })
    }

    fn fetch_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, GatewayError> {
        let limit = limit.to_string();
        let builder = self.client.get(self.url("/api/candles")).query(&[
            ("symbol", symbol),
            ("limit", limit.as_str()),
            ("interval", interval.as_str()),
        ]);
        let body = self.exchange(builder)?;
        let parsed: CandlesBody = serde_json::from_value(body)
            .map_err(|e| GatewayError::Transport(format!("malformed candles body: {e}")))?;
        tracing::debug!(symbol, count = parsed.candles.len(), "fetched candles");
        Ok(parsed.candles)
    }

    fn fetch_symbols(&self) -> Result<Vec<String>, GatewayError> {
        let body = self.exchange(self.client.get(self.url("/api/status")))?;
        let parsed: StatusBody = serde_json::from_value(body)
            .map_err(|e| GatewayError::Transport(format!("malformed status body: {e}")))?;
        Ok(parsed.symbols.unwrap_or_default())
    }
}
