//! Request builder: form state in, exactly one request variant out.
//!
//! Nothing in here touches the network. The only I/O is [`load_upload`],
//! which the dashboard calls off the UI thread before building an upload.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::Interval;
use crate::error::UserInputError;
use crate::gateway::ResponseShape;

/// Multipart field name the backend reads the CSV file from.
pub const CSV_FIELD: &str = "csv";

/// Which backend endpoint the dashboard targets.
///
/// This single flag decides the request variant; file contents never do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendMode {
    /// `/api/backtest`: symbol + lookback window, or a multipart CSV upload.
    #[default]
    Symbol,
    /// `/api/run_backtest`: strategy parameters with optional inline CSV text.
    Params,
}

impl BackendMode {
    pub fn toggled(self) -> Self {
        match self {
            BackendMode::Symbol => BackendMode::Params,
            BackendMode::Params => BackendMode::Symbol,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BackendMode::Symbol => "symbol",
            BackendMode::Params => "params",
        }
    }
}

/// Strategy knobs forwarded to `/api/run_backtest`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyParams {
    pub initial_balance: f64,
    pub k_neighbors: u32,
    pub lookback: u32,
    pub stop_atr_mult: f64,
    /// Percent of balance risked per trade, in (0, 100].
    pub risk_pct: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            initial_balance: 10.0,
            k_neighbors: 8,
            lookback: 200,
            stop_atr_mult: 1.0,
            risk_pct: 2.0,
        }
    }
}

/// Everything the user can set before pressing run or upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormState {
    pub mode: BackendMode,
    pub symbol: String,
    /// Lookback window. Zero means "use an uploaded CSV instead".
    pub months: u32,
    pub interval: Interval,
    pub initial_balance: f64,
    pub params: StrategyParams,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            mode: BackendMode::Symbol,
            symbol: "ETHUSDT".to_string(),
            months: 1,
            interval: Interval::M1,
            initial_balance: 10.0,
            params: StrategyParams::default(),
        }
    }
}

/// A chosen file, read into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// The file as UTF-8 text, for backends that take CSV inline.
    pub fn text(&self) -> Result<&str, UserInputError> {
        std::str::from_utf8(&self.bytes).map_err(|_| UserInputError::NotText {
            file_name: self.file_name.clone(),
        })
    }
}

/// Read a chosen file into memory.
pub fn load_upload(path: &Path) -> Result<UploadFile, UserInputError> {
    let bytes = std::fs::read(path).map_err(|e| UserInputError::Unreadable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.csv".to_string());
    tracing::debug!(file = %file_name, bytes = bytes.len(), "loaded upload");
    Ok(UploadFile { file_name, bytes })
}

/// JSON body for `/api/backtest`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolRequest {
    pub symbol: String,
    pub months: u32,
    pub interval: Interval,
    pub initial_balance: f64,
}

/// JSON body for `/api/run_backtest`. `csv_data: None` asks the server to
/// use its bundled sample dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamsRequest {
    pub csv_data: Option<String>,
    pub params: StrategyParams,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParameterizedRequest {
    Symbol(SymbolRequest),
    Params(ParamsRequest),
}

/// Raw CSV bytes for the multipart flavour of `/api/backtest`.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// One request. The two variants are never combined in a single call.
#[derive(Debug, Clone, PartialEq)]
pub enum BacktestRequest {
    Parameterized(ParameterizedRequest),
    CsvUpload(CsvUpload),
}

impl BacktestRequest {
    pub fn endpoint(&self) -> &'static str {
        match self {
            BacktestRequest::Parameterized(ParameterizedRequest::Params(_)) => "/api/run_backtest",
            _ => "/api/backtest",
        }
    }

    /// The response shape this request's endpoint answers with.
    pub fn response_shape(&self) -> ResponseShape {
        match self {
            BacktestRequest::Parameterized(ParameterizedRequest::Params(_)) => {
                ResponseShape::EquityCurve
            }
            _ => ResponseShape::Summary,
        }
    }

    /// Initial balance the request asked for, when the request carries one.
    pub fn initial_balance(&self) -> Option<f64> {
        match self {
            BacktestRequest::Parameterized(ParameterizedRequest::Symbol(r)) => {
                Some(r.initial_balance)
            }
            BacktestRequest::Parameterized(ParameterizedRequest::Params(r)) => {
                Some(r.params.initial_balance)
            }
            BacktestRequest::CsvUpload(_) => None,
        }
    }

    /// Symbol and interval for the supplementary candle fetch. Only the
    /// symbol flow has a price series to chart.
    pub fn candle_query(&self) -> Option<(&str, Interval)> {
        match self {
            BacktestRequest::Parameterized(ParameterizedRequest::Symbol(r)) => {
                Some((r.symbol.as_str(), r.interval))
            }
            _ => None,
        }
    }
}

/// Build the request behind the "run" action.
pub fn build_run_request(
    form: &FormState,
    upload: Option<&UploadFile>,
) -> Result<BacktestRequest, UserInputError> {
    match form.mode {
        BackendMode::Symbol => {
            if form.months == 0 {
                return Err(UserInputError::UploadRequired);
            }
            validate_symbol(&form.symbol)?;
            validate_positive("initial_balance", form.initial_balance)?;
            Ok(BacktestRequest::Parameterized(ParameterizedRequest::Symbol(
                SymbolRequest {
                    symbol: form.symbol.trim().to_string(),
                    months: form.months,
                    interval: form.interval,
                    initial_balance: form.initial_balance,
                },
            )))
        }
        BackendMode::Params => {
            validate_params(&form.params)?;
            let csv_data = upload.map(|u| u.text().map(str::to_owned)).transpose()?;
            Ok(BacktestRequest::Parameterized(ParameterizedRequest::Params(
                ParamsRequest {
                    csv_data,
                    params: form.params.clone(),
                },
            )))
        }
    }
}

/// Build the request behind the "upload CSV" action.
pub fn build_upload_request(
    form: &FormState,
    upload: Option<&UploadFile>,
) -> Result<BacktestRequest, UserInputError> {
    let upload = upload.ok_or(UserInputError::NoFileChosen)?;
    match form.mode {
        BackendMode::Symbol => Ok(BacktestRequest::CsvUpload(CsvUpload {
            file_name: upload.file_name.clone(),
            bytes: upload.bytes.clone(),
        })),
        BackendMode::Params => {
            validate_params(&form.params)?;
            Ok(BacktestRequest::Parameterized(ParameterizedRequest::Params(
                ParamsRequest {
                    csv_data: Some(upload.text()?.to_owned()),
                    params: form.params.clone(),
                },
            )))
        }
    }
}

fn validate_symbol(symbol: &str) -> Result<(), UserInputError> {
    if symbol.trim().is_empty() {
        return Err(UserInputError::InvalidField {
            field: "symbol",
            reason: "must not be empty".into(),
        });
    }
    Ok(())
}

fn validate_positive(field: &'static str, value: f64) -> Result<(), UserInputError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(UserInputError::InvalidField {
            field,
            reason: format!("must be greater than zero, got {value}"),
        });
    }
    Ok(())
}

fn validate_params(p: &StrategyParams) -> Result<(), UserInputError> {
    validate_positive("initial_balance", p.initial_balance)?;
    validate_positive("stop_atr_mult", p.stop_atr_mult)?;
    if p.k_neighbors == 0 {
        return Err(UserInputError::InvalidField {
            field: "k_neighbors",
            reason: "must be at least 1".into(),
        });
    }
    if p.lookback == 0 {
        return Err(UserInputError::InvalidField {
            field: "lookback",
            reason: "must be at least 1".into(),
        });
    }
    if !(p.risk_pct > 0.0 && p.risk_pct <= 100.0) {
        return Err(UserInputError::InvalidField {
            field: "risk_pct",
            reason: format!("must be in (0, 100], got {}", p.risk_pct),
        });
    }
    Ok(())
}
