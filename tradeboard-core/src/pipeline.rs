//! Run pipeline: request → gateway → normalizer.
//!
//! This is everything a dashboard action does off the UI thread. Each stage
//! either hands its output to the next or ends the run with a `RunError`;
//! nothing here touches displayed state.

use std::path::Path;

use crate::domain::BacktestResult;
use crate::error::{RunError, UserInputError};
use crate::gateway::BackendGateway;
use crate::normalize::{normalize, NormalizeContext};
use crate::request::{
    build_run_request, build_upload_request, load_upload, BackendMode, BacktestRequest, FormState,
};

/// Default number of candles requested for the symbol flow's chart.
pub const DEFAULT_CANDLE_LIMIT: usize = 500;

/// The two user actions that start a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Run,
    Upload,
}

/// Read the chosen file (when the action needs it) and build the request.
///
/// A symbol-mode run never reads the file, so a zero-month window is
/// rejected before any I/O happens.
pub fn prepare_request(
    action: Action,
    form: &FormState,
    upload_path: Option<&Path>,
) -> Result<BacktestRequest, UserInputError> {
    if action == Action::Run && form.mode == BackendMode::Symbol {
        return build_run_request(form, None);
    }
    let upload = upload_path.map(load_upload).transpose()?;
    match action {
        Action::Run => build_run_request(form, upload.as_ref()),
        Action::Upload => build_upload_request(form, upload.as_ref()),
    }
}

/// Submit a built request and normalize the answer.
///
/// For the symbol flow the price series is fetched after the backtest
/// succeeds. A failed candle fetch only costs the chart its candles.
pub fn execute(
    gateway: &dyn BackendGateway,
    request: &BacktestRequest,
    candle_limit: usize,
) -> Result<BacktestResult, RunError> {
    let raw = gateway.submit(request)?;

    let candles = match request.candle_query() {
        Some((symbol, interval)) => match gateway.fetch_candles(symbol, interval, candle_limit) {
            Ok(candles) => Some(candles),
            Err(e) => {
                tracing::warn!(symbol, %interval, error = %e, "candle fetch failed, charting without candles");
                None
            }
        },
        None => None,
    };

    let ctx = NormalizeContext {
        candles,
        requested_initial_balance: request.initial_balance(),
    };
    Ok(normalize(&raw, ctx)?)
}

/// Full pipeline for one action.
pub fn run_action(
    gateway: &dyn BackendGateway,
    action: Action,
    form: &FormState,
    upload_path: Option<&Path>,
    candle_limit: usize,
) -> Result<BacktestResult, RunError> {
    let request = prepare_request(action, form, upload_path)?;
    let result = execute(gateway, &request, candle_limit);
    match &result {
        Ok(r) => tracing::info!(
            ?action,
            trades = r.trades.len(),
            final_balance = r.stats.final_balance,
            "run finished"
        ),
        Err(e) => tracing::warn!(?action, category = e.category().label(), error = %e, "run failed"),
    }
    result
}
