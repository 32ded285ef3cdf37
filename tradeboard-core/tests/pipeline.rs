//! End-to-end run pipeline scenarios against a scripted gateway.

use std::sync::Mutex;

use chrono::DateTime;
use serde_json::{json, Value};
use tradeboard_core::chart::{select_series, ChartSeries};
use tradeboard_core::domain::{Candle, Interval};
use tradeboard_core::gateway::{BackendGateway, RawResponse};
use tradeboard_core::ledger::{ledger_rows, ProfitTone};
use tradeboard_core::pipeline::{run_action, Action};
use tradeboard_core::request::{BackendMode, BacktestRequest, FormState};
use tradeboard_core::{GatewayError, Locale, RunError, UserInputError};

/// Replays fixed answers and records every call made.
struct ScriptedGateway {
    submit: Result<Value, GatewayError>,
    candles: Result<Vec<Candle>, GatewayError>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    fn new(submit: Result<Value, GatewayError>) -> Self {
        Self {
            submit,
            candles: Ok(vec![]),
            calls: Mutex::new(vec![]),
        }
    }

    fn with_candles(mut self, candles: Result<Vec<Candle>, GatewayError>) -> Self {
        self.candles = candles;
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl BackendGateway for ScriptedGateway {
    fn submit(&self, request: &BacktestRequest) -> Result<RawResponse, GatewayError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("submit {}", request.endpoint()));
        self.submit.clone().map(|body| RawResponse {
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
        self.calls
            .lock()
            .unwrap()
            .push(format!("candles {symbol} {interval} {limit}"));
        self.candles.clone()
    }

    fn fetch_symbols(&self) -> Result<Vec<String>, GatewayError> {
        Ok(vec![])
    }
}

fn shape_a_body() -> Value {
    json!({
        "stats": {"initial_balance": 10, "final_balance": 12.5, "trades": 3,
                  "wins": 2, "losses": 1, "win_rate": 66.7},
        "trades": [{"time": 1000, "entry": 1.0, "exit": 1.1, "profit": 0.1,
                    "balance_after": 10.1, "reason": "tp"}]
    })
}

fn candle(ms: i64) -> Candle {
    Candle {
        time: DateTime::from_timestamp_millis(ms).unwrap(),
        open: 1.0,
        high: 1.2,
        low: 0.9,
        close: 1.1,
        volume: Some(5.0),
    }
}

#[test]
fn shape_a_scenario() {
    let gw = ScriptedGateway::new(Ok(shape_a_body())).with_candles(Ok(vec![candle(0), candle(60_000)]));
    let form = FormState::default();

    let result = run_action(&gw, Action::Run, &form, None, 500).unwrap();

    assert_eq!(result.stats.initial_balance, 10.0);
    assert_eq!(result.stats.final_balance, 12.5);
    assert_eq!(result.stats.trade_count, 3);
    let rows = ledger_rows(&result.trades);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].profit, "0.100000");
    assert_eq!(rows[0].tone, Some(ProfitTone::NonLoss));
    assert!(matches!(select_series(&result), ChartSeries::Candles(c) if c.len() == 2));

    assert_eq!(
        gw.calls(),
        vec!["submit /api/backtest", "candles ETHUSDT 1m 500"]
    );
}

#[test]
fn zero_months_never_reaches_the_network() {
    let gw = ScriptedGateway::new(Ok(shape_a_body()));
    let form = FormState {
        months: 0,
        ..FormState::default()
    };

    let err = run_action(&gw, Action::Run, &form, None, 500).unwrap_err();
    assert_eq!(err, RunError::Input(UserInputError::UploadRequired));
    assert!(err.is_prompt());
    assert!(gw.calls().is_empty());
}

#[test]
fn application_error_status_text() {
    let gw = ScriptedGateway::new(Err(GatewayError::Application("invalid symbol".into())));

    let err = run_action(&gw, Action::Run, &FormState::default(), None, 500).unwrap_err();
    assert_eq!(Locale::Ar.error_status(&err), "خطأ: invalid symbol");
    // A rejected run fetches no candles.
    assert_eq!(gw.calls(), vec!["submit /api/backtest"]);
}

#[test]
fn candle_failure_only_drops_the_chart() {
    let gw = ScriptedGateway::new(Ok(shape_a_body()))
        .with_candles(Err(GatewayError::Application("unknown interval".into())));

    let result = run_action(&gw, Action::Run, &FormState::default(), None, 500).unwrap();
    assert!(result.candles.is_none());
    assert_eq!(result.trades.len(), 1);
    assert!(select_series(&result).is_empty());
}

#[test]
fn shape_b_equity_only_draws_equity() {
    let gw = ScriptedGateway::new(Ok(json!({
        "final_balance": 10.4,
        "stats": {"wins": 1, "losses": 1},
        "trades": [
            {"time": "2024-01-01T00:00:00", "time_str": "2024-01-01 00:00", "profit": -0.2, "reason": "SL"},
            {"time": "2024-01-01T01:00:00", "time_str": "2024-01-01 01:00", "profit": 0.6, "reason": "TP"}
        ],
        "equity": [
            {"time": "2024-01-01T00:00:00", "equity": 10.0},
            {"time": "2024-01-01T01:00:00", "equity": 10.4}
        ]
    })));
    let form = FormState {
        mode: BackendMode::Params,
        ..FormState::default()
    };

    let result = run_action(&gw, Action::Run, &form, None, 500).unwrap();
    assert_eq!(result.stats.initial_balance, 10.0);
    assert_eq!(result.stats.win_rate_pct, Some(50.0));
    assert!(matches!(select_series(&result), ChartSeries::Equity(p) if p.len() == 2));

    let rows = ledger_rows(&result.trades);
    assert_eq!(rows[0].time, "2024-01-01 01:00");
    assert_eq!(rows[0].tone, Some(ProfitTone::NonLoss));
    assert_eq!(rows[1].tone, Some(ProfitTone::Loss));

    assert_eq!(gw.calls(), vec!["submit /api/run_backtest"]);
}

#[test]
fn upload_reads_the_file_and_skips_candles() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("eth.csv");
    std::fs::write(&path, "time,open,high,low,close,volume\n").unwrap();

    let gw = ScriptedGateway::new(Ok(shape_a_body()));
    let result = run_action(&gw, Action::Upload, &FormState::default(), Some(&path), 500).unwrap();
    assert_eq!(result.trades.len(), 1);
    assert_eq!(gw.calls(), vec!["submit /api/backtest"]);
}

#[test]
fn upload_without_file_is_input_error() {
    let gw = ScriptedGateway::new(Ok(shape_a_body()));
    let err = run_action(&gw, Action::Upload, &FormState::default(), None, 500).unwrap_err();
    assert_eq!(err, RunError::Input(UserInputError::NoFileChosen));
    assert!(gw.calls().is_empty());
}

#[test]
fn wrong_shape_is_schema_error() {
    let gw = ScriptedGateway::new(Ok(json!({"status": "ok"})));
    let err = run_action(&gw, Action::Run, &FormState::default(), None, 500).unwrap_err();
    assert!(matches!(err, RunError::Schema(_)));
    assert!(Locale::En.error_status(&err).starts_with("Error: unrecognised summary response"));
}

#[test]
fn overflowing_tally_is_schema_error() {
    let gw = ScriptedGateway::new(Ok(json!({
        "stats": {"initial_balance": 10, "final_balance": 10,
                  "wins": u64::MAX, "losses": u64::MAX},
        "trades": []
    })));
    let err = run_action(&gw, Action::Run, &FormState::default(), None, 500).unwrap_err();
    assert!(matches!(err, RunError::Schema(_)));
    assert!(Locale::En.error_status(&err).contains("stats.wins"));
}
