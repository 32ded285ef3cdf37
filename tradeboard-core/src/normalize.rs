//! Response normalizer: two backend dialects in, one `BacktestResult` out.
//!
//! The shape is chosen by the `RawResponse` tag, which the gateway sets from
//! the endpoint it called. A body that does not fit its tagged shape is a
//! `SchemaError`; there is no fallback parsing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::{parse_wire_time, BacktestResult, Candle, EquityPoint, Stats, Trade};
use crate::error::SchemaError;
use crate::gateway::{RawResponse, ResponseShape};

/// Data the caller holds alongside the raw body.
#[derive(Debug, Clone, Default)]
pub struct NormalizeContext {
    /// Price series fetched separately for the symbol flow.
    pub candles: Option<Vec<Candle>>,
    /// Initial balance the request asked for; used when the body omits it.
    pub requested_initial_balance: Option<f64>,
}

// ── Wire layouts ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SummaryBody {
    stats: SummaryStats,
    trades: Vec<WireTrade>,
}

#[derive(Debug, Deserialize)]
struct SummaryStats {
    initial_balance: f64,
    final_balance: f64,
    wins: u64,
    losses: u64,
    #[serde(default, deserialize_with = "lenient_f64")]
    profit_usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct EquityCurveBody {
    final_balance: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    initial_balance: Option<f64>,
    stats: Tally,
    trades: Vec<WireTrade>,
    equity: Vec<WireEquityPoint>,
}

#[derive(Debug, Deserialize)]
struct Tally {
    wins: u64,
    losses: u64,
    #[serde(default, deserialize_with = "lenient_f64")]
    profit_usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WireTrade {
    time: Value,
    #[serde(default)]
    time_str: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    entry: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    exit: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    profit: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    balance_after: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireEquityPoint {
    time: Value,
    equity: f64,
}

/// Anything that is not a finite JSON number becomes `None`.
fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(v.as_f64().filter(|f| f.is_finite()))
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

// ── Normalization ────────────────────────────────────────────────────

/// Convert a tagged raw body into the canonical view model.
pub fn normalize(raw: &RawResponse, ctx: NormalizeContext) -> Result<BacktestResult, SchemaError> {
    let result = match raw.shape {
        ResponseShape::Summary => normalize_summary(&raw.body, ctx)?,
        ResponseShape::EquityCurve => normalize_equity_curve(&raw.body, ctx)?,
    };
    tracing::debug!(
        shape = raw.shape.label(),
        trades = result.trades.len(),
        equity_points = result.equity.len(),
        candles = result.candles.as_ref().map_or(0, Vec::len),
        "normalized response"
    );
    Ok(result)
}

fn decode<T: for<'de> Deserialize<'de>>(shape: ResponseShape, body: &Value) -> Result<T, SchemaError> {
    T::deserialize(body).map_err(|e| SchemaError::new(shape.label(), e.to_string()))
}

fn normalize_summary(body: &Value, ctx: NormalizeContext) -> Result<BacktestResult, SchemaError> {
    let shape = ResponseShape::Summary;
    let wire: SummaryBody = decode(shape, body)?;

    let stats = tally(
        shape,
        wire.stats.initial_balance,
        wire.stats.final_balance,
        wire.stats.wins,
        wire.stats.losses,
        wire.stats.profit_usd,
    )?;

    Ok(BacktestResult {
        stats,
        trades: convert_trades(shape, wire.trades)?,
        equity: Vec::new(),
        candles: ctx.candles,
    })
}

fn normalize_equity_curve(
    body: &Value,
    ctx: NormalizeContext,
) -> Result<BacktestResult, SchemaError> {
    let shape = ResponseShape::EquityCurve;
    let wire: EquityCurveBody = decode(shape, body)?;

    let initial_balance = wire
        .initial_balance
        .or(ctx.requested_initial_balance)
        .or_else(|| wire.stats.profit_usd.map(|p| wire.final_balance - p))
        .ok_or_else(|| SchemaError::new(shape.label(), "no initial balance in body or request"))?;

    let stats = tally(
        shape,
        initial_balance,
        wire.final_balance,
        wire.stats.wins,
        wire.stats.losses,
        wire.stats.profit_usd,
    )?;

    let equity = wire
        .equity
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
            Ok(EquityPoint {
                time: wire_time(shape, &p.time, || format!("equity[{i}]"))?,
                equity: p.equity,
            })
        })
        .collect::<Result<Vec<_>, SchemaError>>()?;

    Ok(BacktestResult {
        stats,
        trades: convert_trades(shape, wire.trades)?,
        equity,
        candles: None,
    })
}

fn tally(
    shape: ResponseShape,
    initial_balance: f64,
    final_balance: f64,
    wins: u64,
    losses: u64,
    profit_usd: Option<f64>,
) -> Result<Stats, SchemaError> {
    Stats::from_tally(initial_balance, final_balance, wins, losses, profit_usd).ok_or_else(|| {
        SchemaError::new(
            shape.label(),
            format!("stats.wins + stats.losses overflows ({wins} + {losses})"),
        )
    })
}

fn convert_trades(shape: ResponseShape, trades: Vec<WireTrade>) -> Result<Vec<Trade>, SchemaError> {
    trades
        .into_iter()
        .enumerate()
        .map(|(i, t)| {
            Ok(Trade {
                time: wire_time(shape, &t.time, || format!("trades[{i}]"))?,
                display_time: t.time_str.filter(|s| !s.trim().is_empty()),
                entry: t.entry,
                exit: t.exit,
                profit: t.profit,
                balance_after: t.balance_after,
                reason: t.reason.unwrap_or_default(),
            })
        })
        .collect()
}

fn wire_time(
    shape: ResponseShape,
    value: &Value,
    at: impl FnOnce() -> String,
) -> Result<DateTime<Utc>, SchemaError> {
    parse_wire_time(value).ok_or_else(|| {
        SchemaError::new(shape.label(), format!("{}: unreadable time {value}", at()))
    })
}
