//! Trade ledger shaping: newest-first display rows and CSV export.
//!
//! Rows are plain strings plus a tone so every surface (terminal table, CLI
//! printout, CSV file) shows the same cells.

use anyhow::{Context, Result};

use crate::domain::Trade;

/// Most recent trades shown in the ledger.
pub const MAX_LEDGER_ROWS: usize = 200;

/// Decimal places for every numeric ledger cell.
const CELL_PRECISION: usize = 6;

/// Column headings in display order.
pub const LEDGER_COLUMNS: [&str; 6] = ["time", "entry", "exit", "profit", "balance_after", "reason"];

/// Colour hint for the profit cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfitTone {
    /// Profit ≥ 0, break-even included.
    NonLoss,
    Loss,
}

/// One rendered ledger line.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub time: String,
    pub entry: String,
    pub exit: String,
    pub profit: String,
    pub balance_after: String,
    pub reason: String,
    /// `None` when the trade carries no profit figure.
    pub tone: Option<ProfitTone>,
}

impl LedgerRow {
    pub fn from_trade(trade: &Trade) -> Self {
        Self {
            time: display_time(trade),
            entry: number_cell(trade.entry),
            exit: number_cell(trade.exit),
            profit: number_cell(trade.profit),
            balance_after: number_cell(trade.balance_after),
            reason: trade.reason.clone(),
            tone: trade.is_non_loss().map(|ok| {
                if ok {
                    ProfitTone::NonLoss
                } else {
                    ProfitTone::Loss
                }
            }),
        }
    }

    /// Cells in [`LEDGER_COLUMNS`] order.
    pub fn cells(&self) -> [&str; 6] {
        [
            &self.time,
            &self.entry,
            &self.exit,
            &self.profit,
            &self.balance_after,
            &self.reason,
        ]
    }
}

/// Build display rows: at most [`MAX_LEDGER_ROWS`], latest trade first.
///
/// `trades` is chronological, so this is a reversed view of its tail.
pub fn ledger_rows(trades: &[Trade]) -> Vec<LedgerRow> {
    trades
        .iter()
        .rev()
        .take(MAX_LEDGER_ROWS)
        .map(LedgerRow::from_trade)
        .collect()
}

fn number_cell(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.prec$}", prec = CELL_PRECISION))
        .unwrap_or_default()
}

fn display_time(trade: &Trade) -> String {
    match &trade.display_time {
        Some(s) => s.clone(),
        None => trade.time.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

/// Export every trade (not just the displayed window) as CSV, chronological.
pub fn export_ledger_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(LEDGER_COLUMNS)?;
    for t in trades {
        let row = LedgerRow::from_trade(t);
        wtr.write_record(row.cells())?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn trade(ms: i64, profit: Option<f64>) -> Trade {
        Trade {
            time: DateTime::from_timestamp_millis(ms).unwrap(),
            display_time: None,
            entry: Some(1.0),
            exit: Some(1.1),
            profit,
            balance_after: Some(10.1),
            reason: "tp".into(),
        }
    }

    #[test]
    fn single_trade_row() {
        let rows = ledger_rows(&[trade(1000, Some(0.1))]);
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.time, "1970-01-01 00:00:01");
        assert_eq!(r.entry, "1.000000");
        assert_eq!(r.exit, "1.100000");
        assert_eq!(r.profit, "0.100000");
        assert_eq!(r.balance_after, "10.100000");
        assert_eq!(r.reason, "tp");
        assert_eq!(r.tone, Some(ProfitTone::NonLoss));
    }

    #[test]
    fn latest_first_and_capped() {
        let trades: Vec<Trade> = (0..250).map(|i| trade(i * 60_000, Some(0.0))).collect();
        let rows = ledger_rows(&trades);
        assert_eq!(rows.len(), MAX_LEDGER_ROWS);
        assert_eq!(rows[0].time, "1970-01-01 04:09:00");
        assert_eq!(rows[199].time, "1970-01-01 00:50:00");
    }

    #[test]
    fn zero_profit_is_non_loss() {
        let rows = ledger_rows(&[trade(0, Some(0.0)), trade(1, Some(-0.5))]);
        assert_eq!(rows[0].tone, Some(ProfitTone::Loss));
        assert_eq!(rows[1].tone, Some(ProfitTone::NonLoss));
    }

    #[test]
    fn absent_fields_are_empty_cells() {
        let mut t = trade(0, None);
        t.entry = None;
        t.balance_after = None;
        let r = LedgerRow::from_trade(&t);
        assert_eq!(r.entry, "");
        assert_eq!(r.profit, "");
        assert_eq!(r.balance_after, "");
        assert_eq!(r.tone, None);
    }

    #[test]
    fn display_time_preferred() {
        let mut t = trade(0, Some(1.0));
        t.display_time = Some("2024-01-01 09:30:00".into());
        assert_eq!(LedgerRow::from_trade(&t).time, "2024-01-01 09:30:00");
    }

    #[test]
    fn csv_export_is_chronological() {
        let csv = export_ledger_csv(&[trade(0, Some(-1.0)), trade(60_000, None)]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "time,entry,exit,profit,balance_after,reason");
        assert_eq!(
            lines[1],
            "1970-01-01 00:00:00,1.000000,1.100000,-1.000000,10.100000,tp"
        );
        assert_eq!(lines[2], "1970-01-01 00:01:00,1.000000,1.100000,,10.100000,tp");
    }
}
