//! Summary statistics for a run.

use serde::{Deserialize, Serialize};

/// Canonical run summary.
///
/// `trade_count` is always `wins + losses` and `win_rate_pct` is derived from
/// them; both are recomputed by [`Stats::from_tally`] rather than trusted
/// from the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub initial_balance: f64,
    pub final_balance: f64,
    pub trade_count: u64,
    pub wins: u64,
    pub losses: u64,
    /// `None` when there are no trades.
    pub win_rate_pct: Option<f64>,
    pub profit_usd: Option<f64>,
}

impl Stats {
    /// `None` when `wins + losses` does not fit in a `u64`.
    pub fn from_tally(
        initial_balance: f64,
        final_balance: f64,
        wins: u64,
        losses: u64,
        profit_usd: Option<f64>,
    ) -> Option<Self> {
        let trade_count = wins.checked_add(losses)?;
        let win_rate_pct = if trade_count == 0 {
            None
        } else {
            Some(100.0 * wins as f64 / trade_count as f64)
        };
        Some(Self {
            initial_balance,
            final_balance,
            trade_count,
            wins,
            losses,
            win_rate_pct,
            profit_usd,
        })
    }

    /// Net result in account currency, preferring the server's own figure.
    pub fn net_profit(&self) -> f64 {
        self.profit_usd
            .unwrap_or(self.final_balance - self.initial_balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_rate_from_tally() {
        let s = Stats::from_tally(10.0, 12.5, 2, 1, None).unwrap();
        assert_eq!(s.trade_count, 3);
        let wr = s.win_rate_pct.unwrap();
        assert!((wr - 66.666_666).abs() < 1e-4);
    }

    #[test]
    fn no_trades_no_win_rate() {
        let s = Stats::from_tally(10.0, 10.0, 0, 0, None).unwrap();
        assert_eq!(s.trade_count, 0);
        assert!(s.win_rate_pct.is_none());
    }

    #[test]
    fn overflowing_tally_is_rejected() {
        assert!(Stats::from_tally(10.0, 10.0, u64::MAX, 1, None).is_none());
        let s = Stats::from_tally(10.0, 10.0, u64::MAX, 0, None).unwrap();
        assert_eq!(s.trade_count, u64::MAX);
    }

    #[test]
    fn net_profit_falls_back_to_balances() {
        let s = Stats::from_tally(10.0, 12.5, 1, 0, None).unwrap();
        assert!((s.net_profit() - 2.5).abs() < 1e-12);
        let s = Stats::from_tally(10.0, 12.5, 1, 0, Some(2.4)).unwrap();
        assert!((s.net_profit() - 2.4).abs() < 1e-12);
    }
}
