//! Ledger
//!
//! Running balance, ordered trade outcomes, and the structured loss records
//! exported at the end of a run. Only the position state machine mutates the
//! balance, and only on closure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::strategy::{Direction, MarketRegime};

/// Outcome tag for one closed trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeOutcome {
    Win,
    Loss,
}

/// Structured record of a stop-loss closure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossRecord {
    pub time: DateTime<Utc>,
    pub direction: Direction,
    pub entry_price: f64,
    pub exit_price: f64,
    /// Realized leveraged P&L of the losing trade (negative)
    pub loss_amount: f64,
    pub reason: String,
    pub regime_mode: MarketRegime,
}

/// End-of-run statistics
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub initial_balance: f64,
    pub final_balance: f64,
    pub trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate_pct: f64,
}

/// Balance and trade history
#[derive(Debug, Clone)]
pub struct Ledger {
    initial_balance: f64,
    balance: f64,
    outcomes: Vec<TradeOutcome>,
    loss_records: Vec<LossRecord>,
}

impl Ledger {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            initial_balance,
            balance: initial_balance,
            outcomes: Vec::new(),
            loss_records: Vec::new(),
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Apply a closed trade's realized P&L and tag the outcome
    pub fn settle(&mut self, pnl: f64) {
        self.balance += pnl;
        self.outcomes.push(if pnl >= 0.0 {
            TradeOutcome::Win
        } else {
            TradeOutcome::Loss
        });
    }

    /// Append a structured record for a stop-loss closure
    pub fn record_loss(&mut self, record: LossRecord) {
        self.loss_records.push(record);
    }

    pub fn outcomes(&self) -> &[TradeOutcome] {
        &self.outcomes
    }

    pub fn loss_records(&self) -> &[LossRecord] {
        &self.loss_records
    }

    pub fn summary(&self) -> RunSummary {
        let trades = self.outcomes.len();
        let wins = self
            .outcomes
            .iter()
            .filter(|o| **o == TradeOutcome::Win)
            .count();
        let losses = trades - wins;
        let win_rate_pct = if trades == 0 {
            0.0
        } else {
            wins as f64 / trades as f64 * 100.0
        };
        RunSummary {
            initial_balance: self.initial_balance,
            final_balance: self.balance,
            trades,
            wins,
            losses,
            win_rate_pct,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_settle_updates_balance_and_tags() {
        let mut ledger = Ledger::new(10_000.0);
        ledger.settle(600.0);
        ledger.settle(-300.0);
        ledger.settle(150.0);

        assert_relative_eq!(ledger.balance(), 10_450.0);
        assert_eq!(
            ledger.outcomes(),
            &[TradeOutcome::Win, TradeOutcome::Loss, TradeOutcome::Win]
        );
    }

    #[test]
    fn test_summary_win_rate() {
        let mut ledger = Ledger::new(10_000.0);
        ledger.settle(100.0);
        ledger.settle(-50.0);
        ledger.settle(100.0);

        let summary = ledger.summary();
        assert_eq!(summary.trades, 3);
        assert_eq!(summary.wins, 2);
        assert_eq!(summary.losses, 1);
        assert_relative_eq!(summary.win_rate_pct, 200.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_ledger_summary() {
        let summary = Ledger::new(5_000.0).summary();
        assert_eq!(summary.trades, 0);
        assert_relative_eq!(summary.win_rate_pct, 0.0);
        assert_relative_eq!(summary.final_balance, 5_000.0);
    }

    #[test]
    fn test_loss_records_are_ordered() {
        let mut ledger = Ledger::new(10_000.0);
        for i in 0..3 {
            ledger.record_loss(LossRecord {
                time: Utc::now(),
                direction: Direction::Long,
                entry_price: 100.0 + i as f64,
                exit_price: 97.0,
                loss_amount: -300.0,
                reason: format!("loss {}", i),
                regime_mode: MarketRegime::Trending,
            });
        }
        let entries: Vec<f64> = ledger.loss_records().iter().map(|r| r.entry_price).collect();
        assert_eq!(entries, vec![100.0, 101.0, 102.0]);
    }
}
