//! Position record and exit math
//!
//! At most one position is live at any time. Stop-loss and take-profit are
//! placed from the entry price and ATR scaled by the regime's multiples, and
//! tested against every bar's close.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::strategy::{Direction, MarketRegime, RiskProfile};

/// Which exit level a bar crossed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    StopLoss,
    TakeProfit,
}

/// A single open position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    /// Notional size, at most the balance at entry time
    pub size: f64,
    /// Opening rationale (Kelly fraction plus oracle reason)
    pub reason: String,
    /// Regime the entry was taken under
    pub regime_mode: MarketRegime,
    pub opened_at: DateTime<Utc>,
}

impl Position {
    /// Open a position with exits placed at entry -/+ ATR * multiple.
    ///
    /// Per direction the stop-loss sits strictly on the loss side of entry
    /// and the take-profit on the profit side.
    pub fn open(
        direction: Direction,
        entry_price: f64,
        atr: f64,
        profile: &RiskProfile,
        size: f64,
        reason: String,
        opened_at: DateTime<Utc>,
    ) -> Self {
        let sl_dist = atr * profile.sl_mult;
        let tp_dist = atr * profile.tp_mult;
        let (stop_loss, take_profit) = match direction {
            Direction::Long => (entry_price - sl_dist, entry_price + tp_dist),
            Direction::Short => (entry_price + sl_dist, entry_price - tp_dist),
        };

        Self {
            direction,
            entry_price,
            stop_loss,
            take_profit,
            size,
            reason,
            regime_mode: profile.regime,
            opened_at,
        }
    }

    /// Leveraged realized P&L if closed at `exit_price`
    pub fn pnl_at(&self, exit_price: f64, leverage: f64) -> f64 {
        let diff = (exit_price - self.entry_price) * self.direction.sign();
        self.size * (diff / self.entry_price) * leverage
    }

    /// Exit-crossing test for one bar.
    ///
    /// The stop-loss is evaluated first by contract: if a bar gaps through
    /// both levels, the conservative outcome is the stop.
    pub fn check_exit(&self, price: f64) -> Option<ExitKind> {
        let stopped = match self.direction {
            Direction::Long => price <= self.stop_loss,
            Direction::Short => price >= self.stop_loss,
        };
        if stopped {
            return Some(ExitKind::StopLoss);
        }

        let took_profit = match self.direction {
            Direction::Long => price >= self.take_profit,
            Direction::Short => price <= self.take_profit,
        };
        if took_profit {
            return Some(ExitKind::TakeProfit);
        }

        None
    }
}
