//! Shared types for the decision pipeline

use serde::{Deserialize, Serialize};

/// Position direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Price-difference sign for P&L math
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    /// The trade action that opens a position in this direction
    pub fn as_action(&self) -> TradeAction {
        match self {
            Direction::Long => TradeAction::Buy,
            Direction::Short => TradeAction::Sell,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// Closed trade-action variant the oracle's loose response is mapped into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
    Wait,
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
            TradeAction::Wait => write!(f, "WAIT"),
        }
    }
}

/// Market regime classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketRegime {
    Trending,
    Ranging,
}

impl std::fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketRegime::Trending => write!(f, "Trending"),
            MarketRegime::Ranging => write!(f, "Ranging"),
        }
    }
}

/// Regime plus the exit multiples it selects
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub regime: MarketRegime,
    pub tp_mult: f64,
    pub sl_mult: f64,
}

impl RiskProfile {
    /// Reward:risk ratio R used by the Kelly fraction
    pub fn reward_risk(&self) -> f64 {
        self.tp_mult / self.sl_mult
    }
}

/// Machine-readable reason the pipeline produced no entry on a bar
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitReason {
    /// Trend strength below the hard floor
    DirectionlessMarket { trend_strength: f64 },
    /// Relative volume below the hard floor
    ThinVolume { volume_ratio: f64 },
    /// Price too far from the moving average
    Overextended { ma_distance_pct: f64 },
    /// No side cleared the Kelly / probability / score gates
    NoEdge,
    /// Candidate direction contradicts the price/MA relationship
    CounterTrend { direction: Direction },
    /// Oracle returned a different action than the candidate
    OracleDisagreed { oracle_action: TradeAction },
    /// Oracle retry/rotation policy exhausted
    OracleUnavailable,
}

impl std::fmt::Display for WaitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaitReason::DirectionlessMarket { trend_strength } => {
                write!(f, "directionless market (ADX {:.1})", trend_strength)
            }
            WaitReason::ThinVolume { volume_ratio } => {
                write!(f, "thin volume (RVOL {:.2})", volume_ratio)
            }
            WaitReason::Overextended { ma_distance_pct } => {
                write!(f, "overextended ({:.2}% from MA)", ma_distance_pct)
            }
            WaitReason::NoEdge => write!(f, "no edge"),
            WaitReason::CounterTrend { direction } => {
                write!(f, "counter-trend {} vetoed", direction)
            }
            WaitReason::OracleDisagreed { oracle_action } => {
                write!(f, "oracle said {}", oracle_action)
            }
            WaitReason::OracleUnavailable => write!(f, "all endpoints failed"),
        }
    }
}

/// Deterministic entry candidate, pre oracle confirmation
#[derive(Debug, Clone, PartialEq)]
pub struct EntryCandidate {
    pub direction: Direction,
    pub profile: RiskProfile,
    /// Kelly edge fraction of the winning side
    pub kelly_fraction: f64,
    /// Win probability estimate derived from the score
    pub probability: f64,
    /// Position notional, already capped at balance
    pub notional: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// Outcome of the deterministic pipeline for one bar
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Enter(EntryCandidate),
    Wait(WaitReason),
}

impl Signal {
    pub fn is_wait(&self) -> bool {
        matches!(self, Signal::Wait(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_sign() {
        assert_eq!(Direction::Long.sign(), 1.0);
        assert_eq!(Direction::Short.sign(), -1.0);
    }

    #[test]
    fn test_direction_to_action() {
        assert_eq!(Direction::Long.as_action(), TradeAction::Buy);
        assert_eq!(Direction::Short.as_action(), TradeAction::Sell);
    }

    #[test]
    fn test_trade_action_deserialize_uppercase() {
        let action: TradeAction = serde_json::from_str(r#""BUY""#).unwrap();
        assert_eq!(action, TradeAction::Buy);
        assert!(serde_json::from_str::<TradeAction>(r#""HOLD""#).is_err());
    }

    #[test]
    fn test_reward_risk() {
        let profile = RiskProfile {
            regime: MarketRegime::Trending,
            tp_mult: 3.0,
            sl_mult: 1.5,
        };
        assert_eq!(profile.reward_risk(), 2.0);
    }
}
