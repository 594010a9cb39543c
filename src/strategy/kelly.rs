//! Kelly-style risk sizing
//!
//! Converts a side's confidence score into a win-probability estimate, gates
//! entries on the Kelly edge fraction, and derives position notional under
//! fixed fractional risk and leverage.

use crate::config::RiskConfig;

use super::scorer::ScorePair;
use super::types::{Direction, RiskProfile};

/// Kelly edge fraction f = (p*R - (1-p)) / R
pub fn kelly_fraction(probability: f64, reward_risk: f64) -> f64 {
    let q = 1.0 - probability;
    (probability * reward_risk - q) / reward_risk
}

/// The winning side of a bar, with its edge numbers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideEdge {
    pub direction: Direction,
    pub probability: f64,
    pub kelly_fraction: f64,
}

/// Position sizer
pub struct RiskSizer {
    leverage: f64,
    risk_per_trade: f64,
    min_probability: f64,
    min_risk_adjusted_pct: f64,
}

impl RiskSizer {
    pub fn new(config: &RiskConfig) -> Self {
        Self {
            leverage: config.leverage,
            risk_per_trade: config.risk_per_trade,
            min_probability: config.min_probability,
            min_risk_adjusted_pct: config.min_risk_adjusted_pct,
        }
    }

    /// Pick the eligible side, if any.
    ///
    /// A side qualifies only when its Kelly fraction is positive, its
    /// probability clears the gate, and its score strictly beats the
    /// opposing side. At most one side can satisfy the strict comparison.
    pub fn select_side(&self, scores: &ScorePair, profile: &RiskProfile) -> Option<SideEdge> {
        let r = profile.reward_risk();

        let bull_p = scores.bull / 100.0;
        let bull_f = kelly_fraction(bull_p, r);
        if bull_f > 0.0 && bull_p > self.min_probability && scores.bull > scores.bear {
            return Some(SideEdge {
                direction: Direction::Long,
                probability: bull_p,
                kelly_fraction: bull_f,
            });
        }

        let bear_p = scores.bear / 100.0;
        let bear_f = kelly_fraction(bear_p, r);
        if bear_f > 0.0 && bear_p > self.min_probability && scores.bear > scores.bull {
            return Some(SideEdge {
                direction: Direction::Short,
                probability: bear_p,
                kelly_fraction: bear_f,
            });
        }

        None
    }

    /// Notional size for an entry at `entry_price` with the given stop
    /// distance in price units. Never exceeds the current balance.
    pub fn notional(&self, balance: f64, entry_price: f64, stop_distance: f64) -> f64 {
        let sl_pct = stop_distance / entry_price;
        // Floor the leveraged stop distance so a degenerate ATR cannot blow
        // the division up
        let risk_adjusted_pct = (sl_pct * self.leverage).max(self.min_risk_adjusted_pct);
        let size = (balance * self.risk_per_trade) / risk_adjusted_pct;
        size.min(balance)
    }

    pub fn leverage(&self) -> f64 {
        self.leverage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::types::MarketRegime;
    use approx::assert_relative_eq;

    fn trending() -> RiskProfile {
        RiskProfile {
            regime: MarketRegime::Trending,
            tp_mult: 3.0,
            sl_mult: 1.5,
        }
    }

    #[test]
    fn test_kelly_fraction_values() {
        // p=0.7, R=2.0 => (1.4 - 0.3) / 2 = 0.55
        assert_relative_eq!(kelly_fraction(0.7, 2.0), 0.55);
        // p=0.4, R=2.0 => (0.8 - 0.6) / 2 = 0.1
        assert_relative_eq!(kelly_fraction(0.4, 2.0), 0.1, epsilon = 1e-12);
        // p=0.3, R=1.0 => negative edge
        assert!(kelly_fraction(0.3, 1.0) < 0.0);
    }

    #[test]
    fn test_probability_gate_rejects_positive_kelly() {
        // p=0.4 has a positive Kelly fraction at R=2 but fails the p>0.5 gate
        let sizer = RiskSizer::new(&RiskConfig::default());
        let scores = ScorePair {
            bull: 40.0,
            bear: 10.0,
        };
        assert_eq!(sizer.select_side(&scores, &trending()), None);
    }

    #[test]
    fn test_selects_dominant_bull() {
        let sizer = RiskSizer::new(&RiskConfig::default());
        let scores = ScorePair {
            bull: 70.0,
            bear: 20.0,
        };
        let edge = sizer.select_side(&scores, &trending()).unwrap();
        assert_eq!(edge.direction, Direction::Long);
        assert_relative_eq!(edge.probability, 0.7);
        assert_relative_eq!(edge.kelly_fraction, 0.55);
    }

    #[test]
    fn test_selects_dominant_bear() {
        let sizer = RiskSizer::new(&RiskConfig::default());
        let scores = ScorePair {
            bull: 20.0,
            bear: 80.0,
        };
        let edge = sizer.select_side(&scores, &trending()).unwrap();
        assert_eq!(edge.direction, Direction::Short);
    }

    #[test]
    fn test_tied_scores_select_nothing() {
        // Strict comparison: a tie never qualifies either side
        let sizer = RiskSizer::new(&RiskConfig::default());
        let scores = ScorePair {
            bull: 70.0,
            bear: 70.0,
        };
        assert_eq!(sizer.select_side(&scores, &trending()), None);
    }

    #[test]
    fn test_notional_never_exceeds_balance() {
        for leverage in [1.0, 5.0, 20.0, 100.0] {
            for risk in [0.005, 0.02, 0.1] {
                let sizer = RiskSizer::new(&RiskConfig {
                    leverage,
                    risk_per_trade: risk,
                    ..RiskConfig::default()
                });
                for stop_distance in [0.0, 0.5, 3.0, 50.0] {
                    let size = sizer.notional(10_000.0, 100.0, stop_distance);
                    assert!(size <= 10_000.0, "size {} over balance", size);
                    assert!(size >= 0.0);
                }
            }
        }
    }

    #[test]
    fn test_notional_floors_zero_stop_distance() {
        let sizer = RiskSizer::new(&RiskConfig::default());
        // Zero stop distance hits the epsilon floor instead of dividing by 0
        let size = sizer.notional(10_000.0, 100.0, 0.0);
        assert_relative_eq!(size, 10_000.0 * 0.02 / 0.01);
        assert!(size.is_finite());
    }

    #[test]
    fn test_notional_fixed_fraction() {
        let sizer = RiskSizer::new(&RiskConfig::default());
        // sl_pct = 3/100 = 0.03, leveraged = 0.6, size = 200 / 0.6
        let size = sizer.notional(10_000.0, 100.0, 3.0);
        assert_relative_eq!(size, 10_000.0 * 0.02 / 0.6, epsilon = 1e-9);
    }
}
