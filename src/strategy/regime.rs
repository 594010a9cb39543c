//! Regime classifier
//!
//! Maps trend strength into a Trending/Ranging label and the take-profit /
//! stop-loss multiples that regime trades with.

use crate::config::StrategyConfig;

use super::types::{MarketRegime, RiskProfile};

/// Regime classifier
pub struct RegimeClassifier {
    /// ADX strictly above this is trending
    trend_threshold: f64,
    trending_tp_mult: f64,
    trending_sl_mult: f64,
    ranging_tp_mult: f64,
    ranging_sl_mult: f64,
}

impl RegimeClassifier {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            trend_threshold: config.trend_threshold,
            trending_tp_mult: config.trending_tp_mult,
            trending_sl_mult: config.trending_sl_mult,
            ranging_tp_mult: config.ranging_tp_mult,
            ranging_sl_mult: config.ranging_sl_mult,
        }
    }

    /// Classify a bar's trend strength.
    ///
    /// The boundary is strict: trend strength exactly at the threshold is
    /// Ranging.
    pub fn classify(&self, trend_strength: f64) -> RiskProfile {
        if trend_strength > self.trend_threshold {
            RiskProfile {
                regime: MarketRegime::Trending,
                tp_mult: self.trending_tp_mult,
                sl_mult: self.trending_sl_mult,
            }
        } else {
            RiskProfile {
                regime: MarketRegime::Ranging,
                tp_mult: self.ranging_tp_mult,
                sl_mult: self.ranging_sl_mult,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> RegimeClassifier {
        RegimeClassifier::new(&StrategyConfig::default())
    }

    #[test]
    fn test_trending_above_threshold() {
        let profile = classifier().classify(25.1);
        assert_eq!(profile.regime, MarketRegime::Trending);
        assert_eq!(profile.tp_mult, 3.0);
        assert_eq!(profile.sl_mult, 1.5);
    }

    #[test]
    fn test_exactly_at_threshold_is_ranging() {
        let profile = classifier().classify(25.0);
        assert_eq!(profile.regime, MarketRegime::Ranging);
        assert_eq!(profile.tp_mult, 1.2);
        assert_eq!(profile.sl_mult, 1.0);
    }

    #[test]
    fn test_weak_trend_is_ranging() {
        let profile = classifier().classify(10.0);
        assert_eq!(profile.regime, MarketRegime::Ranging);
    }
}
