//! Safety filter
//!
//! Hard rejection gate evaluated before any scoring-based decision is acted
//! on. A rejection short-circuits the bar to Wait; the oracle is never
//! consulted for a rejected bar.

use crate::config::StrategyConfig;
use crate::feed::MarketSample;

use super::types::WaitReason;

/// Hard entry gate
pub struct SafetyFilter {
    min_trend_strength: f64,
    min_volume_ratio: f64,
    max_ma_distance_pct: f64,
}

impl SafetyFilter {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            min_trend_strength: config.min_trend_strength,
            min_volume_ratio: config.min_volume_ratio,
            max_ma_distance_pct: config.max_ma_distance_pct,
        }
    }

    /// Returns the first tripped rejection, or None if the bar is tradable.
    ///
    /// The checks are order-independent; they are listed from cheapest to
    /// most situational.
    pub fn check(&self, sample: &MarketSample) -> Option<WaitReason> {
        if sample.trend_strength < self.min_trend_strength {
            return Some(WaitReason::DirectionlessMarket {
                trend_strength: sample.trend_strength,
            });
        }

        if sample.volume_ratio < self.min_volume_ratio {
            return Some(WaitReason::ThinVolume {
                volume_ratio: sample.volume_ratio,
            });
        }

        if sample.ma_distance_pct.abs() > self.max_ma_distance_pct {
            return Some(WaitReason::Overextended {
                ma_distance_pct: sample.ma_distance_pct,
            });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn filter() -> SafetyFilter {
        SafetyFilter::new(&StrategyConfig::default())
    }

    fn sample(adx: f64, rvol: f64, dist: f64) -> MarketSample {
        MarketSample {
            timestamp: Utc::now(),
            open: 100.0,
            high: 100.0,
            low: 100.0,
            close: 100.0,
            volume: 100.0,
            oscillator: 50.0,
            trend_strength: adx,
            moving_average: 100.0,
            ma_distance_pct: dist,
            volume_ratio: rvol,
            trend_histogram: 0.0,
            vwap: 100.0,
            atr: 1.0,
            score_bull: 0.0,
            score_bear: 0.0,
        }
    }

    #[test]
    fn test_clean_bar_passes() {
        assert_eq!(filter().check(&sample(30.0, 1.0, 0.5)), None);
    }

    #[test]
    fn test_rejects_weak_trend() {
        let reason = filter().check(&sample(19.9, 1.0, 0.5)).unwrap();
        assert!(matches!(reason, WaitReason::DirectionlessMarket { .. }));
    }

    #[test]
    fn test_rejects_thin_volume() {
        let reason = filter().check(&sample(30.0, 0.79, 0.5)).unwrap();
        assert!(matches!(reason, WaitReason::ThinVolume { .. }));
    }

    #[test]
    fn test_rejects_overextension_both_sides() {
        let above = filter().check(&sample(30.0, 1.0, 1.6)).unwrap();
        assert!(matches!(above, WaitReason::Overextended { .. }));

        let below = filter().check(&sample(30.0, 1.0, -1.6)).unwrap();
        assert!(matches!(below, WaitReason::Overextended { .. }));
    }

    #[test]
    fn test_floor_values_pass() {
        // Floors are strict less-than checks
        assert_eq!(filter().check(&sample(20.0, 0.8, 1.5)), None);
    }
}
