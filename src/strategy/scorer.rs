//! Confidence scorer
//!
//! Weighted vote of four binary signals per side. Trend-following signals
//! (moving average, histogram) dominate in a trending regime, the oscillator
//! dominates in a ranging one; the VWAP vote always carries the base weight.

use crate::config::StrategyConfig;
use crate::feed::MarketSample;

use super::types::MarketRegime;

/// Bull and bear confidence, each independently in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorePair {
    pub bull: f64,
    pub bear: f64,
}

/// Confidence scorer
pub struct Scorer {
    oversold: f64,
    overbought: f64,
    trend_weight: f64,
    oscillator_weight: f64,
    base_weight: f64,
}

impl Scorer {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            oversold: config.oscillator_oversold,
            overbought: config.oscillator_overbought,
            trend_weight: config.trend_weight,
            oscillator_weight: config.oscillator_weight,
            base_weight: config.base_weight,
        }
    }

    /// Score both sides of one bar under the given regime
    pub fn score(&self, sample: &MarketSample, regime: MarketRegime) -> ScorePair {
        // Weight assignment inverts between regimes
        let (w_trend, w_osc) = match regime {
            MarketRegime::Trending => (self.trend_weight, self.oscillator_weight),
            MarketRegime::Ranging => (self.oscillator_weight, self.trend_weight),
        };
        let w_base = self.base_weight;
        let total = w_osc + w_trend + w_trend + w_base;

        let vote = |cond: bool| if cond { 1.0 } else { 0.0 };

        let bull_raw = vote(sample.oscillator < self.oversold) * w_osc
            + vote(sample.close > sample.moving_average) * w_trend
            + vote(sample.trend_histogram > 0.0) * w_trend
            + vote(sample.close > sample.vwap) * w_base;

        let bear_raw = vote(sample.oscillator > self.overbought) * w_osc
            + vote(sample.close < sample.moving_average) * w_trend
            + vote(sample.trend_histogram < 0.0) * w_trend
            + vote(sample.close < sample.vwap) * w_base;

        ScorePair {
            bull: bull_raw / total * 100.0,
            bear: bear_raw / total * 100.0,
        }
    }
}
