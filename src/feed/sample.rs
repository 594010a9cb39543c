//! Market sample record
//!
//! One bar of the replay stream: raw OHLCV plus every derived indicator the
//! decision pipeline reads. Built once by the loader, immutable afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One fully annotated bar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSample {
    /// Bar open time, strictly increasing across the stream
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,

    /// Bounded momentum oscillator (RSI)
    pub oscillator: f64,
    /// Trend-strength indicator (ADX)
    pub trend_strength: f64,
    /// Moving-average reference (EMA)
    pub moving_average: f64,
    /// (close - MA) / MA * 100; positive above the average
    pub ma_distance_pct: f64,
    /// Volume relative to its rolling average
    pub volume_ratio: f64,
    /// Trend-direction histogram (MACD histogram)
    pub trend_histogram: f64,
    /// Volume-weighted average price
    pub vwap: f64,
    /// Volatility range (ATR)
    pub atr: f64,

    /// Bullish confidence score in [0, 100]
    pub score_bull: f64,
    /// Bearish confidence score in [0, 100]
    pub score_bear: f64,
}

impl MarketSample {
    /// True when every derived field is a finite number.
    ///
    /// The loader uses this to drop the indicator warm-up prefix.
    pub fn is_warm(&self) -> bool {
        [
            self.oscillator,
            self.trend_strength,
            self.moving_average,
            self.ma_distance_pct,
            self.volume_ratio,
            self.trend_histogram,
            self.vwap,
            self.atr,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Raw OHLCV row as parsed from the CSV source
#[derive(Debug, Clone, Deserialize)]
pub struct RawBar {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_with(trend_strength: f64, close: f64) -> MarketSample {
        MarketSample {
            timestamp: Utc::now(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 100.0,
            oscillator: 50.0,
            trend_strength,
            moving_average: close,
            ma_distance_pct: 0.0,
            volume_ratio: 1.0,
            trend_histogram: 0.0,
            vwap: close,
            atr: 1.0,
            score_bull: 0.0,
            score_bear: 0.0,
        }
    }

    #[test]
    fn test_warm_sample() {
        let sample = sample_with(30.0, 100.0);
        assert!(sample.is_warm());
    }

    #[test]
    fn test_cold_sample() {
        let mut sample = sample_with(30.0, 100.0);
        sample.atr = f64::NAN;
        assert!(!sample.is_warm());
    }
}
