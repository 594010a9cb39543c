//! Bar loader
//!
//! Reads raw OHLCV rows from CSV, deduplicates and sorts them, annotates
//! every derived indicator plus the per-bar confidence scores, and drops the
//! indicator warm-up prefix. The replay engine only ever sees fully warmed,
//! chronologically ordered samples with unique timestamps.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::{FeedConfig, StrategyConfig};
use crate::error::{Error, Result};
use crate::strategy::{RegimeClassifier, Scorer};

use super::indicators;
use super::sample::{MarketSample, RawBar};

/// Small constant under the volume SMA, keeps RVOL finite on dead bars
const VOLUME_EPSILON: f64 = 0.001;

/// CSV feed loader
pub struct FeedLoader {
    feed: FeedConfig,
    scorer: Scorer,
    regimes: RegimeClassifier,
}

impl FeedLoader {
    pub fn new(feed: FeedConfig, strategy: &StrategyConfig) -> Self {
        Self {
            feed,
            scorer: Scorer::new(strategy),
            regimes: RegimeClassifier::new(strategy),
        }
    }

    /// Load and annotate the configured data file
    pub fn load(&self) -> Result<Vec<MarketSample>> {
        let path = Path::new(&self.feed.data_path);
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Feed(format!("cannot open {}: {}", path.display(), e)))?;
        let samples = self.load_from_reader(file)?;
        info!(
            bars = samples.len(),
            path = %path.display(),
            "feed ready"
        );
        Ok(samples)
    }

    /// Load and annotate bars from any CSV reader
    pub fn load_from_reader<R: Read>(&self, reader: R) -> Result<Vec<MarketSample>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut bars: Vec<RawBar> = Vec::new();
        for (idx, record) in csv_reader.deserialize::<RawBar>().enumerate() {
            let bar = record.map_err(|e| Error::MalformedBar {
                line: idx as u64 + 2,
                reason: e.to_string(),
            })?;
            bars.push(bar);
        }

        // Chronological order, duplicates keep the last occurrence. The
        // stable sort leaves later rows later within a timestamp run, so
        // deduplicating the reversed vec keeps them.
        bars.sort_by_key(|b| b.timestamp);
        let before = bars.len();
        bars.reverse();
        bars.dedup_by_key(|b| b.timestamp);
        bars.reverse();
        if bars.len() != before {
            debug!(dropped = before - bars.len(), "dropped duplicate timestamps");
        }

        self.annotate(&bars)
    }

    /// Compute indicators and scores, drop the warm-up prefix
    fn annotate(&self, bars: &[RawBar]) -> Result<Vec<MarketSample>> {
        if bars.is_empty() {
            return Err(Error::EmptyFeed);
        }

        let high: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let low: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let close: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let volume: Vec<f64> = bars.iter().map(|b| b.volume).collect();

        let oscillator = indicators::rsi(&close, self.feed.rsi_length);
        let moving_average = indicators::ema(&close, self.feed.ma_length);
        let histogram = indicators::macd_histogram(
            &close,
            self.feed.macd_fast,
            self.feed.macd_slow,
            self.feed.macd_signal,
        );
        let vwap = indicators::vwap(&high, &low, &close, &volume);
        let atr = indicators::atr(&high, &low, &close, self.feed.atr_length);
        let trend_strength = indicators::adx(&high, &low, &close, self.feed.adx_length);
        let vol_sma = indicators::sma(&volume, self.feed.vol_sma_length);

        let mut samples = Vec::with_capacity(bars.len());
        for (i, bar) in bars.iter().enumerate() {
            let timestamp = DateTime::<Utc>::from_timestamp_millis(bar.timestamp).ok_or(
                Error::MalformedBar {
                    line: i as u64 + 2,
                    reason: format!("timestamp {} out of range", bar.timestamp),
                },
            )?;

            let ma = moving_average[i];
            let mut sample = MarketSample {
                timestamp,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
                oscillator: oscillator[i],
                trend_strength: trend_strength[i],
                moving_average: ma,
                ma_distance_pct: (bar.close - ma) / ma * 100.0,
                volume_ratio: bar.volume / (vol_sma[i] + VOLUME_EPSILON),
                trend_histogram: histogram[i],
                vwap: vwap[i],
                atr: atr[i],
                score_bull: 0.0,
                score_bear: 0.0,
            };

            if sample.is_warm() {
                let profile = self.regimes.classify(sample.trend_strength);
                let scores = self.scorer.score(&sample, profile.regime);
                sample.score_bull = scores.bull;
                sample.score_bear = scores.bear;
                samples.push(sample);
            }
        }

        if samples.is_empty() {
            return Err(Error::EmptyFeed);
        }
        Ok(samples)
    }
}
