//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub strategy: StrategyConfig,
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Market data feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Path to the OHLCV CSV file to replay
    #[serde(default = "default_data_path")]
    pub data_path: String,
    /// Symbol label used in logs and notifications
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_ma_length")]
    pub ma_length: usize,
    #[serde(default = "default_rsi_length")]
    pub rsi_length: usize,
    #[serde(default = "default_atr_length")]
    pub atr_length: usize,
    #[serde(default = "default_adx_length")]
    pub adx_length: usize,
    #[serde(default = "default_vol_sma_length")]
    pub vol_sma_length: usize,
    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,
    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,
    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,
}

fn default_data_path() -> String {
    "data/ohlcv.csv".to_string()
}
fn default_symbol() -> String {
    "BTC/USDT".to_string()
}
fn default_ma_length() -> usize {
    200
}
fn default_rsi_length() -> usize {
    14
}
fn default_atr_length() -> usize {
    14
}
fn default_adx_length() -> usize {
    14
}
fn default_vol_sma_length() -> usize {
    20
}
fn default_macd_fast() -> usize {
    12
}
fn default_macd_slow() -> usize {
    26
}
fn default_macd_signal() -> usize {
    9
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            data_path: default_data_path(),
            symbol: default_symbol(),
            ma_length: default_ma_length(),
            rsi_length: default_rsi_length(),
            atr_length: default_atr_length(),
            adx_length: default_adx_length(),
            vol_sma_length: default_vol_sma_length(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
        }
    }
}

/// Scoring, regime and safety-filter thresholds.
///
/// Every value here drifted between historical iterations of the strategy,
/// so none of them are hard-coded anywhere else.
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    /// ADX strictly above this is a trending market
    #[serde(default = "default_trend_threshold")]
    pub trend_threshold: f64,
    /// Take-profit ATR multiple in a trending regime
    #[serde(default = "default_trending_tp_mult")]
    pub trending_tp_mult: f64,
    /// Stop-loss ATR multiple in a trending regime
    #[serde(default = "default_trending_sl_mult")]
    pub trending_sl_mult: f64,
    /// Take-profit ATR multiple in a ranging regime
    #[serde(default = "default_ranging_tp_mult")]
    pub ranging_tp_mult: f64,
    /// Stop-loss ATR multiple in a ranging regime
    #[serde(default = "default_ranging_sl_mult")]
    pub ranging_sl_mult: f64,

    /// RSI below this votes bullish
    #[serde(default = "default_oversold")]
    pub oscillator_oversold: f64,
    /// RSI above this votes bearish
    #[serde(default = "default_overbought")]
    pub oscillator_overbought: f64,
    /// Weight for trend-following signals in their favored regime
    #[serde(default = "default_trend_weight")]
    pub trend_weight: f64,
    /// Weight for the oscillator signal in its disfavored regime
    #[serde(default = "default_oscillator_weight")]
    pub oscillator_weight: f64,
    /// Weight the VWAP signal carries in every regime
    #[serde(default = "default_base_weight")]
    pub base_weight: f64,

    /// Minimum ADX for any entry (directionless market below)
    #[serde(default = "default_min_trend_strength")]
    pub min_trend_strength: f64,
    /// Minimum relative volume for any entry
    #[serde(default = "default_min_volume_ratio")]
    pub min_volume_ratio: f64,
    /// Maximum |price-to-MA distance| percent before overextension rejection
    #[serde(default = "default_max_ma_distance_pct")]
    pub max_ma_distance_pct: f64,
}

fn default_trend_threshold() -> f64 {
    25.0
}
fn default_trending_tp_mult() -> f64 {
    3.0
}
fn default_trending_sl_mult() -> f64 {
    1.5
}
fn default_ranging_tp_mult() -> f64 {
    1.2
}
fn default_ranging_sl_mult() -> f64 {
    1.0
}
fn default_oversold() -> f64 {
    45.0
}
fn default_overbought() -> f64 {
    55.0
}
fn default_trend_weight() -> f64 {
    2.0
}
fn default_oscillator_weight() -> f64 {
    0.5
}
fn default_base_weight() -> f64 {
    1.0
}
fn default_min_trend_strength() -> f64 {
    20.0
}
fn default_min_volume_ratio() -> f64 {
    0.8
}
fn default_max_ma_distance_pct() -> f64 {
    1.5
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            trend_threshold: default_trend_threshold(),
            trending_tp_mult: default_trending_tp_mult(),
            trending_sl_mult: default_trending_sl_mult(),
            ranging_tp_mult: default_ranging_tp_mult(),
            ranging_sl_mult: default_ranging_sl_mult(),
            oscillator_oversold: default_oversold(),
            oscillator_overbought: default_overbought(),
            trend_weight: default_trend_weight(),
            oscillator_weight: default_oscillator_weight(),
            base_weight: default_base_weight(),
            min_trend_strength: default_min_trend_strength(),
            min_volume_ratio: default_min_volume_ratio(),
            max_ma_distance_pct: default_max_ma_distance_pct(),
        }
    }
}

/// Capital and sizing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RiskConfig {
    #[serde(default = "default_initial_balance")]
    pub initial_balance: f64,
    #[serde(default = "default_leverage")]
    pub leverage: f64,
    /// Fraction of balance risked per trade
    #[serde(default = "default_risk_per_trade")]
    pub risk_per_trade: f64,
    /// Probability gate: a side needs p strictly above this
    #[serde(default = "default_min_probability")]
    pub min_probability: f64,
    /// Floor for leveraged stop distance, avoids division blow-up
    #[serde(default = "default_min_risk_adjusted_pct")]
    pub min_risk_adjusted_pct: f64,
}

fn default_initial_balance() -> f64 {
    10_000.0
}
fn default_leverage() -> f64 {
    20.0
}
fn default_risk_per_trade() -> f64 {
    0.02
}
fn default_min_probability() -> f64 {
    0.5
}
fn default_min_risk_adjusted_pct() -> f64 {
    0.01
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            initial_balance: default_initial_balance(),
            leverage: default_leverage(),
            risk_per_trade: default_risk_per_trade(),
            min_probability: default_min_probability(),
            min_risk_adjusted_pct: default_min_risk_adjusted_pct(),
        }
    }
}

/// Decision oracle configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    /// When false the gate approves deterministic candidates without the oracle
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Environment variable holding the comma-separated API key pool
    #[serde(default = "default_keys_env")]
    pub keys_env: String,
    #[serde(default = "default_oracle_base_url")]
    pub base_url: String,
    /// Force a specific model instead of probing the listing
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_oracle_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}
fn default_keys_env() -> String {
    "GEMINI_KEYS".to_string()
}
fn default_oracle_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_oracle_timeout_secs() -> u64 {
    15
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            keys_env: default_keys_env(),
            base_url: default_oracle_base_url(),
            model: None,
            timeout_secs: default_oracle_timeout_secs(),
        }
    }
}

/// Notification sink configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    /// Discord webhook URL; empty disables notifications
    #[serde(default)]
    pub webhook_url: String,
    #[serde(default = "default_notify_username")]
    pub username: String,
}

fn default_notify_username() -> String {
    "kellytrader".to_string()
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            username: default_notify_username(),
        }
    }
}

/// End-of-run export configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_loss_report_path")]
    pub loss_report_path: String,
}

fn default_loss_report_path() -> String {
    "losing_trades.json".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            loss_report_path: default_loss_report_path(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix KELLYTRADER_)
            .add_source(
                config::Environment::with_prefix("KELLYTRADER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.risk.initial_balance <= 0.0 {
            anyhow::bail!("initial_balance must be positive");
        }

        if self.risk.leverage < 1.0 {
            anyhow::bail!("leverage must be at least 1");
        }

        if self.risk.risk_per_trade <= 0.0 || self.risk.risk_per_trade >= 1.0 {
            anyhow::bail!("risk_per_trade must be between 0 and 1");
        }

        if self.risk.min_risk_adjusted_pct <= 0.0 {
            anyhow::bail!("min_risk_adjusted_pct must be positive");
        }

        if self.strategy.trending_sl_mult <= 0.0 || self.strategy.ranging_sl_mult <= 0.0 {
            anyhow::bail!("stop-loss multiples must be positive");
        }

        if self.strategy.oscillator_oversold > self.strategy.oscillator_overbought {
            anyhow::bail!(
                "oscillator_oversold {} cannot exceed oscillator_overbought {}",
                self.strategy.oscillator_oversold,
                self.strategy.oscillator_overbought
            );
        }

        if self.strategy.max_ma_distance_pct <= 0.0 {
            anyhow::bail!("max_ma_distance_pct must be positive");
        }

        if self.feed.ma_length == 0 || self.feed.rsi_length == 0 || self.feed.atr_length == 0 {
            anyhow::bail!("indicator lengths must be positive");
        }

        if self.feed.macd_fast >= self.feed.macd_slow {
            anyhow::bail!(
                "macd_fast {} must be shorter than macd_slow {}",
                self.feed.macd_fast,
                self.feed.macd_slow
            );
        }

        Ok(())
    }

    /// Get masked configuration for display (hide secrets)
    pub fn masked_display(&self) -> String {
        format!(
            r#"Configuration:
  Feed:
    data: {}
    symbol: {}
    ma_length: {}
  Strategy:
    trend_threshold: {}
    trending multiples: ({}, {})
    ranging multiples: ({}, {})
    safety: adx>={} rvol>={} |dist|<={}%
  Risk:
    balance: {}
    leverage: {}x
    risk_per_trade: {}
  Oracle:
    enabled: {}
    keys: {}
    model: {}
  Notify:
    webhook: {}
  Export:
    loss_report: {}
"#,
            self.feed.data_path,
            self.feed.symbol,
            self.feed.ma_length,
            self.strategy.trend_threshold,
            self.strategy.trending_tp_mult,
            self.strategy.trending_sl_mult,
            self.strategy.ranging_tp_mult,
            self.strategy.ranging_sl_mult,
            self.strategy.min_trend_strength,
            self.strategy.min_volume_ratio,
            self.strategy.max_ma_distance_pct,
            self.risk.initial_balance,
            self.risk.leverage,
            self.risk.risk_per_trade,
            self.oracle.enabled,
            if std::env::var(&self.oracle.keys_env).is_ok() {
                "***"
            } else {
                "(not set)"
            },
            self.oracle.model.as_deref().unwrap_or("(auto)"),
            if self.notify.webhook_url.is_empty() {
                "(not set)"
            } else {
                "***"
            },
            self.export.loss_report_path,
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            strategy: StrategyConfig::default(),
            risk: RiskConfig::default(),
            oracle: OracleConfig::default(),
            notify: NotifyConfig::default(),
            export: ExportConfig::default(),
        }
    }
}
