//! Decision oracle
//!
//! A qualitative second judge consulted only after every deterministic gate
//! has passed. The oracle's loosely-typed response is mapped at this
//! boundary into the closed [`TradeAction`] variant; anything unrecognized
//! counts as a failed call subject to the rotation policy.

pub mod gemini;
pub mod rotation;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::feed::MarketSample;
use crate::strategy::{EntryCandidate, TradeAction};

pub use gemini::GeminiOracle;
pub use rotation::KeyPool;

/// Sample snapshot plus candidate context sent to the oracle
#[derive(Debug, Clone, Copy)]
pub struct OracleRequest<'a> {
    pub symbol: &'a str,
    pub sample: &'a MarketSample,
    pub candidate: &'a EntryCandidate,
}

/// Oracle response mapped into the closed action variant
#[derive(Debug, Clone, PartialEq)]
pub struct OracleVerdict {
    pub action: TradeAction,
    pub reason: String,
}

/// Second-opinion judge for confirmed entries
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    async fn judge(&self, request: &OracleRequest<'_>) -> Result<OracleVerdict>;
}

/// Oracle used when `oracle.enabled = false`: approves every deterministic
/// candidate so replays can run without credentials.
pub struct PassthroughOracle;

#[async_trait]
impl DecisionOracle for PassthroughOracle {
    async fn judge(&self, request: &OracleRequest<'_>) -> Result<OracleVerdict> {
        Ok(OracleVerdict {
            action: request.candidate.direction.as_action(),
            reason: "oracle disabled".to_string(),
        })
    }
}

/// Parse a raw oracle reply into a verdict.
///
/// Models love wrapping JSON in markdown fences, so those are stripped
/// before parsing. An action string outside {BUY, SELL, WAIT} is a failure,
/// not a Wait.
pub fn parse_verdict(raw: &str) -> Result<OracleVerdict> {
    #[derive(serde::Deserialize)]
    struct LooseVerdict {
        action: String,
        #[serde(default)]
        reason: Option<String>,
    }

    let cleaned = raw
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let loose: LooseVerdict = serde_json::from_str(cleaned)
        .map_err(|e| Error::OracleUnparsable(format!("{}: {}", e, cleaned)))?;

    let action = match loose.action.trim().to_uppercase().as_str() {
        "BUY" => TradeAction::Buy,
        "SELL" => TradeAction::Sell,
        "WAIT" => TradeAction::Wait,
        other => {
            return Err(Error::OracleUnparsable(format!(
                "unrecognized action: {}",
                other
            )))
        }
    };

    Ok(OracleVerdict {
        action,
        reason: loose.reason.unwrap_or_else(|| "N/A".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let verdict = parse_verdict(r#"{"action": "BUY", "reason": "score edge"}"#).unwrap();
        assert_eq!(verdict.action, TradeAction::Buy);
        assert_eq!(verdict.reason, "score edge");
    }

    #[test]
    fn test_parse_fenced_json() {
        let raw = "```json\n{\"action\": \"WAIT\", \"reason\": \"mixed\"}\n```";
        let verdict = parse_verdict(raw).unwrap();
        assert_eq!(verdict.action, TradeAction::Wait);
    }

    #[test]
    fn test_parse_lowercase_action() {
        let verdict = parse_verdict(r#"{"action": "sell"}"#).unwrap();
        assert_eq!(verdict.action, TradeAction::Sell);
        assert_eq!(verdict.reason, "N/A");
    }

    #[test]
    fn test_unrecognized_action_is_failure() {
        let err = parse_verdict(r#"{"action": "HOLD", "reason": "?"}"#).unwrap_err();
        assert!(matches!(err, Error::OracleUnparsable(_)));
    }

    #[test]
    fn test_garbage_is_failure() {
        assert!(parse_verdict("I think you should buy!").is_err());
    }

    #[tokio::test]
    async fn test_passthrough_echoes_candidate() {
        use crate::strategy::{Direction, MarketRegime, RiskProfile};
        use chrono::Utc;

        let sample = MarketSample {
            timestamp: Utc::now(),
            open: 100.0,
            high: 100.0,
            low: 100.0,
            close: 100.0,
            volume: 1.0,
            oscillator: 50.0,
            trend_strength: 30.0,
            moving_average: 100.0,
            ma_distance_pct: 0.0,
            volume_ratio: 1.0,
            trend_histogram: 0.0,
            vwap: 100.0,
            atr: 1.0,
            score_bull: 0.0,
            score_bear: 0.0,
        };
        let candidate = EntryCandidate {
            direction: Direction::Short,
            profile: RiskProfile {
                regime: MarketRegime::Trending,
                tp_mult: 3.0,
                sl_mult: 1.5,
            },
            kelly_fraction: 0.5,
            probability: 0.75,
            notional: 100.0,
            stop_loss: 103.0,
            take_profit: 94.0,
        };
        let request = OracleRequest {
            symbol: "BTC/USDT",
            sample: &sample,
            candidate: &candidate,
        };

        let verdict = PassthroughOracle.judge(&request).await.unwrap();
        assert_eq!(verdict.action, TradeAction::Sell);
    }
}
