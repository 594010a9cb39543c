//! Gemini oracle client
//!
//! Calls the Google Generative Language `generateContent` endpoint with a
//! per-bar prompt and maps the reply into a verdict. Every failure rotates
//! to the next key; the attempt budget equals the pool size.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::OracleConfig;
use crate::error::{Error, Result};

use super::rotation::KeyPool;
use super::{parse_verdict, DecisionOracle, OracleRequest, OracleVerdict};

#[derive(Debug, Deserialize)]
struct ModelListing {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelEntry {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// Gemini-backed decision oracle
pub struct GeminiOracle {
    client: reqwest::Client,
    base_url: String,
    model_override: Option<String>,
    pool: Mutex<KeyPool>,
    /// Model picked by the listing probe, cached per run
    model_cache: Mutex<Option<String>>,
}

impl GeminiOracle {
    pub fn new(config: &OracleConfig) -> Result<Self> {
        let pool = KeyPool::from_env(&config.keys_env)?;
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::OracleTransport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            model_override: config.model.clone(),
            pool: Mutex::new(pool),
            model_cache: Mutex::new(None),
        })
    }

    /// Pick a usable model for the given key, preferring flash over pro
    async fn pick_model(&self, key: &str) -> Result<String> {
        if let Some(model) = &self.model_override {
            return Ok(model.clone());
        }
        if let Some(model) = self.model_cache.lock().await.clone() {
            return Ok(model);
        }

        let url = format!("{}/models?key={}", self.base_url, key);
        let listing: ModelListing = self.client.get(&url).send().await?.json().await?;

        let usable: Vec<String> = listing
            .models
            .into_iter()
            .filter(|m| {
                m.supported_generation_methods
                    .iter()
                    .any(|method| method == "generateContent")
            })
            .map(|m| m.name.trim_start_matches("models/").to_string())
            .collect();

        let picked = usable
            .iter()
            .find(|name| name.contains("flash"))
            .or_else(|| usable.iter().find(|name| name.contains("pro")))
            .or_else(|| usable.first())
            .cloned()
            .ok_or_else(|| Error::OracleTransport("no usable model for key".to_string()))?;

        debug!(model = %picked, "oracle model selected");
        *self.model_cache.lock().await = Some(picked.clone());
        Ok(picked)
    }

    fn build_prompt(request: &OracleRequest<'_>) -> String {
        let sample = request.sample;
        let candidate = request.candidate;
        format!(
            r#"You are the decision core of a quantitative trading algorithm for {symbol}.

[MARKET STATE]
ADX: {adx:.1} ({regime})
- In a trending market, follow the moving average and histogram.
- In a ranging market, weight overbought/oversold readings.

[WEIGHTED CONFIDENCE]
Bull score: {bull:.1} / 100
Bear score: {bear:.1} / 100

[CURRENT DATA]
Price: {price}
RSI: {rsi:.1}
Histogram: {hist:.4}
Moving average: {ma:.1}

[CANDIDATE]
The deterministic pipeline proposes {action} (Kelly fraction {kelly:.2}, win probability {prob:.2}).

[DECISION RULES]
1. Only act when one side's score is clearly above the other.
2. Bull dominant and above 60 -> consider BUY.
3. Bear dominant and above 60 -> consider SELL.
4. Scores close together or both weak -> always WAIT.

Return JSON only: {{"action": "BUY" | "SELL" | "WAIT", "reason": "short rationale with score analysis"}}"#,
            symbol = request.symbol,
            adx = sample.trend_strength,
            regime = candidate.profile.regime,
            bull = sample.score_bull,
            bear = sample.score_bear,
            price = sample.close,
            rsi = sample.oscillator,
            hist = sample.trend_histogram,
            ma = sample.moving_average,
            action = candidate.direction.as_action(),
            kelly = candidate.kelly_fraction,
            prob = candidate.probability,
        )
    }

    async fn generate(&self, key: &str, model: &str, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, key
        );
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let response: GenerateResponse = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::OracleTransport(e.to_string()))?
            .json()
            .await?;

        let text = response
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| Error::OracleUnparsable("empty candidate list".to_string()))?;
        Ok(text)
    }

    async fn attempt(&self, key: &str, prompt: &str) -> Result<OracleVerdict> {
        let model = self.pick_model(key).await?;
        let text = self.generate(key, &model, prompt).await?;
        parse_verdict(&text)
    }
}

#[async_trait]
impl DecisionOracle for GeminiOracle {
    async fn judge(&self, request: &OracleRequest<'_>) -> Result<OracleVerdict> {
        let prompt = Self::build_prompt(request);
        let attempts = self.pool.lock().await.len();

        for attempt in 0..attempts {
            let key = self.pool.lock().await.current().to_string();
            match self.attempt(&key, &prompt).await {
                Ok(verdict) => return Ok(verdict),
                Err(e) => {
                    warn!(attempt = attempt + 1, attempts, error = %e, "oracle call failed, rotating key");
                    self.pool.lock().await.rotate();
                    // A failing key may also have poisoned the model probe
                    *self.model_cache.lock().await = None;
                }
            }
        }

        Err(Error::OracleExhausted { attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::MarketSample;
    use crate::strategy::{Direction, EntryCandidate, MarketRegime, RiskProfile};
    use chrono::Utc;

    fn request_fixture() -> (MarketSample, EntryCandidate) {
        let sample = MarketSample {
            timestamp: Utc::now(),
            open: 100.0,
            high: 101.0,
            low: 99.0,
            close: 100.5,
            volume: 10.0,
            oscillator: 40.0,
            trend_strength: 31.2,
            moving_average: 99.8,
            ma_distance_pct: 0.7,
            volume_ratio: 1.4,
            trend_histogram: 0.25,
            vwap: 100.1,
            atr: 2.0,
            score_bull: 81.0,
            score_bear: 9.0,
        };
        let candidate = EntryCandidate {
            direction: Direction::Long,
            profile: RiskProfile {
                regime: MarketRegime::Trending,
                tp_mult: 3.0,
                sl_mult: 1.5,
            },
            kelly_fraction: 0.71,
            probability: 0.81,
            notional: 500.0,
            stop_loss: 97.5,
            take_profit: 106.5,
        };
        (sample, candidate)
    }

    #[test]
    fn test_prompt_carries_scores_and_candidate() {
        let (sample, candidate) = request_fixture();
        let request = OracleRequest {
            symbol: "BTC/USDT",
            sample: &sample,
            candidate: &candidate,
        };
        let prompt = GeminiOracle::build_prompt(&request);
        assert!(prompt.contains("Bull score: 81.0"));
        assert!(prompt.contains("Bear score: 9.0"));
        assert!(prompt.contains("proposes BUY"));
        assert!(prompt.contains("ADX: 31.2 (Trending)"));
        assert!(prompt.contains(r#""action": "BUY" | "SELL" | "WAIT""#));
    }

    #[test]
    fn test_generate_response_shape() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "{\"action\": \"BUY\", \"reason\": \"ok\"}"}]}}
            ]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        let text = &parsed.candidates[0].content.parts[0].text;
        let verdict = parse_verdict(text).unwrap();
        assert_eq!(verdict.reason, "ok");
    }

    #[test]
    fn test_model_listing_shape() {
        let raw = r#"{
            "models": [
                {"name": "models/gemini-embedding", "supportedGenerationMethods": ["embedContent"]},
                {"name": "models/gemini-1.5-pro", "supportedGenerationMethods": ["generateContent"]},
                {"name": "models/gemini-1.5-flash", "supportedGenerationMethods": ["generateContent"]}
            ]
        }"#;
        let listing: ModelListing = serde_json::from_str(raw).unwrap();
        let usable: Vec<_> = listing
            .models
            .iter()
            .filter(|m| {
                m.supported_generation_methods
                    .iter()
                    .any(|x| x == "generateContent")
            })
            .collect();
        assert_eq!(usable.len(), 2);
        assert!(usable.iter().any(|m| m.name.contains("flash")));
    }
}
