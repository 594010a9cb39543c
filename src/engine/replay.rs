//! Replay engine
//!
//! Strictly sequential loop over the annotated sample stream. Every bar
//! either manages the single open position or runs the deterministic entry
//! pipeline, consulting the oracle only for surviving candidates. All
//! mutable run state (balance, position, ledger) lives on this struct.

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::feed::MarketSample;
use crate::notify::Notifier;
use crate::oracle::{DecisionOracle, OracleRequest};
use crate::strategy::{
    EntryCandidate, RegimeClassifier, RiskSizer, SafetyFilter, ScorePair, Signal, TrendVeto,
    WaitReason,
};
use crate::error::{Error, Result};

use super::ledger::{Ledger, LossRecord, RunSummary};
use super::position::{ExitKind, Position};

/// Replay session owning all decision-affecting state
pub struct ReplayEngine {
    symbol: String,
    leverage: f64,

    regimes: RegimeClassifier,
    safety: SafetyFilter,
    sizer: RiskSizer,
    oracle: Box<dyn DecisionOracle>,
    notifier: Notifier,

    ledger: Ledger,
    position: Option<Position>,
}

impl ReplayEngine {
    pub fn new(config: &Config, oracle: Box<dyn DecisionOracle>, notifier: Notifier) -> Self {
        let sizer = RiskSizer::new(&config.risk);
        Self {
            symbol: config.feed.symbol.clone(),
            leverage: sizer.leverage(),
            regimes: RegimeClassifier::new(&config.strategy),
            safety: SafetyFilter::new(&config.strategy),
            sizer,
            oracle,
            notifier,
            ledger: Ledger::new(config.risk.initial_balance),
            position: None,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Replay the full sample stream and settle any position left open
    pub async fn run(&mut self, samples: &[MarketSample]) -> Result<RunSummary> {
        if samples.is_empty() {
            return Err(Error::EmptyFeed);
        }

        info!(
            symbol = %self.symbol,
            bars = samples.len(),
            balance = self.ledger.balance(),
            leverage = self.leverage,
            "replay started"
        );
        self.notifier
            .send(&format!(
                "🚀 **{}** replay started\nBalance: {:.2} U | Leverage: {}x",
                self.symbol,
                self.ledger.balance(),
                self.leverage
            ))
            .await;

        for sample in samples {
            if self.position.is_some() {
                self.manage_open(sample).await;
            } else {
                self.evaluate_bar(sample).await;
            }
        }

        // Forced closure: the stream ended with a position still open
        if let Some(position) = self.position.take() {
            let last = match samples.last() {
                Some(s) => s,
                None => return Err(Error::EmptyFeed),
            };
            let pnl = position.pnl_at(last.close, self.leverage);
            self.ledger.settle(pnl);
            info!(
                direction = %position.direction,
                exit = last.close,
                pnl,
                "forced closure at end of replay"
            );
            self.notifier
                .send(&format!("⏹ **Forced close** at replay end\nP&L: {:.2} U", pnl))
                .await;
        }

        let summary = self.ledger.summary();
        info!(
            final_balance = summary.final_balance,
            trades = summary.trades,
            wins = summary.wins,
            losses = summary.losses,
            win_rate_pct = summary.win_rate_pct,
            "replay finished"
        );
        Ok(summary)
    }

    /// Entry side of the state machine: pipeline, decision gate, open
    async fn evaluate_bar(&mut self, sample: &MarketSample) {
        let candidate = match self.deterministic_signal(sample) {
            Signal::Enter(candidate) => candidate,
            Signal::Wait(reason) => {
                debug!(time = %sample.timestamp, %reason, "wait");
                return;
            }
        };

        // Decision gate: only a concordant oracle verdict opens the trade
        let request = OracleRequest {
            symbol: &self.symbol,
            sample,
            candidate: &candidate,
        };
        let verdict = match self.oracle.judge(&request).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(time = %sample.timestamp, error = %e, "oracle unavailable, waiting");
                debug!(reason = %WaitReason::OracleUnavailable, "wait");
                return;
            }
        };

        if verdict.action != candidate.direction.as_action() {
            debug!(
                time = %sample.timestamp,
                candidate = %candidate.direction,
                oracle = %verdict.action,
                reason = %verdict.reason,
                "oracle disagreed with deterministic signal"
            );
            return;
        }

        self.open_position(sample, candidate, verdict.reason).await;
    }

    /// Deterministic pipeline: regime, safety gates, Kelly selection, sizing,
    /// trend veto
    fn deterministic_signal(&self, sample: &MarketSample) -> Signal {
        let profile = self.regimes.classify(sample.trend_strength);

        if let Some(reason) = self.safety.check(sample) {
            return Signal::Wait(reason);
        }

        let scores = ScorePair {
            bull: sample.score_bull,
            bear: sample.score_bear,
        };
        let edge = match self.sizer.select_side(&scores, &profile) {
            Some(edge) => edge,
            None => return Signal::Wait(WaitReason::NoEdge),
        };

        if let Some(reason) = TrendVeto::check(edge.direction, sample.close, sample.moving_average)
        {
            return Signal::Wait(reason);
        }

        let stop_distance = sample.atr * profile.sl_mult;
        let notional = self
            .sizer
            .notional(self.ledger.balance(), sample.close, stop_distance);
        if notional <= 0.0 {
            return Signal::Wait(WaitReason::NoEdge);
        }

        let take_distance = sample.atr * profile.tp_mult;
        let (stop_loss, take_profit) = match edge.direction {
            crate::strategy::Direction::Long => {
                (sample.close - stop_distance, sample.close + take_distance)
            }
            crate::strategy::Direction::Short => {
                (sample.close + stop_distance, sample.close - take_distance)
            }
        };

        Signal::Enter(EntryCandidate {
            direction: edge.direction,
            profile,
            kelly_fraction: edge.kelly_fraction,
            probability: edge.probability,
            notional,
            stop_loss,
            take_profit,
        })
    }

    async fn open_position(
        &mut self,
        sample: &MarketSample,
        candidate: EntryCandidate,
        oracle_reason: String,
    ) {
        let reason = format!("[K:{:.2}] {}", candidate.kelly_fraction, oracle_reason);
        let position = Position::open(
            candidate.direction,
            sample.close,
            sample.atr,
            &candidate.profile,
            candidate.notional,
            reason,
            sample.timestamp,
        );

        info!(
            time = %sample.timestamp,
            direction = %position.direction,
            regime = %position.regime_mode,
            entry = position.entry_price,
            stop_loss = position.stop_loss,
            take_profit = position.take_profit,
            size = position.size,
            kelly = candidate.kelly_fraction,
            "position opened"
        );
        self.notifier
            .send(&format!(
                "🚀 **Opened {}** [{}]\nTime: {}\nPrice: {:.2} | ADX: {:.1}\nSL: {:.2} | TP: {:.2}\nKelly: {:.2}\nReason: {}",
                position.direction,
                position.regime_mode,
                sample.timestamp,
                position.entry_price,
                sample.trend_strength,
                position.stop_loss,
                position.take_profit,
                candidate.kelly_fraction,
                position.reason,
            ))
            .await;

        self.position = Some(position);
    }

    /// Exit side of the state machine. Stop-loss is tested before
    /// take-profit, so a bar gapping through both realizes the stop.
    async fn manage_open(&mut self, sample: &MarketSample) {
        let exit = match &self.position {
            Some(position) => position.check_exit(sample.close),
            None => None,
        };
        let Some(kind) = exit else { return };
        let Some(position) = self.position.take() else {
            return;
        };

        let pnl = position.pnl_at(sample.close, self.leverage);
        self.ledger.settle(pnl);

        match kind {
            ExitKind::StopLoss => {
                info!(
                    time = %sample.timestamp,
                    direction = %position.direction,
                    exit = sample.close,
                    pnl,
                    "stop-loss hit"
                );
                self.notifier
                    .send(&format!("🛑 **Stop-loss exit**\nP&L: {:.2} U", pnl))
                    .await;
                self.ledger.record_loss(LossRecord {
                    time: sample.timestamp,
                    direction: position.direction,
                    entry_price: position.entry_price,
                    exit_price: sample.close,
                    loss_amount: pnl,
                    reason: position.reason,
                    regime_mode: position.regime_mode,
                });
            }
            ExitKind::TakeProfit => {
                info!(
                    time = %sample.timestamp,
                    direction = %position.direction,
                    exit = sample.close,
                    pnl,
                    "take-profit hit"
                );
                self.notifier
                    .send(&format!("💰 **Take-profit exit**\nP&L: +{:.2} U", pnl))
                    .await;
            }
        }
    }
}
