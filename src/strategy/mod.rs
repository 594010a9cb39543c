//! Deterministic decision pipeline
//!
//! One bar flows through: regime classification, confidence scoring, hard
//! safety gates, Kelly-style sizing, and the counter-trend veto. The output
//! is either an entry candidate for the decision gate or a Wait with a
//! machine-readable reason.

pub mod kelly;
pub mod regime;
pub mod safety;
pub mod scorer;
pub mod types;
pub mod veto;

pub use kelly::{kelly_fraction, RiskSizer, SideEdge};
pub use regime::RegimeClassifier;
pub use safety::SafetyFilter;
pub use scorer::{ScorePair, Scorer};
pub use types::{
    Direction, EntryCandidate, MarketRegime, RiskProfile, Signal, TradeAction, WaitReason,
};
pub use veto::TrendVeto;
