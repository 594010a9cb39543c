//! Single-position replay state machine and its accounting

pub mod ledger;
pub mod position;
pub mod replay;

pub use ledger::{Ledger, LossRecord, RunSummary, TradeOutcome};
pub use position::{ExitKind, Position};
pub use replay::ReplayEngine;
