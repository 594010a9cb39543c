//! Kelly Trader Library
//!
//! Regime-aware leveraged replay trader with Kelly sizing and an external
//! decision oracle.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod feed;
pub mod notify;
pub mod oracle;
pub mod strategy;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
