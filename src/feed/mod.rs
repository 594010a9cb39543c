//! Market data feed
//!
//! Produces the finite, chronologically sorted sequence of annotated samples
//! the replay engine consumes.

pub mod indicators;
pub mod loader;
pub mod sample;

pub use loader::FeedLoader;
pub use sample::{MarketSample, RawBar};
