//! Trend veto
//!
//! Rejects entries whose direction contradicts the price / moving-average
//! relationship. Vetoed candidates become Wait and are never escalated to
//! the oracle.

use super::types::{Direction, WaitReason};

/// Counter-trend entry veto
pub struct TrendVeto;

impl TrendVeto {
    /// Returns a veto if price disagrees with the candidate direction.
    ///
    /// A Long needs price at or above the moving average, a Short at or
    /// below it.
    pub fn check(direction: Direction, price: f64, moving_average: f64) -> Option<WaitReason> {
        let vetoed = match direction {
            Direction::Long => price < moving_average,
            Direction::Short => price > moving_average,
        };
        vetoed.then_some(WaitReason::CounterTrend { direction })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_below_ma_vetoed() {
        let reason = TrendVeto::check(Direction::Long, 99.0, 100.0).unwrap();
        assert_eq!(
            reason,
            WaitReason::CounterTrend {
                direction: Direction::Long
            }
        );
    }

    #[test]
    fn test_long_above_ma_allowed() {
        assert_eq!(TrendVeto::check(Direction::Long, 101.0, 100.0), None);
    }

    #[test]
    fn test_short_above_ma_vetoed() {
        assert!(TrendVeto::check(Direction::Short, 101.0, 100.0).is_some());
    }

    #[test]
    fn test_short_below_ma_allowed() {
        assert_eq!(TrendVeto::check(Direction::Short, 99.0, 100.0), None);
    }

    #[test]
    fn test_price_on_ma_allowed_both_ways() {
        assert_eq!(TrendVeto::check(Direction::Long, 100.0, 100.0), None);
        assert_eq!(TrendVeto::check(Direction::Short, 100.0, 100.0), None);
    }
}
