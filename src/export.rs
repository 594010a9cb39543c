//! Result export
//!
//! Serializes the run's loss records to a JSON file at the end of replay.
//! Failures here are the caller's to log; they never abort a finished run.

use std::path::Path;

use crate::engine::LossRecord;
use crate::error::{Error, Result};

/// Write the ordered loss records as a pretty JSON array
pub fn write_loss_report<P: AsRef<Path>>(path: P, records: &[LossRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path.as_ref(), json).map_err(|e| {
        Error::Export(format!(
            "cannot write {}: {}",
            path.as_ref().display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{Direction, MarketRegime};
    use chrono::{TimeZone, Utc};

    fn records() -> Vec<LossRecord> {
        vec![
            LossRecord {
                time: Utc.with_ymd_and_hms(2024, 3, 1, 12, 15, 0).unwrap(),
                direction: Direction::Long,
                entry_price: 64_250.5,
                exit_price: 64_100.0,
                loss_amount: -312.44,
                reason: "[K:0.55] momentum faded".to_string(),
                regime_mode: MarketRegime::Trending,
            },
            LossRecord {
                time: Utc.with_ymd_and_hms(2024, 3, 2, 8, 30, 0).unwrap(),
                direction: Direction::Short,
                entry_price: 63_900.0,
                exit_price: 64_050.25,
                loss_amount: -98.7,
                reason: "[K:0.12] range break".to_string(),
                regime_mode: MarketRegime::Ranging,
            },
        ]
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("losses.json");

        let original = records();
        write_loss_report(&path, &original).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let restored: Vec<LossRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_empty_report_is_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("losses.json");

        write_loss_report(&path, &[]).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw.trim(), "[]");
    }

    #[test]
    fn test_unwritable_path_is_reported() {
        let err = write_loss_report("/nonexistent-dir/losses.json", &records()).unwrap_err();
        assert!(matches!(err, Error::Export(_)));
    }
}
