//! Chain arithmetic behind the stats API

use serde::{Deserialize, Serialize};

use crate::format::TimeBreakdown;

/// Smallest and largest lookback accepted by `/avg-block-time`
pub const MIN_AVG_WINDOW: u64 = 2;
pub const MAX_AVG_WINDOW: u64 = 2016;
pub const DEFAULT_AVG_WINDOW: u64 = 120;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HalvingInfo {
    pub next_halving_height: u64,
    pub blocks_remaining: u64,
    pub eta_seconds: f64,
    pub eta_formatted: String,
}

impl HalvingInfo {
    /// Project the next halving from the current tip
    ///
    /// A tip sitting exactly on a halving height counts toward the following one.
    pub fn at_height(height: u64, halving_interval: u64, block_time_seconds: f64) -> Self {
        let next_halving_height = (height / halving_interval + 1) * halving_interval;
        let blocks_remaining = next_halving_height.saturating_sub(height);
        let eta_seconds = blocks_remaining as f64 * block_time_seconds;

        Self {
            next_halving_height,
            blocks_remaining,
            eta_seconds,
            eta_formatted: TimeBreakdown::from_seconds(eta_seconds as u64).to_words(),
        }
    }
}

/// Mean seconds per block between two block timestamps `window` blocks apart
pub fn average_block_time(time_last: i64, time_prev: i64, window: u64) -> f64 {
    (time_last - time_prev) as f64 / window as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_halving_projection() {
        let info = HalvingInfo::at_height(94_995, 210_000, 120.0);
        assert_eq!(info.next_halving_height, 210_000);
        assert_eq!(info.blocks_remaining, 115_005);
        assert_eq!(info.eta_seconds, 13_800_600.0);
        assert_eq!(info.eta_formatted, "159 days, 17 hours, 30 minutes, 0 seconds");
    }

    #[test]
    fn test_halving_on_boundary_targets_next() {
        let info = HalvingInfo::at_height(210_000, 210_000, 120.0);
        assert_eq!(info.next_halving_height, 420_000);
        assert_eq!(info.blocks_remaining, 210_000);
    }

    #[test]
    fn test_average_block_time() {
        assert_eq!(average_block_time(1_700_014_400, 1_700_000_000, 120), 120.0);
        assert_eq!(average_block_time(1_000, 700, 2), 150.0);
    }
}
