//! Tools for the sliding window counting strategy

use super::{AttemptRecord, WindowView};

/// Earliest timestamp still inside the window ending at `now_ms`.
#[inline]
pub(super) fn window_start(now_ms: u64, window_ms: u64) -> u64 {
    now_ms.saturating_sub(window_ms)
}

/// Counts the attempts in `[now - window, now]`.
///
/// Unlike the fixed window there is no boundary effect: the lookback is
/// always exactly one window. The quota frees up one window after the
/// oldest counted attempt, or one window from now if nothing is counted.
/// `records` must be ordered by timestamp.
#[inline]
pub(super) fn view(records: &[AttemptRecord], now_ms: u64, window_ms: u64) -> WindowView {
    let start = window_start(now_ms, window_ms);
    let from = records.partition_point(|record| record.timestamp_ms < start);
    let to = records.partition_point(|record| record.timestamp_ms <= now_ms);

    let oldest = records[from..to]
        .first()
        .map_or(now_ms, |record| record.timestamp_ms);

    WindowView {
        count: (to - from).try_into().unwrap_or(u32::MAX),
        reset_at_ms: oldest.saturating_add(window_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(timestamps: &[u64]) -> Vec<AttemptRecord> {
        timestamps
            .iter()
            .map(|&ts| AttemptRecord::new(ts, true))
            .collect()
    }

    #[test]
    fn it_counts_last_window_inclusive() {
        let records = records(&[1_000, 1_500, 2_000]);

        let view = view(&records, 2_000, 1_000);

        assert_eq!(view.count, 3);
        assert_eq!(view.reset_at_ms, 2_000);
    }

    #[test]
    fn it_drops_attempts_older_than_window() {
        let records = records(&[1_000, 1_500, 2_000]);

        let view = view(&records, 2_001, 1_000);

        assert_eq!(view.count, 2);
        assert_eq!(view.reset_at_ms, 2_500);
    }

    #[test]
    fn it_has_no_boundary_effect() {
        let records = records(&[999, 1_001]);

        assert_eq!(view(&records, 1_001, 1_000).count, 2);
    }

    #[test]
    fn it_resets_one_window_from_now_when_empty() {
        let view = view(&[], 10_000, 1_000);

        assert_eq!(view.count, 0);
        assert_eq!(view.reset_at_ms, 11_000);
    }

    #[test]
    fn it_handles_start_of_timeline() {
        let records = records(&[0, 10]);

        let view = view(&records, 20, 1_000);

        assert_eq!(view.count, 2);
        assert_eq!(view.reset_at_ms, 1_000);
    }
}
