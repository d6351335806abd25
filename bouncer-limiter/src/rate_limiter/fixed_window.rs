//! Tools for the fixed window counting strategy

use super::{AttemptRecord, WindowView};

/// Start of the epoch-aligned window containing `now_ms`.
#[inline]
pub(super) fn window_start(now_ms: u64, window_ms: u64) -> u64 {
    let window_ms = window_ms.max(1);
    (now_ms / window_ms) * window_ms
}

/// Counts the attempts in `[start, start + window)` where `start` is the
/// epoch-aligned window boundary at or before `now_ms`.
///
/// The quota frees up when the window ends.
/// `records` must be ordered by timestamp.
#[inline]
pub(super) fn view(records: &[AttemptRecord], now_ms: u64, window_ms: u64) -> WindowView {
    let start = window_start(now_ms, window_ms);
    let end = start.saturating_add(window_ms);

    let from = records.partition_point(|record| record.timestamp_ms < start);
    let to = records.partition_point(|record| record.timestamp_ms < end);

    WindowView {
        count: (to - from).try_into().unwrap_or(u32::MAX),
        reset_at_ms: end,
    }
}
