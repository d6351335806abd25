//! Tools and structs for a rate limiter configuration

use std::time::Duration;
use super::{fixed_window, sliding_window, AttemptRecord, WindowView};

/// Upper bound of the background cleanup cadence.
pub const MAX_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Attempt counting strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Counts attempts inside windows aligned to multiples of the window
    /// size since the UNIX epoch.
    ///
    /// Two attempts a few milliseconds apart may land in different windows,
    /// so a caller straddling a boundary can make up to twice the quota
    /// within one window length of real time.
    FixedWindow,

    /// Counts attempts made within the last window length,
    /// both ends inclusive.
    SlidingWindow,
}

impl Strategy {
    /// Builds the view of `records` this strategy counts at `now_ms`.
    ///
    /// `records` must be ordered by timestamp.
    #[inline]
    pub fn view(self, records: &[AttemptRecord], now_ms: u64, window_ms: u64) -> WindowView {
        match self {
            Strategy::FixedWindow => fixed_window::view(records, now_ms, window_ms),
            Strategy::SlidingWindow => sliding_window::view(records, now_ms, window_ms),
        }
    }

    /// Earliest timestamp this strategy still counts at `now_ms`.
    ///
    /// Older records can never count again.
    #[inline]
    pub fn window_start(self, now_ms: u64, window_ms: u64) -> u64 {
        match self {
            Strategy::FixedWindow => fixed_window::window_start(now_ms, window_ms),
            Strategy::SlidingWindow => sliding_window::window_start(now_ms, window_ms),
        }
    }
}

/// Configuration of a single [`RateLimiter`](super::RateLimiter).
///
/// - `window` — duration over which attempts are counted
/// - `max_attempts` — attempts allowed per window
/// - `block_duration` — lockout length once the quota is exhausted by a failure
/// - `strategy` — how the window is placed on the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    window: Duration,
    max_attempts: u32,
    block_duration: Duration,
    strategy: Strategy,
}

impl RateLimitConfig {
    /// Creates a new rate limit configuration.
    ///
    /// # Arguments
    /// * `max_attempts` - Attempts allowed per window.
    /// * `window` - Duration of the counting window.
    /// * `block_duration` - Lockout length after the quota is exhausted.
    /// * `strategy` - Counting strategy.
    #[inline]
    pub fn new(
        max_attempts: u32,
        window: Duration,
        block_duration: Duration,
        strategy: Strategy
    ) -> Self {
        Self { window, max_attempts, block_duration, strategy }
    }

    /// Replaces the counting window.
    #[inline]
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Replaces the number of attempts allowed per window.
    #[inline]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Replaces the lockout length.
    #[inline]
    pub fn with_block_duration(mut self, block_duration: Duration) -> Self {
        self.block_duration = block_duration;
        self
    }

    /// Replaces the counting strategy.
    #[inline]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Duration of the counting window.
    #[inline(always)]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Attempts allowed per window.
    #[inline(always)]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Lockout length.
    #[inline(always)]
    pub fn block_duration(&self) -> Duration {
        self.block_duration
    }

    /// Counting strategy.
    #[inline(always)]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Window size in milliseconds, never less than `1`.
    #[inline]
    pub fn window_ms(&self) -> u64 {
        duration_ms(self.window).max(1)
    }

    /// Lockout length in milliseconds.
    #[inline]
    pub fn block_duration_ms(&self) -> u64 {
        duration_ms(self.block_duration)
    }

    /// How long an attempt record is worth keeping.
    ///
    /// Records older than `window + block_duration` can no longer affect a decision.
    #[inline]
    pub fn retention_ms(&self) -> u64 {
        self.window_ms().saturating_add(self.block_duration_ms())
    }

    /// Cadence of the background cleanup: the window size capped at
    /// [`MAX_CLEANUP_INTERVAL`], and never zero.
    #[inline]
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.window_ms()).min(MAX_CLEANUP_INTERVAL)
    }
}

#[inline]
fn duration_ms(duration: Duration) -> u64 {
    duration.as_millis().try_into().unwrap_or(u64::MAX)
}
