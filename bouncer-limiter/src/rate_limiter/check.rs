//! Check inputs and decisions

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Options of a single [`RateLimiter::check_limit`](super::RateLimiter::check_limit) call.
///
/// Without an outcome the check is a read-only probe.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CheckOptions {
    /// Outcome of the guarded attempt, if it has been made.
    pub success: Option<bool>,
}

impl CheckOptions {
    /// A read-only probe that records nothing.
    #[inline]
    pub fn probe() -> Self {
        Self { success: None }
    }

    /// Records a successful attempt.
    #[inline]
    pub fn success() -> Self {
        Self { success: Some(true) }
    }

    /// Records a failed attempt.
    #[inline]
    pub fn failure() -> Self {
        Self { success: Some(false) }
    }

    /// Records an attempt with the given outcome.
    #[inline]
    pub fn outcome(success: bool) -> Self {
        Self { success: Some(success) }
    }

    /// Returns `true` if the check records nothing.
    #[inline]
    pub fn is_probe(&self) -> bool {
        self.success.is_none()
    }
}

impl From<Option<bool>> for CheckOptions {
    #[inline]
    fn from(success: Option<bool>) -> Self {
        Self { success }
    }
}

/// Admission decision for an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitResult {
    /// Whether the attempt may proceed.
    ///
    /// For a recording check this is decided before the attempt is counted.
    pub allowed: bool,

    /// Attempts left in the current window.
    pub remaining_attempts: u32,

    /// Milliseconds since [`UNIX_EPOCH`] when the quota frees up,
    /// or when the block expires if the identifier is blocked.
    pub reset_at_ms: u64,

    /// Attempts counted in the current window.
    pub total_attempts: u32,

    /// Whether the identifier is locked out.
    pub is_blocked: bool,

    /// Whole seconds until the block expires. Present only when blocked.
    pub retry_after_secs: Option<u64>,
}

impl RateLimitResult {
    /// Instant when the quota frees up or the block expires.
    #[inline]
    pub fn reset_at(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(self.reset_at_ms)
    }

    /// Time to wait before trying again, if blocked.
    #[inline]
    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after_secs.map(Duration::from_secs)
    }
}
