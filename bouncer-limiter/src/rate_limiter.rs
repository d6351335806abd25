//! Attempt rate limiting with temporary lockouts.
//!
//! This module defines the building blocks shared by both counting
//! strategies offered by this crate.
//!
//! The primary type is [`RateLimiter`], which tracks attempts per
//! **identifier** (an IP address, an email, a user id) and answers whether
//! the next attempt may proceed.
//!
//! ## Design principles
//!
//! - **Advisory decisions** - a check never fails, it returns a
//!   [`RateLimitResult`] and the caller acts on it.
//! - **Outcome-aware** - a check may carry the outcome of the attempt it
//!   guards. Failed attempts that exhaust the quota lock the identifier out
//!   for [`RateLimitConfig::block_duration`].
//! - **Time abstraction** - all time-dependent logic is driven by a
//!   pluggable [`TimeSource`] to allow deterministic testing.
//!
//! ## Thread safety
//!
//! [`RateLimiter`] is `Send + Sync`. Every check holds the identifier's
//! storage entry for its whole duration, so concurrent checks for the same
//! identifier are serialized while different identifiers proceed in parallel.
//!
//! ## Scope
//!
//! State lives in process memory only. Nothing is persisted and separate
//! processes never observe each other's attempts.

use std::time::{SystemTime, UNIX_EPOCH};

pub use config::{RateLimitConfig, Strategy, MAX_CLEANUP_INTERVAL};
pub use check::{CheckOptions, RateLimitResult};
pub use limiter::{retain_recent, CleanupReport, RateLimiter};

mod config;
mod check;
mod limiter;
mod fixed_window;
mod sliding_window;

const MILLIS_PER_SEC: u64 = 1_000;

/// A single recorded attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptRecord {
    /// Milliseconds since [`UNIX_EPOCH`] when the attempt happened.
    pub timestamp_ms: u64,

    /// Whether the guarded operation succeeded.
    pub success: bool,
}

impl AttemptRecord {
    /// Creates a new attempt record
    #[inline]
    pub fn new(timestamp_ms: u64, success: bool) -> Self {
        Self { timestamp_ms, success }
    }
}

/// An active lockout of an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockEntry {
    /// Milliseconds since [`UNIX_EPOCH`] after which the block is lifted.
    pub expires_at_ms: u64,
}

impl BlockEntry {
    /// Returns `true` if the block is still in force at `now_ms`.
    #[inline]
    pub fn is_active(&self, now_ms: u64) -> bool {
        self.expires_at_ms > now_ms
    }

    /// Whole seconds until the block expires, rounded up.
    #[inline]
    pub fn retry_after_secs(&self, now_ms: u64) -> u64 {
        self.expires_at_ms
            .saturating_sub(now_ms)
            .div_ceil(MILLIS_PER_SEC)
    }
}

/// Attempts of one identifier as seen by a counting strategy at some instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowView {
    /// Number of attempts that count toward the quota.
    pub count: u32,

    /// Milliseconds since [`UNIX_EPOCH`] when the quota frees up.
    pub reset_at_ms: u64,
}

/// A source of time used by the rate limiter.
///
/// Time is expressed in **milliseconds since [`UNIX_EPOCH`]**. Fixed
/// windows are aligned to multiples of the window size counted from the
/// epoch, so implementations must report wall-clock based values.
pub trait TimeSource: Send + Sync {
    /// Returns the current time in milliseconds since [`UNIX_EPOCH`].
    fn now_millis(&self) -> u64;

    /// Returns the number of seconds elapsed since [`UNIX_EPOCH`]
    /// (`1970-01-01 00:00:00 UTC`).
    #[inline(always)]
    fn now_secs(&self) -> u64 {
        self.now_millis() / MILLIS_PER_SEC
    }
}

/// System wall clock time source.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    #[inline]
    fn now_millis(&self) -> u64 {
        // A clock set before 1970 counts as the epoch itself.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis().try_into().unwrap_or(u64::MAX))
            .unwrap_or(0)
    }
}
