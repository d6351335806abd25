//! Bouncer Limiter
//!
//! Attempt tracking, windowed quotas and temporary lockouts for
//! authentication-style endpoints.

mod rate_limiter;

pub use rate_limiter::{
    retain_recent,
    AttemptRecord,
    BlockEntry,
    CheckOptions,
    CleanupReport,
    RateLimitConfig,
    RateLimitResult,
    RateLimiter,
    Strategy,
    SystemTimeSource,
    TimeSource,
    WindowView,
    MAX_CLEANUP_INTERVAL,
};
