//! # Bouncer
//!
//! > Per-policy attempt rate limiting with temporary lockouts for sign-in,
//! > registration, password reset and general API endpoints.
//!
//! ## Features
//! * Fixed and sliding window counting
//! * Lockout after the quota is exhausted by a failed attempt
//! * Read-only probes that never count as attempts
//! * JSON overrides of the policy presets
//! * Background cleanup on [Tokio](https://tokio.rs/)
//!
//! ## Example
//! ```no_run
//! use bouncer::{CheckOptions, Policy, RateLimiters};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let limiters = RateLimiters::new();
//!     let shutdown = CancellationToken::new();
//!     let mut cleanup = limiters.spawn_cleanup(shutdown.clone());
//!
//!     let email = "alice@example.com";
//!     if !limiters.check(Policy::Login, email, CheckOptions::probe()).allowed {
//!         return;
//!     }
//!
//!     let signed_in = false; // outcome of the actual sign-in
//!     let result = limiters.check(Policy::Login, email, CheckOptions::outcome(signed_in));
//!     if result.is_blocked {
//!         println!("locked out, retry in {:?}", result.retry_after());
//!     }
//!
//!     shutdown.cancel();
//!     while cleanup.join_next().await.is_some() {}
//! }
//! ```

pub mod cleanup;
pub mod config;
pub mod error;
pub mod policy;
pub mod registry;

pub use bouncer_limiter::{
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

pub use crate::{
    cleanup::CleanupTask,
    config::{PolicySettings, Settings},
    error::{Error, Result},
    policy::Policy,
    registry::{RateLimiters, RateLimitersBuilder},
};
