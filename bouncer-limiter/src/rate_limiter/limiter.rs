//! Tools and data structures for the attempt rate limiter

use std::sync::Arc;
use dashmap::DashMap;
use super::{
    AttemptRecord,
    BlockEntry,
    CheckOptions,
    RateLimitConfig,
    RateLimitResult,
    SystemTimeSource,
    TimeSource,
    WindowView
};

/// Per-identifier state.
///
/// Holding the block as an `Option` keeps at most one active block
/// per identifier.
#[derive(Debug, Default)]
struct Entry {
    /// Attempts of the current window, ordered by timestamp.
    attempts: Vec<AttemptRecord>,

    /// Lockout, if one has been established.
    block: Option<BlockEntry>,
}

impl Entry {
    #[inline]
    fn is_empty(&self) -> bool {
        self.attempts.is_empty() && self.block.is_none()
    }
}

/// Number of records removed by a cleanup sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    /// Attempt records older than the retention period.
    pub attempts_removed: usize,

    /// Expired blocks.
    pub blocks_removed: usize,
}

/// An attempt rate limiter with temporary lockouts.
///
/// ## Algorithm
///
/// For a given `identifier`:
///
/// 1. If an unexpired block exists the check is denied with
///    `retry_after_secs` set. An expired block is dropped on access.
/// 2. The configured [`Strategy`](super::Strategy) selects the attempts
///    that count toward the quota.
/// 3. The check is allowed while fewer than `max_attempts` attempts count.
/// 4. If the check carries an outcome the attempt is recorded, even when
///    denied. A failed attempt that brings the count to `max_attempts` or
///    beyond blocks the identifier for `block_duration`.
///
/// Attempts made while blocked are not recorded.
///
/// ## Eviction
///
/// Nothing is evicted on the hot path except expired blocks. Old attempts
/// are dropped by [`cleanup`](RateLimiter::cleanup), which the host is
/// expected to call every [`RateLimitConfig::cleanup_interval`].
#[derive(Debug, Clone)]
pub struct RateLimiter<T: TimeSource = SystemTimeSource> {
    /// Per-identifier state.
    storage: Arc<DashMap<String, Entry>>,

    /// Limits applied to every identifier.
    config: RateLimitConfig,

    /// Time source used to determine the current time.
    time_source: T,
}

impl RateLimiter {
    /// Creates a new rate limiter using the system clock.
    #[inline]
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_time_source(config, SystemTimeSource)
    }
}

impl<T: TimeSource> RateLimiter<T> {
    /// Creates a [`RateLimiter`] with a custom [`TimeSource`].
    ///
    /// This is primarily useful for testing and deterministic scenarios.
    #[inline]
    pub fn with_time_source(config: RateLimitConfig, time_source: T) -> Self {
        Self {
            storage: Arc::new(DashMap::new()),
            config,
            time_source,
        }
    }

    /// Limits applied by this limiter.
    #[inline(always)]
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Time source used by this limiter.
    #[inline(always)]
    pub fn time_source(&self) -> &T {
        &self.time_source
    }

    /// Number of identifiers with attempt history or a block.
    #[inline]
    pub fn tracked_identifiers(&self) -> usize {
        self.storage.len()
    }

    /// Checks whether an attempt for `identifier` may proceed.
    ///
    /// If `options` carries an outcome the attempt is recorded, otherwise
    /// the call is a read-only probe. Unknown identifiers start with a
    /// full quota.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use bouncer_limiter::{CheckOptions, RateLimitConfig, RateLimiter, Strategy};
    ///
    /// let limiter = RateLimiter::new(RateLimitConfig::new(
    ///     2,
    ///     Duration::from_secs(60),
    ///     Duration::from_secs(300),
    ///     Strategy::SlidingWindow));
    ///
    /// assert!(limiter.check_limit("alice@example.com", CheckOptions::failure()).allowed);
    /// assert!(limiter.check_limit("alice@example.com", CheckOptions::failure()).is_blocked);
    /// assert!(!limiter.check_limit("alice@example.com", CheckOptions::probe()).allowed);
    /// ```
    pub fn check_limit(&self, identifier: &str, options: CheckOptions) -> RateLimitResult {
        let now = self.time_source.now_millis();
        match options.success {
            None => self.probe_at(identifier, now),
            Some(success) => self.record_at(identifier, success, now),
        }
    }

    /// Read-only check for `identifier`.
    #[inline]
    pub fn probe(&self, identifier: &str) -> RateLimitResult {
        self.check_limit(identifier, CheckOptions::probe())
    }

    /// Checks and records a successful attempt for `identifier`.
    #[inline]
    pub fn record_success(&self, identifier: &str) -> RateLimitResult {
        self.check_limit(identifier, CheckOptions::success())
    }

    /// Checks and records a failed attempt for `identifier`.
    #[inline]
    pub fn record_failure(&self, identifier: &str) -> RateLimitResult {
        self.check_limit(identifier, CheckOptions::failure())
    }

    /// Returns `true` if `identifier` is locked out right now.
    pub fn is_blocked(&self, identifier: &str) -> bool {
        let now = self.time_source.now_millis();
        self.storage
            .get(identifier)
            .and_then(|entry| entry.block)
            .is_some_and(|block| block.is_active(now))
    }

    /// Forgets the attempt history and any block of `identifier`.
    ///
    /// Returns `true` if there was anything to forget.
    pub fn reset(&self, identifier: &str) -> bool {
        let removed = self.storage.remove(identifier).is_some();

        #[cfg(feature = "tracing")]
        if removed {
            tracing::debug!(identifier, "rate limit state reset");
        }

        removed
    }

    /// Drops outdated attempts and expired blocks as of the current time.
    pub fn cleanup(&self) -> CleanupReport {
        let now = self.time_source.now_millis();
        CleanupReport {
            blocks_removed: self.prune_blocks_at(now),
            attempts_removed: self.prune_attempts_at(now),
        }
    }

    /// Drops attempts older than `window + block_duration` as of `now_ms`
    /// and forgets identifiers left with neither attempts nor a block.
    ///
    /// Returns the number of removed attempt records.
    pub fn prune_attempts_at(&self, now_ms: u64) -> usize {
        let cutoff = now_ms.saturating_sub(self.config.retention_ms());
        let mut removed = 0;
        self.storage.retain(|_, entry| {
            removed += retain_recent(&mut entry.attempts, cutoff);
            !entry.is_empty()
        });
        removed
    }

    /// Drops blocks expired as of `now_ms` and forgets identifiers left
    /// with neither attempts nor a block.
    ///
    /// Returns the number of removed blocks.
    pub fn prune_blocks_at(&self, now_ms: u64) -> usize {
        let mut removed = 0;
        self.storage.retain(|_, entry| {
            if entry.block.is_some_and(|block| !block.is_active(now_ms)) {
                entry.block = None;
                removed += 1;
            }
            !entry.is_empty()
        });
        removed
    }

    fn probe_at(&self, identifier: &str, now: u64) -> RateLimitResult {
        let Some(mut entry) = self.storage.get_mut(identifier) else {
            return self.open(self.view(&[], now));
        };

        if let Some(denied) = self.check_block(&mut entry, identifier, now) {
            return denied;
        }

        self.open(self.view(&entry.attempts, now))
    }

    fn record_at(&self, identifier: &str, success: bool, now: u64) -> RateLimitResult {
        let mut entry = match self.storage.get_mut(identifier) {
            Some(entry) => entry,
            None => self.storage.entry(identifier.to_owned()).or_default(),
        };

        if let Some(denied) = self.check_block(&mut entry, identifier, now) {
            return denied;
        }

        let max_attempts = self.config.max_attempts();
        let allowed = self.view(&entry.attempts, now).count < max_attempts;

        self.push(&mut entry.attempts, AttemptRecord::new(now, success));
        let view = self.view(&entry.attempts, now);

        let block = BlockEntry {
            expires_at_ms: now.saturating_add(self.config.block_duration_ms()),
        };

        if success || view.count < max_attempts || !block.is_active(now) {
            return RateLimitResult {
                allowed,
                is_blocked: false,
                ..self.open(view)
            };
        }

        entry.block = Some(block);

        #[cfg(feature = "tracing")]
        tracing::warn!(
            identifier,
            attempts = view.count,
            retry_after_secs = block.retry_after_secs(now),
            "attempt quota exhausted, identifier blocked"
        );

        RateLimitResult {
            allowed,
            remaining_attempts: 0,
            reset_at_ms: block.expires_at_ms,
            total_attempts: view.count,
            is_blocked: true,
            retry_after_secs: Some(block.retry_after_secs(now)),
        }
    }

    /// Denies the check if `entry` is blocked at `now`, dropping an expired block.
    #[inline]
    fn check_block(&self, entry: &mut Entry, identifier: &str, now: u64) -> Option<RateLimitResult> {
        let block = entry.block?;
        if !block.is_active(now) {
            entry.block = None;

            #[cfg(feature = "tracing")]
            tracing::debug!(identifier, "block expired");
            #[cfg(not(feature = "tracing"))]
            let _ = identifier;

            return None;
        }

        Some(RateLimitResult {
            allowed: false,
            remaining_attempts: 0,
            reset_at_ms: block.expires_at_ms,
            total_attempts: self.view(&entry.attempts, now).count,
            is_blocked: true,
            retry_after_secs: Some(block.retry_after_secs(now)),
        })
    }

    /// Appends `record` keeping `records` ordered by timestamp and drops
    /// the records that fell out of the current window.
    #[inline]
    fn push(&self, records: &mut Vec<AttemptRecord>, record: AttemptRecord) {
        let start = self.config
            .strategy()
            .window_start(record.timestamp_ms, self.config.window_ms());
        retain_recent(records, start);

        // the wall clock may step back
        let at = records.partition_point(|r| r.timestamp_ms <= record.timestamp_ms);
        records.insert(at, record);
    }

    #[inline]
    fn view(&self, records: &[AttemptRecord], now: u64) -> WindowView {
        self.config
            .strategy()
            .view(records, now, self.config.window_ms())
    }

    #[inline]
    fn open(&self, view: WindowView) -> RateLimitResult {
        let max_attempts = self.config.max_attempts();
        RateLimitResult {
            allowed: view.count < max_attempts,
            remaining_attempts: max_attempts.saturating_sub(view.count),
            reset_at_ms: view.reset_at_ms,
            total_attempts: view.count,
            is_blocked: false,
            retry_after_secs: None,
        }
    }
}

/// Keeps the records made at or after `cutoff_ms`.
///
/// `records` must be ordered by timestamp, as the limiter keeps them.
/// Returns the number of removed records.
#[inline]
pub fn retain_recent(records: &mut Vec<AttemptRecord>, cutoff_ms: u64) -> usize {
    let stale = records.partition_point(|record| record.timestamp_ms < cutoff_ms);
    records.drain(..stale);
    stale
}
