//! Periodic removal of outdated attempts and expired blocks

use std::time::Duration;
use tokio::{
    task::JoinHandle,
    time::{interval, MissedTickBehavior}
};
use tokio_util::sync::CancellationToken;
use crate::{RateLimiter, TimeSource};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// A background sweep over a single [`RateLimiter`].
///
/// Ticks every [`RateLimitConfig::cleanup_interval`](crate::RateLimitConfig::cleanup_interval)
/// unless told otherwise with [`every`](CleanupTask::every), and calls
/// [`RateLimiter::cleanup`] on each tick.
#[derive(Debug)]
pub struct CleanupTask<T: TimeSource> {
    limiter: RateLimiter<T>,
    interval: Duration,
    label: &'static str,
}

impl<T: TimeSource> CleanupTask<T> {
    /// Creates a cleanup task for `limiter`.
    ///
    /// Clones of a limiter share state, so hand over a clone and keep
    /// checking through the original.
    #[inline]
    pub fn new(limiter: RateLimiter<T>) -> Self {
        let interval = limiter.config().cleanup_interval();
        Self { limiter, interval, label: "" }
    }

    /// Overrides the sweep cadence.
    #[inline]
    pub fn every(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_INTERVAL);
        self
    }

    /// Sets a label included in log events, usually the policy name.
    #[inline]
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    /// Sweep cadence.
    #[inline(always)]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs sweeps until `token` is cancelled.
    pub async fn run(self, token: CancellationToken) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    let _report = self.limiter.cleanup();

                    #[cfg(feature = "tracing")]
                    tracing::debug!(
                        policy = self.label,
                        attempts_removed = _report.attempts_removed,
                        blocks_removed = _report.blocks_removed,
                        tracked = self.limiter.tracked_identifiers(),
                        "rate limiter cleanup"
                    );
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(policy = self.label, "rate limiter cleanup stopped");
    }
}

impl<T: TimeSource + 'static> CleanupTask<T> {
    /// Spawns [`run`](CleanupTask::run) onto the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    #[inline]
    pub fn spawn(self, token: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(token))
    }
}
