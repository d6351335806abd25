//! One rate limiter per policy, owned by the application

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use crate::{
    cleanup::CleanupTask,
    config::Settings,
    error::Result,
    CheckOptions,
    CleanupReport,
    Policy,
    RateLimitConfig,
    RateLimitResult,
    RateLimiter,
    SystemTimeSource,
    TimeSource
};

/// Rate limiters for every [`Policy`].
///
/// Constructed once by the application and handed to whatever guards an
/// endpoint. Clones share state, so a clone checked from a request handler
/// sees the same attempts as the cleanup task. Limiters of different
/// policies never share state.
///
/// # Example
/// ```
/// use bouncer::{CheckOptions, Policy, RateLimiters};
///
/// let limiters = RateLimiters::new();
///
/// let result = limiters.check(Policy::Login, "203.0.113.7", CheckOptions::failure());
/// assert!(result.allowed);
/// assert_eq!(result.remaining_attempts, 4);
/// ```
#[derive(Debug, Clone)]
pub struct RateLimiters<T: TimeSource = SystemTimeSource> {
    limiters: [RateLimiter<T>; 4],
}

impl Default for RateLimiters {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiters {
    /// Creates limiters with the preset limits of every policy
    /// using the system clock.
    #[inline]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates limiters with `settings` applied on top of the presets.
    #[inline]
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::builder().with_settings(settings)?.build())
    }

    /// Starts configuring limiters from the presets.
    #[inline]
    pub fn builder() -> RateLimitersBuilder {
        RateLimitersBuilder::default()
    }
}

impl<T: TimeSource> RateLimiters<T> {
    /// Limiter of `policy`.
    #[inline]
    pub fn get(&self, policy: Policy) -> &RateLimiter<T> {
        &self.limiters[policy.index()]
    }

    /// Limits applied by `policy`.
    #[inline]
    pub fn config(&self, policy: Policy) -> &RateLimitConfig {
        self.get(policy).config()
    }

    /// Checks whether an attempt for `identifier` under `policy` may proceed.
    ///
    /// See [`RateLimiter::check_limit`].
    pub fn check(&self, policy: Policy, identifier: &str, options: CheckOptions) -> RateLimitResult {
        let result = self.get(policy).check_limit(identifier, options);

        #[cfg(feature = "tracing")]
        if !result.allowed {
            tracing::debug!(
                policy = policy.name(),
                identifier,
                blocked = result.is_blocked,
                retry_after_secs = result.retry_after_secs,
                "rate limit check denied"
            );
        }

        result
    }

    /// Forgets `identifier` under `policy`.
    ///
    /// Returns `true` if there was anything to forget.
    #[inline]
    pub fn reset(&self, policy: Policy, identifier: &str) -> bool {
        self.get(policy).reset(identifier)
    }

    /// Forgets `identifier` under every policy.
    ///
    /// Returns the number of policies that tracked it.
    pub fn reset_all(&self, identifier: &str) -> usize {
        self.limiters
            .iter()
            .filter(|limiter| limiter.reset(identifier))
            .count()
    }

    /// Runs a cleanup sweep on every limiter.
    pub fn cleanup(&self) -> CleanupReport {
        self.limiters
            .iter()
            .map(|limiter| limiter.cleanup())
            .fold(CleanupReport::default(), |total, report| CleanupReport {
                attempts_removed: total.attempts_removed + report.attempts_removed,
                blocks_removed: total.blocks_removed + report.blocks_removed,
            })
    }
}

impl<T: TimeSource + Clone + 'static> RateLimiters<T> {
    /// Spawns a [`CleanupTask`] for every policy, each ticking at its
    /// limiter's [`RateLimitConfig::cleanup_interval`].
    ///
    /// The tasks stop once `token` is cancelled.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn spawn_cleanup(&self, token: CancellationToken) -> JoinSet<()> {
        let mut tasks = JoinSet::new();
        for policy in Policy::ALL {
            let task = CleanupTask::new(self.limiters[policy.index()].clone())
                .with_label(policy.name());
            tasks.spawn(task.run(token.clone()));
        }
        tasks
    }
}

/// Builds [`RateLimiters`] from the presets and overrides.
#[derive(Debug, Clone)]
pub struct RateLimitersBuilder {
    configs: [RateLimitConfig; 4],
}

impl Default for RateLimitersBuilder {
    #[inline]
    fn default() -> Self {
        Self { configs: Policy::ALL.map(Policy::default_config) }
    }
}

impl RateLimitersBuilder {
    /// Replaces the limits of `policy`.
    #[inline]
    pub fn with_policy(mut self, policy: Policy, config: RateLimitConfig) -> Self {
        self.configs[policy.index()] = config;
        self
    }

    /// Applies `settings` on top of the presets.
    ///
    /// Fails if any override is invalid.
    pub fn with_settings(mut self, settings: &Settings) -> Result<Self> {
        for policy in Policy::ALL {
            if let Some(overrides) = settings.policy(policy) {
                let base = self.configs[policy.index()];
                self.configs[policy.index()] = overrides.apply(policy, base)?;
            }
        }
        Ok(self)
    }

    /// Builds limiters using the system clock.
    #[inline]
    pub fn build(self) -> RateLimiters {
        self.build_with_time_source(SystemTimeSource)
    }

    /// Builds limiters sharing a custom [`TimeSource`].
    pub fn build_with_time_source<T: TimeSource + Clone>(self, time_source: T) -> RateLimiters<T> {
        let limiters = self.configs.map(|config| {
            RateLimiter::with_time_source(config, time_source.clone())
        });
        RateLimiters { limiters }
    }
}
