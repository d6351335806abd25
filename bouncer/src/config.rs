//! Loading policy overrides from JSON
//!
//! Settings map policy names to partial overrides of their presets:
//!
//! ```json
//! {
//!     "login": { "max_attempts": 3, "block_duration_ms": 120000 },
//!     "API_GENERAL": { "window_ms": 60000, "strategy": "sliding_window" }
//! }
//! ```
//!
//! Keys accept any spelling [`Policy`] parses from (`LOGIN`, `login`,
//! `password-reset`). Field names and strategies are snake case.
//! Omitted policies and omitted fields keep their preset values.

use std::{collections::HashMap, io::Read, time::Duration};
use serde::Deserialize;
use crate::{
    error::{Error, Result},
    Policy,
    RateLimitConfig,
    Strategy
};

/// Counting strategy as written in settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategySetting {
    /// See [`Strategy::FixedWindow`]
    FixedWindow,
    /// See [`Strategy::SlidingWindow`]
    SlidingWindow,
}

impl From<StrategySetting> for Strategy {
    #[inline]
    fn from(setting: StrategySetting) -> Self {
        match setting {
            StrategySetting::FixedWindow => Strategy::FixedWindow,
            StrategySetting::SlidingWindow => Strategy::SlidingWindow,
        }
    }
}

/// Partial override of a policy preset
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicySettings {
    /// Counting window in milliseconds
    pub window_ms: Option<u64>,

    /// Attempts allowed per window
    pub max_attempts: Option<u32>,

    /// Lockout length in milliseconds
    pub block_duration_ms: Option<u64>,

    /// Counting strategy
    pub strategy: Option<StrategySetting>,
}

impl PolicySettings {
    /// Applies the override on top of `base`.
    ///
    /// Fails if the result has a zero window, allows no attempts or never blocks.
    pub fn apply(&self, policy: Policy, base: RateLimitConfig) -> Result<RateLimitConfig> {
        let mut config = base;

        if let Some(window_ms) = self.window_ms {
            if window_ms == 0 {
                return Err(Error::InvalidConfig {
                    policy: policy.name(),
                    reason: "window_ms must be greater than zero",
                });
            }
            config = config.with_window(Duration::from_millis(window_ms));
        }

        if let Some(max_attempts) = self.max_attempts {
            if max_attempts == 0 {
                return Err(Error::InvalidConfig {
                    policy: policy.name(),
                    reason: "max_attempts must be greater than zero",
                });
            }
            config = config.with_max_attempts(max_attempts);
        }

        if let Some(block_duration_ms) = self.block_duration_ms {
            if block_duration_ms == 0 {
                return Err(Error::InvalidConfig {
                    policy: policy.name(),
                    reason: "block_duration_ms must be greater than zero",
                });
            }
            config = config.with_block_duration(Duration::from_millis(block_duration_ms));
        }

        if let Some(strategy) = self.strategy {
            config = config.with_strategy(strategy.into());
        }

        Ok(config)
    }
}

/// Per-policy overrides of the presets
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    overrides: HashMap<Policy, PolicySettings>,
}

impl Settings {
    /// Creates empty settings that keep every preset
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses settings from a JSON string and validates them
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parses settings from a JSON reader and validates them
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let settings: Self = serde_json::from_reader(reader)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Sets the override of `policy`
    #[inline]
    pub fn with_policy(mut self, policy: Policy, settings: PolicySettings) -> Self {
        self.overrides.insert(policy, settings);
        self
    }

    /// Override of `policy`, if any
    #[inline]
    pub fn policy(&self, policy: Policy) -> Option<&PolicySettings> {
        self.overrides.get(&policy)
    }

    /// Effective configuration of `policy`
    pub fn config(&self, policy: Policy) -> Result<RateLimitConfig> {
        let base = policy.default_config();
        match self.overrides.get(&policy) {
            Some(settings) => settings.apply(policy, base),
            None => Ok(base),
        }
    }

    /// Checks every override
    pub fn validate(&self) -> Result<()> {
        Policy::ALL
            .into_iter()
            .try_for_each(|policy| self.config(policy).map(|_| ()))
    }
}
