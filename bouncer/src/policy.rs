//! Named rate limiting policies and their presets

use std::{fmt, str::FromStr, time::Duration};
use serde::{de, Deserialize, Deserializer};
use crate::{RateLimitConfig, Strategy};

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;

/// A named rate limiting policy.
///
/// | Policy | window | max attempts | block | strategy |
/// |---|---|---|---|---|
/// | `LOGIN` | 15 min | 5 | 30 min | sliding |
/// | `REGISTER` | 1 h | 3 | 2 h | fixed |
/// | `PASSWORD_RESET` | 1 h | 3 | 24 h | fixed |
/// | `API_GENERAL` | 15 min | 100 | 15 min | fixed |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Sign-in attempts
    Login,

    /// Account registrations
    Register,

    /// Password reset requests
    PasswordReset,

    /// Generic API calls
    ApiGeneral,
}

impl Policy {
    /// Every policy, in declaration order.
    pub const ALL: [Policy; 4] = [
        Policy::Login,
        Policy::Register,
        Policy::PasswordReset,
        Policy::ApiGeneral,
    ];

    /// Upper-case name of the policy, e.g. `PASSWORD_RESET`.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Policy::Login => "LOGIN",
            Policy::Register => "REGISTER",
            Policy::PasswordReset => "PASSWORD_RESET",
            Policy::ApiGeneral => "API_GENERAL",
        }
    }

    /// Preset limits of the policy.
    pub fn default_config(self) -> RateLimitConfig {
        match self {
            Policy::Login => RateLimitConfig::new(
                5,
                Duration::from_secs(15 * MINUTE),
                Duration::from_secs(30 * MINUTE),
                Strategy::SlidingWindow),
            Policy::Register => RateLimitConfig::new(
                3,
                Duration::from_secs(HOUR),
                Duration::from_secs(2 * HOUR),
                Strategy::FixedWindow),
            Policy::PasswordReset => RateLimitConfig::new(
                3,
                Duration::from_secs(HOUR),
                Duration::from_secs(24 * HOUR),
                Strategy::FixedWindow),
            Policy::ApiGeneral => RateLimitConfig::new(
                100,
                Duration::from_secs(15 * MINUTE),
                Duration::from_secs(15 * MINUTE),
                Strategy::FixedWindow),
        }
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Policy {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a string names no known policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPolicy(String);

impl fmt::Display for UnknownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown rate limiting policy: {}", self.0)
    }
}

impl std::error::Error for UnknownPolicy {}

impl FromStr for Policy {
    type Err = UnknownPolicy;

    /// Accepts `LOGIN` as well as `login`, and `-` in place of `_`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace('-', "_").to_ascii_uppercase();
        Policy::ALL
            .into_iter()
            .find(|policy| policy.name() == normalized)
            .ok_or_else(|| UnknownPolicy(s.to_owned()))
    }
}

impl<'de> Deserialize<'de> for Policy {
    /// Reads any spelling [`FromStr`] accepts.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}
