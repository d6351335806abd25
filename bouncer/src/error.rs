//! Describes configuration errors

use std::{
    error::Error as StdError,
    fmt::{Display, Formatter}
};

/// A specialized [`Result`](std::result::Result) for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error produced while building rate limiters from configuration.
///
/// Checking a limit never fails; only configuration can.
#[derive(Debug)]
pub enum Error {
    /// A policy override has an unusable value
    InvalidConfig {
        /// Name of the offending policy
        policy: &'static str,
        /// What is wrong with it
        reason: &'static str,
    },

    /// The configuration source is not valid JSON or has an unexpected shape
    Parse(serde_json::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidConfig { policy, reason } => write!(f, "Configuration Error: {policy}: {reason}"),
            Error::Parse(err) => write!(f, "Configuration Error: unable to parse settings: {err}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::InvalidConfig { .. } => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    #[inline]
    fn from(err: serde_json::Error) -> Self {
        Error::Parse(err)
    }
}
