//! Configuration and extension-call error definitions.
//!
//! This module defines the error taxonomy of the backend. It provides:
//! 1. **Fatal configuration errors:** Unknown rounding mode, malformed seed or probability,
//!    selection of an unimplemented mode. Hosts must terminate with [`ConfigError::EXIT_CODE`];
//!    a misconfigured run must never silently fall back to another numerical behavior.
//! 2. **Extension errors:** Unknown user-call identifiers or value types, which are reported on
//!    the diagnostic stream and otherwise ignored.
//!
//! Arithmetic never fails: there is no error type for the per-operation path.

use thiserror::Error;

use crate::rounding::RoundingMode;

/// Fatal configuration error.
///
/// Each variant renders as a single diagnostic line naming the offending option and, where
/// applicable, its accepted values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The rounding mode name is not one of the accepted names (case-insensitive).
    #[error(
        "rounding-mode invalid value provided, must be one of: {accepted} (got `{0}`)",
        accepted = RoundingMode::ACCEPTED_NAMES
    )]
    UnknownRoundingMode(String),

    /// The seed is not an unsigned integer.
    #[error("seed invalid value provided, must be an integer (got `{0}`)")]
    InvalidSeed(String),

    /// The PRANDOM bias is not a probability.
    #[error("prandom-p invalid value provided, must be a number in [0, 1] (got `{0}`)")]
    InvalidProbability(String),

    /// The rounding mode exists but has no implementation (FTZ).
    #[error("rounding-mode {} is not implemented in this backend", .0.name())]
    Unimplemented(RoundingMode),

    /// The JSON configuration could not be deserialized.
    #[error("config invalid value provided: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The backend option vector could not be parsed.
    #[error("backend-options invalid: {0}")]
    Cli(String),
}

impl ConfigError {
    /// Process exit status a host uses after a fatal configuration error.
    pub const EXIT_CODE: i32 = 42;

    /// Name of the option the error refers to.
    pub const fn option(&self) -> &'static str {
        match self {
            Self::UnknownRoundingMode(_) | Self::Unimplemented(_) => "rounding-mode",
            Self::InvalidSeed(_) => "seed",
            Self::InvalidProbability(_) => "prandom-p",
            Self::Malformed(_) => "config",
            Self::Cli(_) => "backend-options",
        }
    }
}

/// Non-fatal error for host extension calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtensionError {
    /// The user-call identifier is not known to this backend.
    #[error("unknown user call id {0}")]
    UnknownCall(u32),

    /// The value handed to a known user call has an unsupported type.
    #[error("user call `{call}` does not support values of type `{ty}`")]
    UnsupportedValue {
        /// Name of the user call.
        call: &'static str,
        /// Name of the rejected value type.
        ty: &'static str,
    },
}
