//! Backend configuration.
//!
//! This module defines what a host configures before arithmetic is intercepted. It provides:
//! 1. **Structure:** [`BackendConfig`], deserialized from JSON or built in code.
//! 2. **Validation:** Range checks that turn a bad value into a fatal [`ConfigError`].
//! 3. **Seed resolution:** The unset seed becomes a value derived from the clock and the calling
//!    process and thread, so that independent runs differ by default.
//!
//! Mode names are case-insensitive in JSON (`"rounding_mode": "random_det"`).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;

use crate::common::ConfigError;
use crate::rounding::RoundingMode;

/// Configuration of a session.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Mode of the active table after configuration.
    #[serde(default)]
    pub rounding_mode: RoundingMode,

    /// Mode restored by `begin_instrumentation`; `None` means the same as `rounding_mode`.
    #[serde(default)]
    pub default_rounding_mode: Option<RoundingMode>,

    /// Generator seed; `None` is resolved from the clock and process/thread identity.
    #[serde(default)]
    pub seed: Option<u64>,

    /// PRANDOM probability of rounding up; `None` draws it from the generator at seeding.
    #[serde(default)]
    pub prandom_p: Option<f64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::with_mode(RoundingMode::Nearest)
    }
}

impl BackendConfig {
    /// Configuration selecting `mode` for both the active and the default table.
    pub const fn with_mode(mode: RoundingMode) -> Self {
        Self { rounding_mode: mode, default_rounding_mode: None, seed: None, prandom_p: None }
    }

    /// Sets a fixed seed.
    #[must_use]
    pub const fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Malformed`] for syntax errors and unknown fields, and the matching
    /// variant for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Mode `begin_instrumentation` switches to.
    pub fn default_mode(&self) -> RoundingMode {
        self.default_rounding_mode.unwrap_or(self.rounding_mode)
    }

    /// Checks value ranges.
    ///
    /// Mode availability is checked when the backend tables are built.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidProbability`] when `prandom_p` is outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(p) = self.prandom_p {
            let _ = check_probability(p)?;
        }
        Ok(())
    }
}

/// Accepts `p` when `0 <= p <= 1`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidProbability`] otherwise, including for NaN.
pub fn check_probability(p: f64) -> Result<f64, ConfigError> {
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(ConfigError::InvalidProbability(p.to_string()))
    }
}

/// Resolves the unset seed.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(entropy_seed)
}

fn entropy_seed() -> u64 {
    let micros = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_micros() as u64);
    let mut hasher = DefaultHasher::new();
    std::thread::current().id().hash(&mut hasher);
    micros ^ u64::from(std::process::id()) ^ hasher.finish()
}
