//! Common types shared across the backend.
//!
//! This module provides the error taxonomy of the backend:
//! 1. **Configuration errors:** Fatal misconfiguration reported before any arithmetic runs.
//! 2. **Extension errors:** Non-fatal problems with host extension calls.

/// Error types for configuration and extension calls.
pub mod error;

pub use error::{ConfigError, ExtensionError};
