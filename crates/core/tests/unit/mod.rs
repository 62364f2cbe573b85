//! # Unit Components
//!
//! Tests organized bottom-up, following the layering of the backend: bit-level stepping,
//! error-free transformations, policies, randomness, tables, sessions and configuration.

/// ULP stepper adjacency and zero conventions.
pub mod ulp;



/// Seeding disciplines: reproducibility, balance, scope rewinds.
pub mod random;


/// Session lifecycle, scoping, extension calls and threads.
pub mod session;

/// Configuration documents, option parsing and diagnostics.
pub mod config;
