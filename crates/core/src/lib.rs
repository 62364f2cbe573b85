//! Stochastic-arithmetic floating-point backend.
//!
//! This crate replaces the hardware's round-to-nearest result of every scalar floating-point
//! operation with an alternative rounding outcome. Running the same instrumented computation
//! several times under a randomized policy yields a distribution whose spread estimates the
//! sensitivity of the computation to rounding error. It provides:
//! 1. **Float layer:** The [`Real`] abstraction over `f32`/`f64` and the bit-level ULP stepper.
//! 2. **Error-free transformations:** Exact residuals of sums, products, quotients and FMAs.
//! 3. **Operations:** Add, sub, mul, div, fma and the double-to-float cast as [`ops::Operation`]s.
//! 4. **Rounding policies:** Nearest, directed, farthest, float and the randomized families.
//! 5. **Randomness:** A seedable generator consumed through three seeding disciplines.
//! 6. **Backend table:** One fully specialized function pointer per primitive, per policy.
//! 7. **Session:** The host-owned context (modes, seed, generator state, active table).
//!
//! # Example
//!
//! ```
//! use perturb_core::{BackendConfig, RoundingMode, Session};
//!
//! let mut session = Session::default();
//! session
//!     .configure(&BackendConfig::with_mode(RoundingMode::Upward))
//!     .unwrap();
//! let _table = session.init().unwrap();
//!
//! let tiny = 2f64.powi(-60);
//! assert_eq!(session.add_f64(1.0, tiny), 1.0 + f64::EPSILON);
//! ```

/// Shared error types.
pub mod common;
/// Backend configuration (serde) and seed resolution.
pub mod config;
/// Bit-level float helpers and the ULP stepper.
pub mod float;
/// Error-free transformations of sums, products and fused multiply-adds.
pub mod eft;
/// Arithmetic operations with their exact error terms.
pub mod ops;
/// Rounding modes and the policies that implement them.
pub mod rounding;
/// Seedable generator and its three consumption disciplines.
pub mod random;
/// Function-pointer table handed to the host and its builder.
pub mod backend;
/// Host-owned context.
pub mod session;
/// Host extension calls.
pub mod extension;
/// Command-line option parsing hook.
pub mod cli;
/// Exactness profiling counters.
pub mod stats;

/// Backend configuration; deserialize from JSON or build with [`BackendConfig::with_mode`].
pub use crate::config::BackendConfig;
/// Errors raised while configuring a session.
pub use crate::common::error::{ConfigError, ExtensionError};
/// Floating-point formats the engine is generic over.
pub use crate::float::Real;
/// Rounding modes selectable at configuration time.
pub use crate::rounding::RoundingMode;
/// Function-pointer table exposed to the host.
pub use crate::backend::BackendInterface;
/// Host-owned context; construct with [`Session::pre_init`] or `Session::default()`.
pub use crate::session::Session;
