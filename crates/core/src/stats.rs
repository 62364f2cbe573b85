//! Exactness profiling.
//!
//! This module counts how many evaluated operations were exact. It provides:
//! 1. **Counters:** Total evaluated operations and those whose error term was zero.
//! 2. **Feature gate:** Counting only happens with the `profiling-exact` feature; without it
//!    [`ExactnessProfile::record`] compiles to nothing and the counters stay zero.
//! 3. **Report:** A one-line summary for the diagnostic stream at finalization.

use std::fmt;

/// Operation counters of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExactnessProfile {
    /// Operations evaluated by a policy that computes the error term.
    pub ops: u64,
    /// Of those, operations whose round-to-nearest result was exact.
    pub exact_ops: u64,
}

impl ExactnessProfile {
    /// True when the crate was built with counting enabled.
    pub const ENABLED: bool = cfg!(feature = "profiling-exact");

    /// Counts one evaluated operation.
    #[inline(always)]
    pub fn record(&mut self, exact: bool) {
        if Self::ENABLED {
            self.ops += 1;
            self.exact_ops += u64::from(exact);
        }
    }

    /// Zeroes both counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Share of exact operations, `None` before the first recorded operation.
    pub fn exact_ratio(&self) -> Option<f64> {
        (self.ops > 0).then(|| self.exact_ops as f64 / self.ops as f64)
    }
}

impl fmt::Display for ExactnessProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exact operations: {} / {}", self.exact_ops, self.ops)?;
        if let Some(ratio) = self.exact_ratio() {
            write!(f, " ({:.2}%)", ratio * 100.0)?;
        }
        Ok(())
    }
}
