//! Host extension calls.
//!
//! Besides intercepted arithmetic the host may invoke backend utilities by numeric identifier.
//! The set of utilities is closed:
//! 1. **Inexact** (id [`UserCall::INEXACT_ID`]): nudges a caller-owned value to one of its two
//!    neighbours, chosen by a free-running random bit. Used to mark a value as carrying
//!    rounding error it did not acquire through intercepted arithmetic.
//!
//! Raw calls arrive as an identifier plus a [`RawValue`]; [`UserCall::decode`] turns them into
//! the typed form or an [`ExtensionError`] the session reports and ignores.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::common::ExtensionError;
use crate::float::{Real, next_after, next_prev};

/// Value argument of a raw extension call.
#[derive(Debug)]
pub enum RawValue<'a> {
    /// Single-precision value.
    Float(&'a mut f32),
    /// Double-precision value.
    Double(&'a mut f64),
    /// Anything else, named by its type.
    Other(&'static str),
}

/// Target of an inexact perturbation.
#[derive(Debug)]
pub enum InexactTarget<'a> {
    /// Single-precision value.
    Float(&'a mut f32),
    /// Double-precision value.
    Double(&'a mut f64),
}

/// A decoded extension call.
#[derive(Debug)]
pub enum UserCall<'a> {
    /// Perturb a value to an adjacent representable value.
    Inexact(InexactTarget<'a>),
}

impl<'a> UserCall<'a> {
    /// Identifier of the inexact call.
    pub const INEXACT_ID: u32 = 0;

    /// Decodes a raw call.
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionError::UnknownCall`] for unknown identifiers and
    /// [`ExtensionError::UnsupportedValue`] when the value type does not fit the call.
    pub fn decode(id: u32, value: RawValue<'a>) -> Result<Self, ExtensionError> {
        match (id, value) {
            (Self::INEXACT_ID, RawValue::Float(x)) => Ok(Self::Inexact(InexactTarget::Float(x))),
            (Self::INEXACT_ID, RawValue::Double(x)) => {
                Ok(Self::Inexact(InexactTarget::Double(x)))
            }
            (Self::INEXACT_ID, RawValue::Other(ty)) => {
                Err(ExtensionError::UnsupportedValue { call: "inexact", ty })
            }
            (id, _) => Err(ExtensionError::UnknownCall(id)),
        }
    }

    /// Name of the call.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Inexact(_) => "inexact",
        }
    }

    /// Executes the call, drawing from `rng`.
    pub fn apply(self, rng: &mut ChaCha8Rng) {
        match self {
            Self::Inexact(InexactTarget::Float(x)) => perturb(x, rng),
            Self::Inexact(InexactTarget::Double(x)) => perturb(x, rng),
        }
    }
}

/// Steps a finite value up or down with probability 1/2. Non-finite values are left alone.
fn perturb<T: Real>(x: &mut T, rng: &mut ChaCha8Rng) {
    if !x.is_finite() {
        return;
    }
    let up: bool = rng.random();
    *x = if up { next_after(*x) } else { next_prev(*x) };
}
