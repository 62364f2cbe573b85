//! Host-facing function table.
//!
//! This module binds rounding policies to the intercepted primitives. It provides:
//! 1. **Table:** [`BackendInterface`], one plain function pointer per primitive and width.
//! 2. **Specialization:** [`BackendInterface::specialized`] monomorphizes every slot for one
//!    policy, so the pointer the host calls contains no branch on the mode.
//! 3. **Selection:** [`BackendInterface::for_mode`] maps a [`RoundingMode`] to its table and
//!    rejects modes without an implementation.
//! 4. **Identity:** [`backend_name`] and [`backend_version`].
//!
//! Tables are `Copy` and built without allocation, so switching between them at scope
//! boundaries costs a struct copy.

use std::fmt;

use tracing::debug;

use crate::common::ConfigError;
use crate::ops::{AddOp, CastOp, DivOp, FmaOp, MulOp, Operation, SubOp};
use crate::rounding::RoundingMode;
use crate::rounding::policy::{
    AverageComDet, AverageDet, AverageFree, Downward, Farthest, Float, Native, Nearest,
    PRandomComDet, PRandomDet, PRandomFree, RandomComDet, RandomDet, RandomFree, RoundingPolicy,
    TowardZero, Upward,
};
use crate::session::RoundingState;

/// Two-operand primitive.
pub type BinaryFn<T> = fn(T, T, &mut RoundingState) -> T;
/// Fused multiply-add primitive.
pub type TernaryFn<T> = fn(T, T, T, &mut RoundingState) -> T;
/// `f64 -> f32` narrowing primitive.
pub type CastFn = fn(f64, &mut RoundingState) -> f32;

/// Name the backend reports to the host.
pub const fn backend_name() -> &'static str {
    "perturb"
}

/// Version the backend reports to the host.
pub const fn backend_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Function table for one rounding mode.
#[derive(Clone, Copy)]
pub struct BackendInterface {
    /// Mode every slot is specialized for.
    pub mode: RoundingMode,
    /// `f32` addition.
    pub add_float: BinaryFn<f32>,
    /// `f32` subtraction.
    pub sub_float: BinaryFn<f32>,
    /// `f32` multiplication.
    pub mul_float: BinaryFn<f32>,
    /// `f32` division.
    pub div_float: BinaryFn<f32>,
    /// `f64` addition.
    pub add_double: BinaryFn<f64>,
    /// `f64` subtraction.
    pub sub_double: BinaryFn<f64>,
    /// `f64` multiplication.
    pub mul_double: BinaryFn<f64>,
    /// `f64` division.
    pub div_double: BinaryFn<f64>,
    /// `f64 -> f32` narrowing.
    pub cast_double_to_float: CastFn,
    /// `f32` fused multiply-add.
    pub fma_float: TernaryFn<f32>,
    /// `f64` fused multiply-add.
    pub fma_double: TernaryFn<f64>,
}

impl fmt::Debug for BackendInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendInterface").field("mode", &self.mode).finish_non_exhaustive()
    }
}

fn binary<P, Op, T>(a: T, b: T, state: &mut RoundingState) -> T
where
    P: RoundingPolicy,
    Op: Operation<Real = T, Args = (T, T)>,
{
    P::round::<Op>((a, b), state)
}

fn ternary<P, Op, T>(a: T, b: T, c: T, state: &mut RoundingState) -> T
where
    P: RoundingPolicy,
    Op: Operation<Real = T, Args = (T, T, T)>,
{
    P::round::<Op>((a, b, c), state)
}

fn cast<P: RoundingPolicy>(a: f64, state: &mut RoundingState) -> f32 {
    P::round::<CastOp>(a, state)
}

impl BackendInterface {
    /// Table whose every slot is `P` applied to the slot's operation.
    pub fn specialized<P: RoundingPolicy>() -> Self {
        Self {
            mode: P::MODE,
            add_float: binary::<P, AddOp<f32>, f32>,
            sub_float: binary::<P, SubOp<f32>, f32>,
            mul_float: binary::<P, MulOp<f32>, f32>,
            div_float: binary::<P, DivOp<f32>, f32>,
            add_double: binary::<P, AddOp<f64>, f64>,
            sub_double: binary::<P, SubOp<f64>, f64>,
            mul_double: binary::<P, MulOp<f64>, f64>,
            div_double: binary::<P, DivOp<f64>, f64>,
            cast_double_to_float: cast::<P>,
            fma_float: ternary::<P, FmaOp<f32>, f32>,
            fma_double: ternary::<P, FmaOp<f64>, f64>,
        }
    }

    /// Round-to-nearest table.
    pub fn nearest() -> Self {
        Self::specialized::<Nearest>()
    }

    /// Table for `mode`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Unimplemented`] for [`RoundingMode::Ftz`].
    pub fn for_mode(mode: RoundingMode) -> Result<Self, ConfigError> {
        let table = match mode {
            RoundingMode::Nearest => Self::specialized::<Nearest>(),
            RoundingMode::Native => Self::specialized::<Native>(),
            RoundingMode::Upward => Self::specialized::<Upward>(),
            RoundingMode::Downward => Self::specialized::<Downward>(),
            RoundingMode::TowardZero => Self::specialized::<TowardZero>(),
            RoundingMode::Random => Self::specialized::<RandomFree>(),
            RoundingMode::RandomDet => Self::specialized::<RandomDet>(),
            RoundingMode::RandomComDet => Self::specialized::<RandomComDet>(),
            RoundingMode::PRandom => Self::specialized::<PRandomFree>(),
            RoundingMode::PRandomDet => Self::specialized::<PRandomDet>(),
            RoundingMode::PRandomComDet => Self::specialized::<PRandomComDet>(),
            RoundingMode::Average => Self::specialized::<AverageFree>(),
            RoundingMode::AverageDet => Self::specialized::<AverageDet>(),
            RoundingMode::AverageComDet => Self::specialized::<AverageComDet>(),
            RoundingMode::Farthest => Self::specialized::<Farthest>(),
            RoundingMode::Float => Self::specialized::<Float>(),
            RoundingMode::Ftz => return Err(ConfigError::Unimplemented(mode)),
        };
        debug!(mode = %mode, "backend table built");
        Ok(table)
    }
}
