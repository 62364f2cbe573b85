use std::marker::PhantomData;

use rand::Rng;

use super::RoundingMode;
use crate::float::{Real, next_after, next_prev};
use crate::ops::Operation;
use crate::random::{Common, Discipline, FreeRunning, PerOperation};
use crate::session::RoundingState;
use crate::stats::ExactnessProfile;

/// Turns the nearest result of an operation into the emitted value.
///
/// A policy sees the operation's `(nearest, error)` pair, where `nearest + error` is the exact
/// result. Whenever `error == 0` the nearest result is returned untouched and no random number
/// is drawn.
pub trait RoundingPolicy: 'static {
    /// Mode this policy implements.
    const MODE: RoundingMode;

    /// Evaluates `Op` on `args` under this policy.
    fn round<Op: Operation>(args: Op::Args, state: &mut RoundingState) -> Op::Real;
}

/// Smallest representable value not below `nearest + error`.
#[inline(always)]
pub fn upper<R: Real, E: Real>(nearest: R, error: E) -> R {
    if error > E::ZERO { next_after(nearest) } else { nearest }
}

/// Largest representable value not above `nearest + error`.
#[inline(always)]
pub fn lower<R: Real, E: Real>(nearest: R, error: E) -> R {
    if error < E::ZERO { next_prev(nearest) } else { nearest }
}

/// The bracket of `nearest + error` that is not `nearest`. Requires `error != 0`.
#[inline(always)]
pub fn far<R: Real, E: Real>(nearest: R, error: E) -> R {
    if error > E::ZERO { next_after(nearest) } else { next_prev(nearest) }
}

#[inline(always)]
fn evaluate<Op: Operation>(args: Op::Args, state: &mut RoundingState) -> (Op::Real, Op::Error) {
    let (nearest, error) = Op::evaluate(args);
    state.profile.record(error == <Op::Error as Real>::ZERO);
    (nearest, error)
}

/// Hardware round-to-nearest. Computes the error only when profiling.
#[derive(Debug, Clone, Copy)]
pub struct Nearest;

/// Same results as [`Nearest`], reported under its own name.
#[derive(Debug, Clone, Copy)]
pub struct Native;

/// Rounds toward `+∞`.
#[derive(Debug, Clone, Copy)]
pub struct Upward;

/// Rounds toward `-∞`.
#[derive(Debug, Clone, Copy)]
pub struct Downward;

/// Rounds toward zero.
#[derive(Debug, Clone, Copy)]
pub struct TowardZero;

/// Emits the bracket farther from the exact result.
#[derive(Debug, Clone, Copy)]
pub struct Farthest;

/// Re-evaluates inexact operations in single precision.
#[derive(Debug, Clone, Copy)]
pub struct Float;

/// Either bracket with probability 1/2.
#[derive(Debug)]
pub struct Random<D>(PhantomData<D>);

/// Upper bracket with probability `p`, lower bracket otherwise.
#[derive(Debug)]
pub struct PRandom<D>(PhantomData<D>);

/// Far bracket with probability `|error| / ulp`, so the expected result is exact.
#[derive(Debug)]
pub struct Average<D>(PhantomData<D>);

#[inline(always)]
fn nearest_counted<Op: Operation>(args: Op::Args, state: &mut RoundingState) -> Op::Real {
    if ExactnessProfile::ENABLED {
        evaluate::<Op>(args, state).0
    } else {
        Op::nearest(args)
    }
}

impl RoundingPolicy for Nearest {
    const MODE: RoundingMode = RoundingMode::Nearest;

    #[inline(always)]
    fn round<Op: Operation>(args: Op::Args, state: &mut RoundingState) -> Op::Real {
        nearest_counted::<Op>(args, state)
    }
}

impl RoundingPolicy for Native {
    const MODE: RoundingMode = RoundingMode::Native;

    #[inline(always)]
    fn round<Op: Operation>(args: Op::Args, state: &mut RoundingState) -> Op::Real {
        nearest_counted::<Op>(args, state)
    }
}

impl RoundingPolicy for Upward {
    const MODE: RoundingMode = RoundingMode::Upward;

    #[inline(always)]
    fn round<Op: Operation>(args: Op::Args, state: &mut RoundingState) -> Op::Real {
        let (nearest, error) = evaluate::<Op>(args, state);
        upper(nearest, error)
    }
}

impl RoundingPolicy for Downward {
    const MODE: RoundingMode = RoundingMode::Downward;

    #[inline(always)]
    fn round<Op: Operation>(args: Op::Args, state: &mut RoundingState) -> Op::Real {
        let (nearest, error) = evaluate::<Op>(args, state);
        lower(nearest, error)
    }
}

impl RoundingPolicy for TowardZero {
    const MODE: RoundingMode = RoundingMode::TowardZero;

    #[inline(always)]
    fn round<Op: Operation>(args: Op::Args, state: &mut RoundingState) -> Op::Real {
        let (nearest, error) = evaluate::<Op>(args, state);
        let zero = <Op::Real as Real>::ZERO;
        if nearest > zero {
            lower(nearest, error)
        } else if nearest < zero {
            upper(nearest, error)
        } else {
            // Underflowed to zero: the exact result is within half a subnormal of it.
            nearest
        }
    }
}

impl RoundingPolicy for Farthest {
    const MODE: RoundingMode = RoundingMode::Farthest;

    #[inline(always)]
    fn round<Op: Operation>(args: Op::Args, state: &mut RoundingState) -> Op::Real {
        let (nearest, error) = evaluate::<Op>(args, state);
        if error == <Op::Error as Real>::ZERO {
            return nearest;
        }
        far(nearest, error)
    }
}

impl RoundingPolicy for Float {
    const MODE: RoundingMode = RoundingMode::Float;

    #[inline(always)]
    fn round<Op: Operation>(args: Op::Args, state: &mut RoundingState) -> Op::Real {
        let (nearest, error) = evaluate::<Op>(args, state);
        if error == <Op::Error as Real>::ZERO {
            return nearest;
        }
        Op::nearest_in_float(args)
    }
}

impl<D: Discipline> RoundingPolicy for Random<D> {
    const MODE: RoundingMode = D::RANDOM;

    #[inline(always)]
    fn round<Op: Operation>(args: Op::Args, state: &mut RoundingState) -> Op::Real {
        let (nearest, error) = evaluate::<Op>(args, state);
        if error == <Op::Error as Real>::ZERO {
            return nearest;
        }
        let keep: bool = D::generator::<Op>(&mut state.random, args).random();
        if keep { nearest } else { far(nearest, error) }
    }
}

impl<D: Discipline> RoundingPolicy for PRandom<D> {
    const MODE: RoundingMode = D::PRANDOM;

    #[inline(always)]
    fn round<Op: Operation>(args: Op::Args, state: &mut RoundingState) -> Op::Real {
        let (nearest, error) = evaluate::<Op>(args, state);
        if error == <Op::Error as Real>::ZERO {
            return nearest;
        }
        let p = state.random.prandom_p();
        let draw: f64 = D::generator::<Op>(&mut state.random, args).random();
        if draw < p {
            upper(nearest, error)
        } else {
            lower(nearest, error)
        }
    }
}

impl<D: Discipline> RoundingPolicy for Average<D> {
    const MODE: RoundingMode = D::AVERAGE;

    #[inline(always)]
    fn round<Op: Operation>(args: Op::Args, state: &mut RoundingState) -> Op::Real {
        let (nearest, error) = evaluate::<Op>(args, state);
        if error == <Op::Error as Real>::ZERO {
            return nearest;
        }
        let other = far(nearest, error);
        let gap = (other.to_f64() - nearest.to_f64()).abs();
        // An infinite gap (stepping past MAX) gives probability zero.
        let probability = error.to_f64().abs() / gap;
        let draw: f64 = D::generator::<Op>(&mut state.random, args).random();
        if draw < probability { other } else { nearest }
    }
}

/// RANDOM policy.
pub type RandomFree = Random<FreeRunning>;
/// RANDOM_DET policy.
pub type RandomDet = Random<PerOperation>;
/// RANDOM_COMDET policy.
pub type RandomComDet = Random<Common>;
/// PRANDOM policy.
pub type PRandomFree = PRandom<FreeRunning>;
/// PRANDOM_DET policy.
pub type PRandomDet = PRandom<PerOperation>;
/// PRANDOM_COMDET policy.
pub type PRandomComDet = PRandom<Common>;
/// AVERAGE policy.
pub type AverageFree = Average<FreeRunning>;
/// AVERAGE_DET policy.
pub type AverageDet = Average<PerOperation>;
/// AVERAGE_COMDET policy.
pub type AverageComDet = Average<Common>;
