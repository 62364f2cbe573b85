use rand::RngCore;
use rand_chacha::ChaCha8Rng;

use super::{OperationRng, RandomSource};
use crate::ops::Operation;
use crate::rounding::RoundingMode;

/// How a randomized policy obtains its generator for one operation.
///
/// Implemented by zero-sized marker types so that the choice is fixed when a backend table is
/// built and never branched on per operation.
pub trait Discipline: 'static {
    /// RANDOM mode drawing through this discipline.
    const RANDOM: RoundingMode;
    /// PRANDOM mode drawing through this discipline.
    const PRANDOM: RoundingMode;
    /// AVERAGE mode drawing through this discipline.
    const AVERAGE: RoundingMode;

    /// Stream type the discipline draws from.
    type Stream: RngCore;

    /// Generator to draw from for `Op` applied to `args`.
    fn generator<'a, Op: Operation>(
        source: &'a mut RandomSource,
        args: Op::Args,
    ) -> &'a mut Self::Stream;
}

/// Draws from the free-running stream.
#[derive(Debug, Clone, Copy)]
pub struct FreeRunning;

/// Draws from a stream reseeded from the operation and its operands.
#[derive(Debug, Clone, Copy)]
pub struct PerOperation;

/// Draws from the stream shared by the current instrumentation scope.
#[derive(Debug, Clone, Copy)]
pub struct Common;

impl Discipline for FreeRunning {
    const RANDOM: RoundingMode = RoundingMode::Random;
    const PRANDOM: RoundingMode = RoundingMode::PRandom;
    const AVERAGE: RoundingMode = RoundingMode::Average;

    type Stream = ChaCha8Rng;

    #[inline(always)]
    fn generator<'a, Op: Operation>(
        source: &'a mut RandomSource,
        _args: Op::Args,
    ) -> &'a mut ChaCha8Rng {
        source.free()
    }
}

impl Discipline for PerOperation {
    const RANDOM: RoundingMode = RoundingMode::RandomDet;
    const PRANDOM: RoundingMode = RoundingMode::PRandomDet;
    const AVERAGE: RoundingMode = RoundingMode::AverageDet;

    type Stream = OperationRng;

    #[inline(always)]
    fn generator<'a, Op: Operation>(
        source: &'a mut RandomSource,
        args: Op::Args,
    ) -> &'a mut OperationRng {
        source.operation(Op::key(args))
    }
}

impl Discipline for Common {
    const RANDOM: RoundingMode = RoundingMode::RandomComDet;
    const PRANDOM: RoundingMode = RoundingMode::PRandomComDet;
    const AVERAGE: RoundingMode = RoundingMode::AverageComDet;

    type Stream = ChaCha8Rng;

    #[inline(always)]
    fn generator<'a, Op: Operation>(
        source: &'a mut RandomSource,
        _args: Op::Args,
    ) -> &'a mut ChaCha8Rng {
        source.common()
    }
}
