//! Arithmetic operations and their exact error terms.
//!
//! Every primitive the host intercepts is a zero-sized [`Operation`] type. An operation knows
//! how to compute:
//! 1. **Nearest:** The IEEE round-to-nearest-even result, exactly what the hardware returns.
//! 2. **Error:** The difference between the infinitely precise result and the nearest result,
//!    derived with the error-free transformations of [`crate::eft`].
//! 3. **Float:** The same operation evaluated on operands narrowed to `f32` and widened back,
//!    used by the FLOAT policy.
//! 4. **Key:** A digest of the operand bit patterns that the per-operation random discipline
//!    reseeds from.
//!
//! Non-finite results are passed through with a zero error, so every policy returns them
//! unchanged.

use std::marker::PhantomData;

use crate::eft;
use crate::float::Real;

/// Kind of an intercepted primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// `a + b`.
    Add,
    /// `a - b`.
    Sub,
    /// `a * b`.
    Mul,
    /// `a / b`.
    Div,
    /// `a * b + c`, rounded once.
    Fma,
    /// `f64 -> f32` narrowing.
    Cast,
}

impl OpKind {
    /// Short lower-case name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Fma => "fma",
            Self::Cast => "cast",
        }
    }

    /// Distinct constant mixed into per-operation seeds.
    pub const fn tag(self) -> u64 {
        match self {
            Self::Add => 0x6164_6400_0000_0001,
            Self::Sub => 0x7375_6200_0000_0002,
            Self::Mul => 0x6d75_6c00_0000_0003,
            Self::Div => 0x6469_7600_0000_0004,
            Self::Fma => 0x666d_6100_0000_0005,
            Self::Cast => 0x6361_7374_0000_0006,
        }
    }
}

/// An intercepted floating-point primitive.
pub trait Operation: 'static {
    /// Result format.
    type Real: Real;
    /// Format the error term is expressed in (wider than the result for the cast).
    type Error: Real;
    /// Operand pack.
    type Args: Copy;

    /// Which primitive this is.
    const KIND: OpKind;

    /// Round-to-nearest result.
    fn nearest(args: Self::Args) -> Self::Real;

    /// `exact - nearest`, given the result of [`Operation::nearest`].
    fn error(args: Self::Args, nearest: Self::Real) -> Self::Error;

    /// Result computed on `f32`-narrowed operands, widened back to the result format.
    fn nearest_in_float(args: Self::Args) -> Self::Real;

    /// Operand bit patterns, zero-padded to three slots.
    fn operand_bits(args: Self::Args) -> [u64; 3];

    /// Round-to-nearest result and its error.
    #[inline(always)]
    fn evaluate(args: Self::Args) -> (Self::Real, Self::Error) {
        let nearest = Self::nearest(args);
        (nearest, Self::error(args, nearest))
    }

    /// Digest of the operation kind, result width and operand bits.
    #[inline(always)]
    fn key(args: Self::Args) -> u64 {
        let [a, b, c] = Self::operand_bits(args);
        let mut h = Self::KIND.tag() ^ u64::from(<Self::Real as Real>::MANTISSA_BITS);
        for word in [a, b, c] {
            h = (h ^ word).wrapping_mul(0x0000_0100_0000_01b3).rotate_left(29);
        }
        h
    }
}

/// Addition.
#[derive(Debug)]
pub struct AddOp<T>(PhantomData<T>);

/// Subtraction.
#[derive(Debug)]
pub struct SubOp<T>(PhantomData<T>);

/// Multiplication.
#[derive(Debug)]
pub struct MulOp<T>(PhantomData<T>);

/// Division.
#[derive(Debug)]
pub struct DivOp<T>(PhantomData<T>);

/// Fused multiply-add `a * b + c`.
#[derive(Debug)]
pub struct FmaOp<T>(PhantomData<T>);

/// Narrowing `f64 -> f32` conversion.
#[derive(Debug)]
pub struct CastOp;

impl<T: Real> Operation for AddOp<T> {
    type Real = T;
    type Error = T;
    type Args = (T, T);
    const KIND: OpKind = OpKind::Add;

    #[inline(always)]
    fn nearest((a, b): (T, T)) -> T {
        a + b
    }

    #[inline(always)]
    fn error((a, b): (T, T), nearest: T) -> T {
        if !nearest.is_finite() {
            return T::ZERO;
        }
        eft::ordered_two_sum(a, b).1
    }

    #[inline(always)]
    fn nearest_in_float((a, b): (T, T)) -> T {
        T::from_f32(a.to_f32() + b.to_f32())
    }

    #[inline(always)]
    fn operand_bits((a, b): (T, T)) -> [u64; 3] {
        [a.bits_u64(), b.bits_u64(), 0]
    }
}

impl<T: Real> Operation for SubOp<T> {
    type Real = T;
    type Error = T;
    type Args = (T, T);
    const KIND: OpKind = OpKind::Sub;

    #[inline(always)]
    fn nearest((a, b): (T, T)) -> T {
        a - b
    }

    #[inline(always)]
    fn error((a, b): (T, T), nearest: T) -> T {
        if !nearest.is_finite() {
            return T::ZERO;
        }
        eft::two_sum(a, -b).1
    }

    #[inline(always)]
    fn nearest_in_float((a, b): (T, T)) -> T {
        T::from_f32(a.to_f32() - b.to_f32())
    }

    #[inline(always)]
    fn operand_bits((a, b): (T, T)) -> [u64; 3] {
        [a.bits_u64(), b.bits_u64(), 0]
    }
}

impl<T: Real> Operation for MulOp<T> {
    type Real = T;
    type Error = T;
    type Args = (T, T);
    const KIND: OpKind = OpKind::Mul;

    #[inline(always)]
    fn nearest((a, b): (T, T)) -> T {
        a * b
    }

    #[inline(always)]
    fn error((a, b): (T, T), nearest: T) -> T {
        eft::product_error(a, b, nearest)
    }

    #[inline(always)]
    fn nearest_in_float((a, b): (T, T)) -> T {
        T::from_f32(a.to_f32() * b.to_f32())
    }

    #[inline(always)]
    fn operand_bits((a, b): (T, T)) -> [u64; 3] {
        [a.bits_u64(), b.bits_u64(), 0]
    }
}

impl<T: Real> Operation for DivOp<T> {
    type Real = T;
    type Error = T;
    type Args = (T, T);
    const KIND: OpKind = OpKind::Div;

    #[inline(always)]
    fn nearest((a, b): (T, T)) -> T {
        a / b
    }

    /// `(a - q * b) / b`: the residual is exact, the final quotient rounds once.
    ///
    /// When that quotient underflows to zero the smallest subnormal with the error's sign
    /// stands in, so an inexact division never looks exact.
    #[inline(always)]
    fn error((a, b): (T, T), q: T) -> T {
        eft::division_error(a, b, q)
    }

    #[inline(always)]
    fn nearest_in_float((a, b): (T, T)) -> T {
        T::from_f32(a.to_f32() / b.to_f32())
    }

    #[inline(always)]
    fn operand_bits((a, b): (T, T)) -> [u64; 3] {
        [a.bits_u64(), b.bits_u64(), 0]
    }
}

impl<T: Real> Operation for FmaOp<T> {
    type Real = T;
    type Error = T;
    type Args = (T, T, T);
    const KIND: OpKind = OpKind::Fma;

    #[inline(always)]
    fn nearest((a, b, c): (T, T, T)) -> T {
        a.mul_add(b, c)
    }

    #[inline(always)]
    fn error((a, b, c): (T, T, T), nearest: T) -> T {
        eft::fma_error(a, b, c, nearest)
    }

    #[inline(always)]
    fn nearest_in_float((a, b, c): (T, T, T)) -> T {
        T::from_f32(a.to_f32().mul_add(b.to_f32(), c.to_f32()))
    }

    #[inline(always)]
    fn operand_bits((a, b, c): (T, T, T)) -> [u64; 3] {
        [a.bits_u64(), b.bits_u64(), c.bits_u64()]
    }
}

impl Operation for CastOp {
    type Real = f32;
    type Error = f64;
    type Args = f64;
    const KIND: OpKind = OpKind::Cast;

    #[inline(always)]
    fn nearest(a: f64) -> f32 {
        a as f32
    }

    /// The narrowing error is exact in `f64`: both values share the leading bits.
    #[inline(always)]
    fn error(a: f64, nearest: f32) -> f64 {
        if !nearest.is_finite() {
            return 0.0;
        }
        a - f64::from(nearest)
    }

    #[inline(always)]
    fn nearest_in_float(a: f64) -> f32 {
        a as f32
    }

    #[inline(always)]
    fn operand_bits(a: f64) -> [u64; 3] {
        [a.to_bits(), 0, 0]
    }
}
