//! IEEE-754 binary32/binary64 abstraction.
//!
//! The engine is generic over the two hardware formats. [`Real`] exposes what the error-free
//! transformations and the ULP stepper need and nothing more:
//! - **Bit access:** Raw bit patterns and their +1/-1 neighbours ([`Real::increment_bits`]).
//! - **Scaling:** Exact power-of-two scaling ([`Real::frexp`], [`Real::ldexp`]) used to keep the
//!   product splitting inside the range where it is error free.
//! - **Splitting constants:** Veltkamp splitter and the magnitude limits of the fast product path.
//! - **Conversions:** To and from `f32` for the FLOAT policy, to `f64` for probability ratios.

/// Adjacent-representable-value stepping.
pub mod ulp;

pub use ulp::{next_after, next_away_from_zero, next_prev, next_toward_zero};

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// A hardware floating-point format (`f32` or `f64`).
///
/// This is a *sealed* trait.
pub trait Real:
    Copy
    + Default
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + fmt::LowerExp
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
    + 'static
    + sealed::Sealed
{
    /// Unsigned integer of the same width.
    type Bits: Copy + Eq + fmt::Debug + fmt::LowerHex + Into<u64>;

    /// Format name (`"float"` or `"double"`).
    const NAME: &'static str;
    /// Positive zero.
    const ZERO: Self;
    /// One.
    const ONE: Self;
    /// Smallest positive subnormal.
    const DENORM_MIN: Self;
    /// Largest finite value.
    const MAX: Self;
    /// Stored (explicit) significand bits: 23 or 52.
    const MANTISSA_BITS: u32;
    /// Exponent bias: 127 or 1023.
    const EXPONENT_BIAS: i32;
    /// Largest unbiased exponent of a finite value.
    const MAX_EXP: i32;
    /// Smallest unbiased exponent of a normal value.
    const MIN_EXP: i32;
    /// Veltkamp splitter `2^ceil(p/2) + 1`.
    const SPLITTER: Self;
    /// Operand magnitude above which `SPLITTER * x` may overflow.
    const SPLIT_LIMIT: Self;
    /// Smallest product magnitude whose rounding error is always representable.
    const PRODUCT_LOW: Self;
    /// Largest product magnitude for which the split partial products cannot overflow.
    const PRODUCT_HIGH: Self;

    /// Raw IEEE-754 bit pattern.
    fn to_bits(self) -> Self::Bits;
    /// Value from a raw bit pattern.
    fn from_bits(bits: Self::Bits) -> Self;
    /// Value whose bit pattern is `bits + 1` (wrapping).
    fn increment_bits(self) -> Self;
    /// Value whose bit pattern is `bits - 1` (wrapping).
    fn decrement_bits(self) -> Self;

    /// Absolute value.
    fn abs(self) -> Self;
    /// True for values that are neither infinite nor NaN.
    fn is_finite(self) -> bool;
    /// True for NaN.
    fn is_nan(self) -> bool;
    /// Magnitude of `self` with the sign of `sign`.
    fn copysign(self, sign: Self) -> Self;
    /// Round-to-nearest fused multiply-add `self * a + b`.
    fn mul_add(self, a: Self, b: Self) -> Self;

    /// Widening (exact) conversion to `f64`.
    fn to_f64(self) -> f64;
    /// Round-to-nearest conversion to `f32`.
    fn to_f32(self) -> f32;
    /// Exact conversion from `f32`.
    fn from_f32(x: f32) -> Self;

    /// `2^k` for `MIN_EXP <= k <= MAX_EXP`.
    fn pow2(k: i32) -> Self;

    /// Bit pattern widened to `u64`.
    #[inline(always)]
    fn bits_u64(self) -> u64 {
        self.to_bits().into()
    }

    /// Splits a finite non-zero value into `m * 2^e` with `1 <= |m| < 2`.
    ///
    /// Zero and non-finite values are returned unchanged with exponent 0.
    fn frexp(self) -> (Self, i32);

    /// `self * 2^k`, rounded once at the end when the result is subnormal.
    ///
    /// Intermediate steps stay between the input and the result magnitude, so the scaling is
    /// exact whenever both are normal.
    fn ldexp(self, k: i32) -> Self {
        let mut x = self;
        let mut k = k;
        while k > Self::MAX_EXP {
            x = x * Self::pow2(Self::MAX_EXP);
            k -= Self::MAX_EXP;
            if !x.is_finite() {
                return x;
            }
        }
        while k < Self::MIN_EXP {
            x = x * Self::pow2(Self::MIN_EXP);
            k -= Self::MIN_EXP;
            if x == Self::ZERO {
                return x;
            }
        }
        x * Self::pow2(k)
    }
}

macro_rules! impl_real {
    (
        $real:ty, $bits:ty, $name:literal,
        mantissa = $mant:literal, bias = $bias:literal,
        splitter = $splitter:expr, split_limit = $split_limit:expr,
        product_low = $product_low:expr, product_high = $product_high:expr
    ) => {
        impl Real for $real {
            type Bits = $bits;

            const NAME: &'static str = $name;
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const DENORM_MIN: Self = <$real>::from_bits(1);
            const MAX: Self = <$real>::MAX;
            const MANTISSA_BITS: u32 = $mant;
            const EXPONENT_BIAS: i32 = $bias;
            const MAX_EXP: i32 = $bias;
            const MIN_EXP: i32 = 1 - $bias;
            const SPLITTER: Self = $splitter;
            const SPLIT_LIMIT: Self = $split_limit;
            const PRODUCT_LOW: Self = $product_low;
            const PRODUCT_HIGH: Self = $product_high;

            #[inline(always)]
            fn to_bits(self) -> $bits {
                <$real>::to_bits(self)
            }

            #[inline(always)]
            fn from_bits(bits: $bits) -> Self {
                <$real>::from_bits(bits)
            }

            #[inline(always)]
            fn increment_bits(self) -> Self {
                <$real>::from_bits(<$real>::to_bits(self).wrapping_add(1))
            }

            #[inline(always)]
            fn decrement_bits(self) -> Self {
                <$real>::from_bits(<$real>::to_bits(self).wrapping_sub(1))
            }

            #[inline(always)]
            fn abs(self) -> Self {
                <$real>::abs(self)
            }

            #[inline(always)]
            fn is_finite(self) -> bool {
                <$real>::is_finite(self)
            }

            #[inline(always)]
            fn is_nan(self) -> bool {
                <$real>::is_nan(self)
            }

            #[inline(always)]
            fn copysign(self, sign: Self) -> Self {
                <$real>::copysign(self, sign)
            }

            #[inline(always)]
            fn mul_add(self, a: Self, b: Self) -> Self {
                <$real>::mul_add(self, a, b)
            }

            #[inline(always)]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline(always)]
            fn to_f32(self) -> f32 {
                self as f32
            }

            #[inline(always)]
            fn from_f32(x: f32) -> Self {
                x as $real
            }

            #[inline(always)]
            fn pow2(k: i32) -> Self {
                debug_assert!((<Self as Real>::MIN_EXP..=<Self as Real>::MAX_EXP).contains(&k));
                <$real>::from_bits(((k + $bias) as $bits) << $mant)
            }

            fn frexp(self) -> (Self, i32) {
                const EXP_MASK: $bits = (1 << (<$bits>::BITS - 1 - $mant)) - 1;
                let bits = <$real>::to_bits(self);
                let biased = ((bits >> $mant) & EXP_MASK) as i32;
                if biased == 0 {
                    if self == 0.0 {
                        return (self, 0);
                    }
                    // Subnormal: renormalize by 2^(p) first, which is exact.
                    let (m, e) = (self * Self::pow2($mant + 1)).frexp();
                    return (m, e - ($mant + 1));
                }
                if biased == EXP_MASK as i32 {
                    return (self, 0);
                }
                let m = <$real>::from_bits(
                    (bits & !(EXP_MASK << $mant)) | (($bias as $bits) << $mant),
                );
                (m, biased - $bias)
            }
        }
    };
}

impl_real!(
    f32, u32, "float",
    mantissa = 23, bias = 127,
    splitter = 4097.0,
    split_limit = f32::from_bits((114 + 127) << 23),
    product_low = f32::from_bits((127 - 102) << 23),
    product_high = f32::from_bits((124 + 127) << 23)
);

impl_real!(
    f64, u64, "double",
    mantissa = 52, bias = 1023,
    splitter = 134_217_729.0,
    split_limit = f64::from_bits((995 + 1023) << 52),
    product_low = f64::from_bits((1023 - 969) << 52),
    product_high = f64::from_bits((1020 + 1023) << 52)
);
