//! ULP stepping on raw bit patterns.
//!
//! For finite IEEE-754 values of either sign, the magnitude ordering of values matches the
//! ordering of their bit patterns with the sign bit masked off. Adding one to the bit pattern
//! therefore yields the adjacent value of larger magnitude, subtracting one the adjacent value
//! of smaller magnitude.
//!
//! These helpers are only defined for finite inputs: stepping an infinity or a NaN produces
//! garbage (a NaN payload change or a wrap into the other sign). Debug builds check the
//! precondition.
//!
//! | function | `x > 0` | `x < 0` | `x == ±0` |
//! |----------|---------|---------|-----------|
//! | [`next_away_from_zero`] | up | down | `±DENORM_MIN` |
//! | [`next_toward_zero`] | down | up | `∓DENORM_MIN` |
//! | [`next_after`] | up | up | `+DENORM_MIN` |
//! | [`next_prev`] | down | down | `-DENORM_MIN` |

use super::Real;

/// Adjacent representable value of strictly greater magnitude, same sign.
///
/// Stepping away from `±MAX` yields `±∞`.
#[inline(always)]
pub fn next_away_from_zero<T: Real>(x: T) -> T {
    debug_assert!(x.is_finite(), "next_away_from_zero({x:?}) on a non-finite value");
    x.increment_bits()
}

/// Adjacent representable value of strictly smaller magnitude.
///
/// Zero has no smaller magnitude: by convention `±0` steps to the smallest subnormal of the
/// opposite sign, which is the next value past zero in the direction of travel.
#[inline(always)]
pub fn next_toward_zero<T: Real>(x: T) -> T {
    debug_assert!(x.is_finite(), "next_toward_zero({x:?}) on a non-finite value");
    if x == T::ZERO {
        return T::DENORM_MIN.copysign(-x);
    }
    x.decrement_bits()
}

/// Adjacent representable value toward `+∞`.
#[inline(always)]
pub fn next_after<T: Real>(x: T) -> T {
    if x == T::ZERO {
        T::DENORM_MIN
    } else if x > T::ZERO {
        next_away_from_zero(x)
    } else {
        next_toward_zero(x)
    }
}

/// Adjacent representable value toward `-∞`.
#[inline(always)]
pub fn next_prev<T: Real>(x: T) -> T {
    if x == T::ZERO {
        -T::DENORM_MIN
    } else if x > T::ZERO {
        next_toward_zero(x)
    } else {
        next_away_from_zero(x)
    }
}
