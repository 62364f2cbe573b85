//! Error-free transformations.
//!
//! Each transformation returns the round-to-nearest result of an operation together with its
//! rounding error, both in working precision, such that `result + error` is the exact real
//! result. No wider format and no hardware FMA are used for sums and products:
//!
//! - **Sums:** Knuth's branch-free [`two_sum`], and Dekker's [`fast_two_sum`] when the magnitude
//!   ordering is known ([`ordered_two_sum`] establishes it with one comparison).
//! - **Products:** Veltkamp [`split`] followed by Dekker's product error ([`two_prod`]). Operands
//!   whose split would overflow, or products whose error would underflow, are first rescaled to
//!   the `[1, 2)` binade and the error is scaled back.
//! - **FMA:** Boldo–Muller `ErrFma` ([`fma_error`]), returning the leading term of the two-term
//!   error expansion. Underflowing products are scaled up first; only that path recomputes the
//!   scaled result with a hardware FMA.
//! - **Division:** Exact remainder of the quotient ([`division_error`]), on frexp mantissas when
//!   the back-multiplied quotient underflows.
//!
//! The transformations assume finite, non-overflowing results; callers pass non-finite results
//! through with a zero error.

use crate::float::Real;

/// Dekker's Fast2Sum. Requires `|a| >= |b|` (or `a == 0`).
#[inline(always)]
pub fn fast_two_sum<T: Real>(a: T, b: T) -> (T, T) {
    let s = a + b;
    let e = b - (s - a);
    (s, e)
}

/// Knuth's 2Sum: exact for any finite operands whose sum does not overflow.
#[inline(always)]
pub fn two_sum<T: Real>(a: T, b: T) -> (T, T) {
    let s = a + b;
    let a_virtual = s - b;
    let b_virtual = s - a_virtual;
    let a_roundoff = a - a_virtual;
    let b_roundoff = b - b_virtual;
    (s, a_roundoff + b_roundoff)
}

/// Fast2Sum after ordering the operands by magnitude.
#[inline(always)]
pub fn ordered_two_sum<T: Real>(a: T, b: T) -> (T, T) {
    if a.abs() >= b.abs() {
        fast_two_sum(a, b)
    } else {
        fast_two_sum(b, a)
    }
}

/// Veltkamp split: `hi + lo == a` with both halves fitting in half the significand.
///
/// Requires `|a| < T::SPLIT_LIMIT`.
#[inline(always)]
pub fn split<T: Real>(a: T) -> (T, T) {
    let c = T::SPLITTER * a;
    let hi = c - (c - a);
    let lo = a - hi;
    (hi, lo)
}

#[inline(always)]
fn dekker_error<T: Real>(a: T, b: T, p: T) -> T {
    let (a_hi, a_lo) = split(a);
    let (b_hi, b_lo) = split(b);
    (((a_hi * b_hi - p) + a_hi * b_lo) + a_lo * b_hi) + a_lo * b_lo
}

/// Error `a * b - p` of the round-to-nearest product `p = a * b`.
///
/// Exact whenever the error is representable (the product does not underflow). In the
/// underflow range the sign of the error is still exact; its magnitude is clamped to at least
/// the smallest subnormal so that a non-zero error is never reported as zero.
pub fn product_error<T: Real>(a: T, b: T, p: T) -> T {
    if !p.is_finite() || a == T::ZERO || b == T::ZERO {
        return T::ZERO;
    }
    let p_abs = p.abs();
    if a.abs() < T::SPLIT_LIMIT
        && b.abs() < T::SPLIT_LIMIT
        && p_abs >= T::PRODUCT_LOW
        && p_abs <= T::PRODUCT_HIGH
    {
        return dekker_error(a, b, p);
    }

    let (a_m, a_e) = a.frexp();
    let (b_m, b_e) = b.frexp();
    let scale = a_e + b_e;
    let scaled_error = dekker_error(a_m, b_m, p.ldexp(-scale));
    rescale_error(scaled_error, scale)
}

/// Round-to-nearest product and its error.
#[inline(always)]
pub fn two_prod<T: Real>(a: T, b: T) -> (T, T) {
    let p = a * b;
    (p, product_error(a, b, p))
}

/// Scales an error term back by `2^scale`, keeping a non-zero error non-zero.
fn rescale_error<T: Real>(error: T, scale: i32) -> T {
    let scaled = error.ldexp(scale);
    if scaled == T::ZERO && error != T::ZERO {
        T::DENORM_MIN.copysign(error)
    } else {
        scaled
    }
}

/// Leading term of the error `a * x + y - r` of the round-to-nearest FMA `r`.
///
/// Boldo–Muller: `a * x + y == r + r2 + r3` exactly, with `r2` returned. `r2 == 0` implies
/// `r3 == 0`, so a zero result means `r` is exact and the sign of `r2` is the sign of the error.
///
/// A product too small for its error to be representable, or one that overflows while the sum
/// does not, is first scaled by `2^s` together with `y` and `r`, so neither a clamped product
/// error nor an infinite product enters the cancellation.
pub fn fma_error<T: Real>(a: T, x: T, y: T, r: T) -> T {
    if !r.is_finite() {
        return T::ZERO;
    }
    let (u1, u2) = two_prod(a, x);
    if a == T::ZERO || x == T::ZERO || (u1.is_finite() && u1.abs() >= T::PRODUCT_LOW) {
        return boldo_muller(u1, u2, y, r);
    }

    let (a_m, a_e) = a.frexp();
    let (x_m, x_e) = x.frexp();
    let s = -(a_e + x_e);
    let y_s = y.ldexp(s);
    let r_s = r.ldexp(s);
    // `r` may have been rounded on the subnormal grid; `nearest - r_s` is exact.
    let nearest = a_m.mul_add(x_m, y_s);
    if !y_s.is_finite() || !r_s.is_finite() || !nearest.is_finite() {
        // |y| exceeds the product by far more than 2^p, so r == y and the error is the product.
        return if u1 == T::ZERO { T::DENORM_MIN.copysign(u1) } else { u1 };
    }
    let (p1, p2) = two_prod(a_m, x_m);
    let error = (nearest - r_s) + boldo_muller(p1, p2, y_s, nearest);
    rescale_error(error, -s)
}

/// ErrFma core given the exact product `u1 + u2`.
#[inline(always)]
fn boldo_muller<T: Real>(u1: T, u2: T, y: T, r: T) -> T {
    let (alpha1, alpha2) = two_sum(y, u2);
    let (beta1, beta2) = two_sum(u1, alpha1);
    let gamma = (beta1 - r) + beta2;
    let (r2, _r3) = fast_two_sum(gamma, alpha2);
    r2
}

/// Error `a / b - q` of the round-to-nearest quotient `q = a / b`.
///
/// The remainder `a - q * b` is exact; the returned error is the remainder divided by `b`,
/// rounded, and never zero for an inexact quotient. When `q * b` is too small for its product
/// error to be representable the remainder is taken on the frexp mantissas of `q` and `b`.
pub fn division_error<T: Real>(a: T, b: T, q: T) -> T {
    if !q.is_finite() || !b.is_finite() || a == T::ZERO {
        return T::ZERO;
    }
    let toward_quotient =
        if (a > T::ZERO) == (b > T::ZERO) { T::DENORM_MIN } else { -T::DENORM_MIN };
    if q == T::ZERO {
        return toward_quotient;
    }

    let p = q * b;
    if p.is_finite() && p.abs() >= T::PRODUCT_LOW {
        let residual = (a - p) - product_error(q, b, p);
        if residual == T::ZERO {
            return T::ZERO;
        }
        let e = residual / b;
        return if e == T::ZERO { toward_quotient } else { e };
    }

    let (q_m, q_e) = q.frexp();
    let (b_m, b_e) = b.frexp();
    let a_s = a.ldexp(-(q_e + b_e));
    let (p_s, p_err) = two_prod(q_m, b_m);
    let residual = (a_s - p_s) - p_err;
    if residual == T::ZERO {
        return T::ZERO;
    }
    rescale_error(residual / b_m, q_e)
}
