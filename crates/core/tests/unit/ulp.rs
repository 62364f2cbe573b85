//! # ULP Stepper Tests
//!
//! Adjacency of the stepped values and the conventions at zero and at the ends of the range.

use perturb_core::float::{next_after, next_away_from_zero, next_prev, next_toward_zero};
use proptest::prelude::*;

use crate::common::{exact, finite_f32, finite_f64};

proptest! {
    #[test]
    fn test_away_then_toward_is_identity_f64(x in finite_f64()) {
        prop_assume!(x.abs() != f64::MAX && x != 0.0);
        prop_assert_eq!(next_toward_zero(next_away_from_zero(x)).to_bits(), x.to_bits());
        prop_assert_eq!(next_away_from_zero(next_toward_zero(x)).to_bits(), x.to_bits());
    }

    #[test]
    fn test_away_then_toward_is_identity_f32(x in finite_f32()) {
        prop_assume!(x.abs() != f32::MAX && x != 0.0);
        prop_assert_eq!(next_toward_zero(next_away_from_zero(x)).to_bits(), x.to_bits());
        prop_assert_eq!(next_away_from_zero(next_toward_zero(x)).to_bits(), x.to_bits());
    }

    #[test]
    fn test_next_after_is_adjacent(x in finite_f64()) {
        prop_assume!(x != f64::MAX);
        let up = next_after(x);
        prop_assert!(up > x);
        prop_assert_eq!(next_prev(up), x);
        prop_assert!(exact(up) > exact(x));
    }

    #[test]
    fn test_next_prev_is_below(x in finite_f32()) {
        prop_assume!(x != f32::MIN);
        let down = next_prev(x);
        prop_assert!(down < x);
        prop_assert_eq!(next_after(down), x);
    }
}

#[test]
fn test_zero_and_denormal_conventions() {
    assert_eq!(next_toward_zero(0.0_f64).to_bits(), (-f64::from_bits(1)).to_bits());
    assert_eq!(next_toward_zero(-0.0_f32).to_bits(), f32::from_bits(1).to_bits());
    assert_eq!(next_toward_zero(f64::from_bits(1)), 0.0);
    assert_eq!(next_away_from_zero(0.0_f64), f64::from_bits(1));
    assert_eq!(next_after(0.0_f32), f32::from_bits(1));
    assert_eq!(next_prev(-0.0_f64), -f64::from_bits(1));
}

#[test]
fn test_normal_subnormal_boundary() {
    let min_normal = f64::MIN_POSITIVE;
    let largest_subnormal = f64::from_bits(0x000f_ffff_ffff_ffff);
    assert_eq!(next_toward_zero(min_normal), largest_subnormal);
    assert_eq!(next_away_from_zero(largest_subnormal), min_normal);
}

#[test]
fn test_range_ends() {
    assert_eq!(next_after(f64::MAX), f64::INFINITY);
    assert_eq!(next_prev(-f32::MAX), f32::NEG_INFINITY);
    assert_eq!(next_toward_zero(-f64::MAX), next_after(-f64::MAX));
}
