//! # Randomness Discipline Tests
//!
//! Reproducibility of the three seeding disciplines and the seed/probability controls of a
//! session.

use perturb_core::{ConfigError, RoundingMode, Session};
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::common::session;

const THIRD: f64 = 1.0 / 3.0;

fn thirds(s: &mut Session, n: usize) -> Vec<f64> {
    (0..n).map(|_| s.div_f64(1.0, 3.0)).collect()
}

#[rstest]
#[case(RoundingMode::Random)]
#[case(RoundingMode::PRandom)]
#[case(RoundingMode::Average)]
fn test_free_running_is_reproducible_per_seed(#[case] mode: RoundingMode) {
    let first = thirds(&mut session(mode, 9), 128);
    let again = thirds(&mut session(mode, 9), 128);
    assert_eq!(first, again);
}

#[test]
fn test_different_seeds_diverge() {
    let a = thirds(&mut session(RoundingMode::Random, 9), 128);
    let b = thirds(&mut session(RoundingMode::Random, 10), 128);
    assert_ne!(a, b);
}

#[test]
fn test_random_is_balanced() {
    let mut s = session(RoundingMode::Random, 2024);
    let samples = 10_000;
    let up = thirds(&mut s, samples).into_iter().filter(|&r| r != THIRD).count();
    let ratio = up as f64 / samples as f64;
    assert!((0.46..0.54).contains(&ratio), "ratio {ratio}");
}

#[rstest]
#[case(RoundingMode::RandomDet)]
#[case(RoundingMode::PRandomDet)]
#[case(RoundingMode::AverageDet)]
fn test_per_operation_ignores_history(#[case] mode: RoundingMode) {
    let mut s = session(mode, 77);
    let first = s.div_f64(1.0, 3.0);
    for i in 1..50 {
        let _ = s.mul_f64(f64::from(i), 0.1);
    }
    assert_eq!(s.div_f64(1.0, 3.0), first);
    assert_eq!(session(mode, 77).div_f64(1.0, 3.0), first);
}

#[test]
fn test_per_operation_depends_on_operands() {
    let mut det = session(RoundingMode::RandomDet, 77);
    let mut upward = session(RoundingMode::Upward, 0);
    let mut downward = session(RoundingMode::Downward, 0);
    let (mut up, mut down) = (0, 0);
    for i in 1..200 {
        let d = f64::from(i) + 0.5;
        let r = det.div_f64(1.0, d);
        if r == upward.div_f64(1.0, d) {
            up += 1;
        }
        if r == downward.div_f64(1.0, d) {
            down += 1;
        }
    }
    assert!(up > 20, "{up}");
    assert!(down > 20, "{down}");
}

#[test]
fn test_per_operation_separates_kinds() {
    let mut s = session(RoundingMode::RandomDet, 3);
    let mut differs = false;
    for i in 1..64 {
        let x = f64::from(i) / 7.0;
        let sum = s.add_f64(x, 0.1) - (x + 0.1);
        let diff = s.sub_f64(x, -0.1) - (x + 0.1);
        differs |= sum.to_bits() != diff.to_bits();
    }
    assert!(differs);
}

#[rstest]
#[case(RoundingMode::RandomComDet)]
#[case(RoundingMode::PRandomComDet)]
#[case(RoundingMode::AverageComDet)]
fn test_common_stream_rewinds_per_scope(#[case] mode: RoundingMode) {
    let mut s = session(mode, 11);
    s.begin_instrumentation();
    let first = thirds(&mut s, 64);
    s.end_instrumentation();
    assert_eq!(s.div_f64(1.0, 3.0), THIRD);
    s.begin_instrumentation();
    assert_eq!(thirds(&mut s, 64), first);
}

#[test]
fn test_set_seed_matches_fresh_session() {
    let mut s = session(RoundingMode::Random, 1);
    let _ = thirds(&mut s, 10);
    s.set_seed(500);
    assert_eq!(s.seed(), 500);
    assert_eq!(s.config().seed, Some(500));
    assert_eq!(thirds(&mut s, 64), thirds(&mut session(RoundingMode::Random, 500), 64));
}

#[test]
fn test_reset_seed_replays() {
    let mut s = session(RoundingMode::Random, 31);
    let first = thirds(&mut s, 64);
    s.reset_seed();
    assert_eq!(thirds(&mut s, 64), first);
}

#[test]
fn test_last_seed_is_reproducible() {
    let mut a = session(RoundingMode::Random, 4);
    let mut b = session(RoundingMode::Random, 4);
    a.set_seed(5);
    b.set_seed(5);
    assert_eq!(a.last_seed(), b.last_seed());
}

#[test]
fn test_prandom_probability_controls() {
    let mut s = session(RoundingMode::PRandom, 8);
    let drawn = s.prandom_p();
    assert!((0.0..1.0).contains(&drawn));

    s.set_prandom_p(0.75).unwrap();
    assert_eq!(s.prandom_p(), 0.75);
    s.reset_seed();
    assert_eq!(s.prandom_p(), 0.75);

    let err = s.set_prandom_p(1.5).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidProbability(_)));
    assert_eq!(s.prandom_p(), 0.75);

    let updated = s.update_prandom_p();
    assert_eq!(s.prandom_p(), updated);
    assert_eq!(s.config().prandom_p, None);
}

#[test]
fn test_prandom_frequency_tracks_probability() {
    let mut s = session(RoundingMode::PRandom, 8);
    s.set_prandom_p(0.2).unwrap();
    let samples = 10_000;
    let up = thirds(&mut s, samples).into_iter().filter(|&r| r != THIRD).count();
    let ratio = up as f64 / samples as f64;
    assert!((0.17..0.23).contains(&ratio), "ratio {ratio}");
}
