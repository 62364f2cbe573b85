//! # Session Lifecycle Tests
//!
//! Configuration through option vectors, instrumentation scoping, extension calls, profiling and
//! per-thread sessions.

use std::thread;

use perturb_core::extension::{InexactTarget, RawValue, UserCall};
use perturb_core::float::{next_after, next_prev};
use perturb_core::stats::ExactnessProfile;
use perturb_core::{ConfigError, ExtensionError, RoundingMode, Session};
use pretty_assertions::assert_eq;

use crate::common::{captured_session, session};

#[test]
fn test_parse_args_prints_banner() {
    let (mut s, buffer) = captured_session(RoundingMode::Nearest);
    s.parse_args(["--rounding-mode", "upward", "--seed", "3"]).unwrap();
    assert_eq!(buffer.contents(), "ROUNDING MODE : UPWARD\n");
    assert_eq!(s.rounding_mode(), RoundingMode::Upward);
    assert_eq!(s.default_rounding_mode(), RoundingMode::Upward);
    assert_eq!(s.seed(), 3);
}

#[test]
fn test_parse_args_rejects_unknown_mode() {
    let (mut s, buffer) = captured_session(RoundingMode::Downward);
    let err = s.parse_args(["--rounding-mode", "sideways"]).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownRoundingMode(ref name) if name == "sideways"));
    let message = err.to_string();
    assert!(message.starts_with("rounding-mode invalid value provided, must be one of: "));
    assert!(message.contains("random_comdet"));
    assert_eq!(ConfigError::EXIT_CODE, 42);
    assert_eq!(s.rounding_mode(), RoundingMode::Downward);
    assert_eq!(buffer.contents(), "");
}

#[test]
fn test_parse_args_rejects_ftz() {
    let (mut s, _buffer) = captured_session(RoundingMode::Nearest);
    let err = s.parse_args(["--rounding-mode", "FTZ"]).unwrap_err();
    assert!(matches!(err, ConfigError::Unimplemented(RoundingMode::Ftz)));
    assert_eq!(s.rounding_mode(), RoundingMode::Nearest);
}

#[test]
fn test_parse_args_keeps_unmentioned_options() {
    let (mut s, _buffer) = captured_session(RoundingMode::Random);
    s.parse_args(["--prandom-p", "0.25"]).unwrap();
    assert_eq!(s.rounding_mode(), RoundingMode::Random);
    assert_eq!(s.seed(), 1);
    assert_eq!(s.prandom_p(), 0.25);
}

#[test]
fn test_scoping_round_trip() {
    let mut s = session(RoundingMode::Upward, 0);
    let third = 1.0 / 3.0;
    assert_eq!(s.div_f64(1.0, 3.0), next_after(third));

    s.end_instrumentation();
    assert_eq!(s.rounding_mode(), RoundingMode::Nearest);
    assert_eq!(s.table().mode, RoundingMode::Nearest);
    assert_eq!(s.div_f64(1.0, 3.0), third);

    s.begin_instrumentation();
    assert_eq!(s.rounding_mode(), RoundingMode::Upward);
    assert_eq!(s.div_f64(1.0, 3.0), next_after(third));
}

#[test]
fn test_begin_instrumentation_uses_default_mode() {
    let mut s = Session::pre_init(Box::new(std::io::sink()));
    let config = perturb_core::BackendConfig {
        default_rounding_mode: Some(RoundingMode::Downward),
        ..perturb_core::BackendConfig::with_mode(RoundingMode::Upward)
    };
    s.configure(&config).unwrap();
    let table = s.init().unwrap();
    assert_eq!(table.mode, RoundingMode::Upward);
    s.begin_instrumentation();
    assert_eq!(s.rounding_mode(), RoundingMode::Downward);
    assert_eq!(s.default_rounding_mode(), RoundingMode::Downward);
}

#[test]
fn test_inexact_call_moves_one_ulp() {
    let mut s = session(RoundingMode::Nearest, 6);
    for _ in 0..16 {
        let mut x = 2.5_f64;
        s.user_call(UserCall::Inexact(InexactTarget::Double(&mut x)));
        assert!(x == next_after(2.5) || x == next_prev(2.5), "{x:e}");

        let mut y = -0.75_f32;
        s.user_call_raw(UserCall::INEXACT_ID, RawValue::Float(&mut y)).unwrap();
        assert!(y == next_after(-0.75_f32) || y == next_prev(-0.75_f32), "{y:e}");
    }
}

#[test]
fn test_unknown_user_call_is_reported_and_ignored() {
    let (mut s, buffer) = captured_session(RoundingMode::Nearest);
    let mut x = 1.0_f64;
    let err = s.user_call_raw(99, RawValue::Double(&mut x)).unwrap_err();
    assert_eq!(err, ExtensionError::UnknownCall(99));
    assert_eq!(x, 1.0);
    assert_eq!(buffer.contents(), "unknown user call id 99\n");

    let err = s.user_call_raw(UserCall::INEXACT_ID, RawValue::Other("i64")).unwrap_err();
    assert_eq!(err, ExtensionError::UnsupportedValue { call: "inexact", ty: "i64" });
    assert!(buffer.contents().ends_with("user call `inexact` does not support values of type `i64`\n"));
}

#[test]
fn test_profiling_counts_exact_operations() {
    let mut s = session(RoundingMode::Upward, 0);
    let _ = s.add_f64(1.0, 2.0);
    let _ = s.div_f64(1.0, 3.0);
    let _ = s.mul_f32(0.5, 4.0);
    let profile = s.profiling();
    if ExactnessProfile::ENABLED {
        assert_eq!(profile, ExactnessProfile { ops: 3, exact_ops: 2 });
    } else {
        assert_eq!(profile, ExactnessProfile::default());
    }
    s.reset_profiling();
    assert_eq!(s.profiling(), ExactnessProfile::default());
}

#[test]
fn test_finalize_reports_profile() {
    let (mut s, buffer) = captured_session(RoundingMode::Downward);
    let _ = s.init().unwrap();
    let _ = s.sub_f64(1.0, 0.1);
    s.finalize();
    if ExactnessProfile::ENABLED {
        assert_eq!(buffer.contents(), "exact operations: 0 / 1 (0.00%)\n");
    } else {
        assert_eq!(buffer.contents(), "");
    }
}

#[test]
fn test_sessions_per_thread_are_independent() {
    let run = |seed: u64| {
        thread::spawn(move || {
            let mut s = session(RoundingMode::Random, seed);
            (1..=256).map(|i| s.div_f64(1.0, f64::from(i) + 0.5)).collect::<Vec<_>>()
        })
    };
    let handles = [run(21), run(21), run(22)];
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results[0], results[1]);
    assert_ne!(results[0], results[2]);
}

#[test]
fn test_session_moves_between_threads() {
    let mut s = session(RoundingMode::Upward, 0);
    let first = s.div_f64(1.0, 3.0);
    let second = thread::spawn(move || s.div_f64(1.0, 3.0)).join().unwrap();
    assert_eq!(first, second);
}
