//! # Configuration Tests
//!
//! JSON documents, error diagnostics and option names.

use perturb_core::{BackendConfig, ConfigError, RoundingMode, Session};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn test_full_document() {
    let config = BackendConfig::from_json(
        r#"{
            "rounding_mode": "AVERAGE_DET",
            "default_rounding_mode": "nearest",
            "seed": 123456789,
            "prandom_p": 0.5
        }"#,
    )
    .unwrap();
    assert_eq!(
        config,
        BackendConfig {
            rounding_mode: RoundingMode::AverageDet,
            default_rounding_mode: Some(RoundingMode::Nearest),
            seed: Some(123456789),
            prandom_p: Some(0.5),
        }
    );
}

#[rstest]
#[case(r#"{"rounding_mode": "sideways"}"#, "rounding-mode invalid value provided")]
#[case(r#"{"mode": "upward"}"#, "unknown field `mode`")]
#[case(r#"{"seed": -4}"#, "invalid value")]
#[case(r#"{"seed": "#, "EOF")]
fn test_malformed_documents(#[case] json: &str, #[case] fragment: &str) {
    let err = BackendConfig::from_json(json).unwrap_err();
    assert!(matches!(err, ConfigError::Malformed(_)));
    assert_eq!(err.option(), "config");
    assert!(err.to_string().contains(fragment), "{err}");
}

#[rstest]
#[case(ConfigError::UnknownRoundingMode("x".into()), "rounding-mode")]
#[case(ConfigError::Unimplemented(RoundingMode::Ftz), "rounding-mode")]
#[case(ConfigError::InvalidSeed("x".into()), "seed")]
#[case(ConfigError::InvalidProbability("x".into()), "prandom-p")]
#[case(ConfigError::Cli("x".into()), "backend-options")]
fn test_diagnostic_names_option(#[case] err: ConfigError, #[case] option: &str) {
    assert_eq!(err.option(), option);
    assert!(err.to_string().starts_with(option), "{err}");
}

#[test]
fn test_ftz_message() {
    assert_eq!(
        ConfigError::Unimplemented(RoundingMode::Ftz).to_string(),
        "rounding-mode FTZ is not implemented in this backend"
    );
}

#[test]
fn test_configure_rejects_invalid_probability() {
    let mut s = Session::pre_init(Box::new(std::io::sink()));
    let config = BackendConfig { prandom_p: Some(-0.1), ..BackendConfig::with_mode(RoundingMode::PRandom) };
    let err = s.configure(&config).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidProbability(_)));
    assert_eq!(s.rounding_mode(), RoundingMode::Nearest);
}

#[test]
fn test_unseeded_sessions_get_a_seed() {
    let mut s = Session::pre_init(Box::new(std::io::sink()));
    s.configure(&BackendConfig::with_mode(RoundingMode::Random)).unwrap();
    assert_eq!(s.config().seed, None);
    let resolved = s.seed();
    s.reset_seed();
    assert_eq!(s.seed(), resolved);
}
