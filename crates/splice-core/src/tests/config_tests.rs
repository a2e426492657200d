//! Tests for [`EngineConfig`].

use rstest::rstest;

use crate::EngineConfig;

#[test]
fn default_config_has_expected_values() {
    let config = EngineConfig::default();
    assert!(config.validate_edits());
    assert!(!config.reject_parse_errors());
    assert_eq!(config.max_passes(), 1);
}

#[test]
fn custom_config_construction() {
    let config = EngineConfig::new(false, true, 5);
    assert!(!config.validate_edits());
    assert!(config.reject_parse_errors());
    assert_eq!(config.max_passes(), 5);
}

#[test]
fn zero_passes_is_clamped_to_one() {
    assert_eq!(EngineConfig::new(true, false, 0).max_passes(), 1);
}

#[rstest]
#[case("{}", EngineConfig::default())]
#[case(r#"{ "validate_edits": false }"#, EngineConfig::new(false, false, 1))]
#[case(
    r#"{ "reject_parse_errors": true, "max_passes": 3 }"#,
    EngineConfig::new(true, true, 3)
)]
fn config_deserialises_with_defaults(#[case] json: &str, #[case] expected: EngineConfig) {
    let config: EngineConfig = serde_json::from_str(json).expect("config should parse");
    assert_eq!(config, expected);
}

#[test]
fn zero_passes_from_json_reads_as_one() {
    let config: EngineConfig =
        serde_json::from_str(r#"{ "max_passes": 0 }"#).expect("config should parse");
    assert_eq!(config.max_passes(), 1);
}
