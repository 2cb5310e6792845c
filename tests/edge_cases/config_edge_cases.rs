//! Configuration loading edge cases

use std::env;
use tabcheck::config::SEQUENCE_ALGORITHM_ENV;
use tabcheck::{CheckConfig, CheckError, Checker, SequenceAlgorithm};

#[test]
fn test_config_from_env() {
    env::set_var(SEQUENCE_ALGORITHM_ENV, "lcs");
    let config = CheckConfig::from_env();
    assert_eq!(config.sequence_algorithm, SequenceAlgorithm::Lcs);

    env::set_var(SEQUENCE_ALGORITHM_ENV, "not-an-algorithm");
    assert_eq!(CheckConfig::from_env().sequence_algorithm, SequenceAlgorithm::Myers);

    env::remove_var(SEQUENCE_ALGORITHM_ENV);
    assert_eq!(Checker::from_env().config(), &CheckConfig::default());
}

#[test]
fn test_config_from_json() {
    let config = CheckConfig::from_json(r#"{"wrap_single_difference": false}"#).unwrap();
    assert!(!config.wrap_single_difference);
    assert_eq!(config.sequence_algorithm, SequenceAlgorithm::Myers);

    let config = CheckConfig::from_json("{}").unwrap();
    assert_eq!(config, CheckConfig::default());
}

#[test]
fn test_invalid_json_config() {
    let err = CheckConfig::from_json(r#"{"sequence_algorithm": "quantum"}"#).unwrap_err();
    assert!(matches!(err, CheckError::Json(_)));
}
