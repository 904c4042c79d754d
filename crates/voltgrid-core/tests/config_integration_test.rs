//! Integration tests for layered merge configuration
//!
//! These tests verify that configuration loading follows the correct
//! precedence: CLI arguments > Environment variables > Config file > Defaults

use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;
use voltgrid_core::config::{CliOverrides, ConfigSource, MergeConfig};

#[test]
fn test_default_configuration() {
    let config = MergeConfig::with_defaults();

    assert_eq!(config.search_radius_m.value, 100.0);
    assert_eq!(config.search_radius_m.source, ConfigSource::Default);
    assert_eq!(config.operator_match_max_distance_m.value, 50.0);
    assert_eq!(config.capacity_tolerance.value, 1);
    assert_eq!(config.sources.government_source("DE"), Some("BNA"));
    assert!(config.validate().is_ok());
}

#[test]
fn test_file_overrides_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
search_radius_m = 150.0
operator_match_max_distance_m = 30.0
address_similarity_threshold = 0.95

[sources.government]
AT = "ECONTROL"
ES = ""
"#
    )
    .unwrap();

    let config = MergeConfig::with_defaults().load_from_file(file.path()).unwrap();

    assert_eq!(config.search_radius_m.value, 150.0);
    assert_eq!(config.search_radius_m.source, ConfigSource::File);
    assert_eq!(config.operator_match_max_distance_m.value, 30.0);
    assert_eq!(config.address_similarity_threshold.value, 0.95);
    // Untouched keys keep their defaults
    assert_eq!(config.capacity_tolerance.value, 1);
    assert_eq!(config.capacity_tolerance.source, ConfigSource::Default);
    // New countries from the file, empty string = known without gov source
    assert_eq!(config.sources.government_source("AT"), Some("ECONTROL"));
    assert!(config.sources.is_known_country("ES"));
    assert_eq!(config.sources.government_source("ES"), None);
    // Defaults survive alongside file additions
    assert_eq!(config.sources.government_source("FR"), Some("FRGOV"));
}

#[test]
fn test_invalid_file_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "search_radius_m = \"not a number\"").unwrap();

    assert!(MergeConfig::with_defaults().load_from_file(file.path()).is_err());
}

#[test]
#[serial]
fn test_env_overrides_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "search_radius_m = 150.0").unwrap();

    env::set_var("VOLTGRID_SEARCH_RADIUS_M", "200");
    let config = MergeConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();
    env::remove_var("VOLTGRID_SEARCH_RADIUS_M");

    assert_eq!(config.search_radius_m.value, 200.0);
    assert_eq!(config.search_radius_m.source, ConfigSource::Environment);
}

#[test]
#[serial]
fn test_every_threshold_has_an_env_variable() {
    env::set_var("VOLTGRID_ADDRESS_SIMILARITY_THRESHOLD", "0.85");
    env::set_var("VOLTGRID_ADDRESS_CONFLICT_THRESHOLD", "0.4");
    env::set_var("VOLTGRID_OPERATOR_SIMILARITY_THRESHOLD", "0.95");
    env::set_var("VOLTGRID_OPERATOR_CONFLICT_THRESHOLD", "0.55");
    env::set_var("VOLTGRID_CAPACITY_TOLERANCE", "2");
    let config = MergeConfig::with_defaults().load_from_env();
    env::remove_var("VOLTGRID_ADDRESS_SIMILARITY_THRESHOLD");
    env::remove_var("VOLTGRID_ADDRESS_CONFLICT_THRESHOLD");
    env::remove_var("VOLTGRID_OPERATOR_SIMILARITY_THRESHOLD");
    env::remove_var("VOLTGRID_OPERATOR_CONFLICT_THRESHOLD");
    env::remove_var("VOLTGRID_CAPACITY_TOLERANCE");

    assert_eq!(config.address_similarity_threshold.value, 0.85);
    assert_eq!(config.address_conflict_threshold.value, 0.4);
    assert_eq!(config.operator_similarity_threshold.value, 0.95);
    assert_eq!(config.operator_conflict_threshold.value, 0.55);
    assert_eq!(config.capacity_tolerance.value, 2);
    assert_eq!(config.capacity_tolerance.source, ConfigSource::Environment);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_invalid_env_value_is_ignored() {
    env::set_var("VOLTGRID_SEARCH_RADIUS_M", "plenty");
    let config = MergeConfig::with_defaults().load_from_env();
    env::remove_var("VOLTGRID_SEARCH_RADIUS_M");

    assert_eq!(config.search_radius_m.value, 100.0);
    assert_eq!(config.search_radius_m.source, ConfigSource::Default);
}

#[test]
#[serial]
fn test_cli_overrides_everything() {
    env::set_var("VOLTGRID_SEARCH_RADIUS_M", "200");
    let config = MergeConfig::with_defaults()
        .load_from_env()
        .apply_cli_overrides(&CliOverrides { search_radius_m: Some(75.0) });
    env::remove_var("VOLTGRID_SEARCH_RADIUS_M");

    assert_eq!(config.search_radius_m.value, 75.0);
    assert_eq!(config.search_radius_m.source, ConfigSource::Cli);
}

#[test]
fn test_validation_rejects_bad_values() {
    let config = MergeConfig::with_defaults()
        .apply_cli_overrides(&CliOverrides { search_radius_m: Some(-5.0) });
    assert!(config.validate().is_err());
}
