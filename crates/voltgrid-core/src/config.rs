use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VoltgridError};
use crate::sources::SourcePriorities;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// CLI overrides applied on top of file and environment configuration.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub search_radius_m: Option<f64>,
}

/// Layered merge configuration: defaults < config file < environment < CLI.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Radius of the candidate search around each seed station, in metres.
    pub search_radius_m: ConfigValue<f64>,
    /// Tighter secondary distance bound for operator-only matches.
    pub operator_match_max_distance_m: ConfigValue<f64>,
    /// Normalized-Levenshtein cutoff above which two addresses match.
    pub address_similarity_threshold: ConfigValue<f64>,
    /// Similarity below which two fully-present addresses conflict.
    pub address_conflict_threshold: ConfigValue<f64>,
    /// Jaro-Winkler cutoff above which two operator names match.
    pub operator_similarity_threshold: ConfigValue<f64>,
    /// Similarity below which two present operator names conflict.
    pub operator_conflict_threshold: ConfigValue<f64>,
    /// Maximum socket-count difference still considered a capacity match.
    pub capacity_tolerance: ConfigValue<i32>,
    /// Per-country source priorities used by the merge resolver.
    pub sources: SourcePriorities,
}

impl MergeConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            search_radius_m: ConfigValue::new(100.0, ConfigSource::Default),
            operator_match_max_distance_m: ConfigValue::new(50.0, ConfigSource::Default),
            address_similarity_threshold: ConfigValue::new(0.9, ConfigSource::Default),
            address_conflict_threshold: ConfigValue::new(0.5, ConfigSource::Default),
            operator_similarity_threshold: ConfigValue::new(0.9, ConfigSource::Default),
            operator_conflict_threshold: ConfigValue::new(0.6, ConfigSource::Default),
            capacity_tolerance: ConfigValue::new(1, ConfigSource::Default),
            sources: SourcePriorities::default(),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| VoltgridError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| VoltgridError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        if let Some(v) = file_config.search_radius_m {
            self.search_radius_m.update(v, ConfigSource::File);
        }
        if let Some(v) = file_config.operator_match_max_distance_m {
            self.operator_match_max_distance_m.update(v, ConfigSource::File);
        }
        if let Some(v) = file_config.address_similarity_threshold {
            self.address_similarity_threshold.update(v, ConfigSource::File);
        }
        if let Some(v) = file_config.address_conflict_threshold {
            self.address_conflict_threshold.update(v, ConfigSource::File);
        }
        if let Some(v) = file_config.operator_similarity_threshold {
            self.operator_similarity_threshold.update(v, ConfigSource::File);
        }
        if let Some(v) = file_config.operator_conflict_threshold {
            self.operator_conflict_threshold.update(v, ConfigSource::File);
        }
        if let Some(v) = file_config.capacity_tolerance {
            self.capacity_tolerance.update(v, ConfigSource::File);
        }

        // Government-source table: an empty string marks a country that is
        // known but has no government registry.
        if let Some(government) = file_config.sources.and_then(|s| s.government) {
            for (country, source) in government {
                let source = if source.is_empty() { None } else { Some(source) };
                self.sources.set_government_source(&country, source);
            }
        }

        Ok(self)
    }

    /// Load configuration from environment variables. Every threshold has
    /// a `VOLTGRID_`-prefixed variable named after its field.
    pub fn load_from_env(mut self) -> Self {
        env_override(&mut self.search_radius_m, "VOLTGRID_SEARCH_RADIUS_M");
        env_override(
            &mut self.operator_match_max_distance_m,
            "VOLTGRID_OPERATOR_MATCH_MAX_DISTANCE_M",
        );
        env_override(
            &mut self.address_similarity_threshold,
            "VOLTGRID_ADDRESS_SIMILARITY_THRESHOLD",
        );
        env_override(&mut self.address_conflict_threshold, "VOLTGRID_ADDRESS_CONFLICT_THRESHOLD");
        env_override(
            &mut self.operator_similarity_threshold,
            "VOLTGRID_OPERATOR_SIMILARITY_THRESHOLD",
        );
        env_override(
            &mut self.operator_conflict_threshold,
            "VOLTGRID_OPERATOR_CONFLICT_THRESHOLD",
        );
        env_override(&mut self.capacity_tolerance, "VOLTGRID_CAPACITY_TOLERANCE");
        self
    }

    /// Apply CLI argument overrides (highest precedence).
    pub fn apply_cli_overrides(mut self, overrides: &CliOverrides) -> Self {
        if let Some(v) = overrides.search_radius_m {
            self.search_radius_m.update(v, ConfigSource::Cli);
        }
        self
    }

    /// Validate the assembled configuration.
    pub fn validate(&self) -> Result<()> {
        if self.search_radius_m.value <= 0.0 {
            return Err(VoltgridError::ConfigInvalid {
                key: "search_radius_m".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.operator_match_max_distance_m.value <= 0.0 {
            return Err(VoltgridError::ConfigInvalid {
                key: "operator_match_max_distance_m".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        for (key, value) in [
            ("address_similarity_threshold", self.address_similarity_threshold.value),
            ("address_conflict_threshold", self.address_conflict_threshold.value),
            ("operator_similarity_threshold", self.operator_similarity_threshold.value),
            ("operator_conflict_threshold", self.operator_conflict_threshold.value),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(VoltgridError::ConfigInvalid {
                    key: key.to_string(),
                    reason: "must be between 0 and 1".to_string(),
                });
            }
        }
        if self.capacity_tolerance.value < 0 {
            return Err(VoltgridError::ConfigInvalid {
                key: "capacity_tolerance".to_string(),
                reason: "must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

/// Apply one environment variable on top of a configuration value.
/// Unparseable values are warn-logged and ignored.
fn env_override<T: std::str::FromStr>(value: &mut ConfigValue<T>, key: &str) {
    if let Ok(raw) = env::var(key) {
        match raw.parse::<T>() {
            Ok(v) => value.update(v, ConfigSource::Environment),
            Err(_) => tracing::warn!("Invalid {} value '{}': expected a number", key, raw),
        }
    }
}

/// Configuration file format (TOML)
#[derive(Debug, Deserialize)]
struct FileConfig {
    search_radius_m: Option<f64>,
    operator_match_max_distance_m: Option<f64>,
    address_similarity_threshold: Option<f64>,
    address_conflict_threshold: Option<f64>,
    operator_similarity_threshold: Option<f64>,
    operator_conflict_threshold: Option<f64>,
    capacity_tolerance: Option<i32>,
    sources: Option<FileSources>,
}

#[derive(Debug, Deserialize)]
struct FileSources {
    government: Option<BTreeMap<String, String>>,
}
