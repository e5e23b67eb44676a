use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project-local configuration directory.
pub const CONFIG_DIR: &str = ".mender";

/// Prefix for environment overrides, e.g. `MENDER_LOGGING__LEVEL`.
pub const ENV_PREFIX: &str = "MENDER_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),

    #[error("Invalid default_batch_size: {0}. Must be at least 1")]
    InvalidBatchSize(u32),

    #[error("Invalid {name}: {value}. Must be between 0.0 and 1.0")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("search_threshold ({0}) must not exceed accept_threshold ({1})")]
    ThresholdOrder(f64, f64),

    #[error("Placeholder name cannot be empty")]
    EmptyPlaceholderName,

    #[error("{0} base_url cannot be empty")]
    EmptyBaseUrl(&'static str),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .mender/config.yaml (project config, created by init)
    /// 3. .mender/local.yaml (project local overrides, optional)
    /// 4. Environment variables (MENDER_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(CONFIG_DIR)
    }

    /// Same as [`ConfigLoader::load`] with an explicit configuration directory.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Config> {
        let dir = dir.as_ref();
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.trim().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(config.database.max_connections));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(config.logging.rotation.clone()));
        }

        let remediation = &config.remediation;
        if remediation.default_batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(remediation.default_batch_size));
        }

        if remediation.placeholder_name.trim().is_empty() {
            return Err(ConfigError::EmptyPlaceholderName);
        }

        for (name, value) in [
            ("search_threshold", remediation.search_threshold),
            ("accept_threshold", remediation.accept_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }

        if remediation.search_threshold > remediation.accept_threshold {
            return Err(ConfigError::ThresholdOrder(
                remediation.search_threshold,
                remediation.accept_threshold,
            ));
        }

        for (collaborator, url) in [
            ("generation", &config.generation.base_url),
            ("image", &config.image.base_url),
            ("storage", &config.storage.base_url),
        ] {
            if url.trim().is_empty() {
                return Err(ConfigError::EmptyBaseUrl(collaborator));
            }
        }

        if config.storage.public_base_url.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "storage public_base_url cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database.path, ".mender/mender.db");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.remediation.placeholder_name, "Unnamed");
        assert_eq!(config.remediation.unknown_species_id, 1);
        assert_eq!(config.remediation.default_batch_size, 50);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
database:
  path: /custom/path.db
  max_connections: 3
logging:
  level: debug
  format: json
remediation:
  default_batch_size: 10
  inter_item_delay_ms: 250
  synonyms:
    sky folk: Aarakocra
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.database.path, "/custom/path.db");
        assert_eq!(config.database.max_connections, 3);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.remediation.default_batch_size, 10);
        assert_eq!(config.remediation.inter_item_delay_ms, 250);
        assert_eq!(config.remediation.synonyms.get("sky folk").map(String::as_str), Some("Aarakocra"));
        assert_eq!(config.remediation.placeholder_name, "Unnamed");

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "invalid"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidLogFormat(_)
        ));
    }

    #[test]
    fn test_validate_database() {
        let mut config = Config::default();
        config.database.path = String::new();
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::EmptyDatabasePath
        ));

        let mut config = Config::default();
        config.database.max_connections = 0;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidMaxConnections(0)
        ));
    }

    #[test]
    fn test_validate_zero_batch_size() {
        let mut config = Config::default();
        config.remediation.default_batch_size = 0;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidBatchSize(0)
        ));
    }

    #[test]
    fn test_validate_thresholds() {
        let mut config = Config::default();
        config.remediation.accept_threshold = 1.5;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidThreshold { name: "accept_threshold", .. }
        ));

        let mut config = Config::default();
        config.remediation.search_threshold = 0.9;
        config.remediation.accept_threshold = 0.8;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::ThresholdOrder(_, _)
        ));
    }

    #[test]
    fn test_validate_empty_base_url() {
        let mut config = Config::default();
        config.image.base_url = "  ".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::EmptyBaseUrl("image")
        ));
    }

    #[test]
    fn test_hierarchical_merging() {
        let dir = tempfile::tempdir().unwrap();

        let mut base = std::fs::File::create(dir.path().join("config.yaml")).unwrap();
        writeln!(base, "logging:\n  level: info\n  format: json\nremediation:\n  default_batch_size: 20").unwrap();

        let mut local = std::fs::File::create(dir.path().join("local.yaml")).unwrap();
        writeln!(local, "logging:\n  level: debug").unwrap();

        temp_env::with_var("MENDER_REMEDIATION__DEFAULT_BATCH_SIZE", Some("7"), || {
            let config = ConfigLoader::load_from_dir(dir.path()).unwrap();
            assert_eq!(config.logging.level, "debug", "local overrides project config");
            assert_eq!(config.logging.format, "json", "unset keys keep the base value");
            assert_eq!(config.remediation.default_batch_size, 7, "environment wins");
        });
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "remediation:\n  default_batch_size: 0").unwrap();
        file.flush().unwrap();

        assert!(ConfigLoader::load_from_file(file.path()).is_err());
    }
}
