//! Project initialization
//!
//! Creates the `.mender/` directory, the default config file and a
//! migrated database.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::adapters::sqlite::{database_url, initialize_database};

use super::config::CONFIG_DIR;

/// Default configuration template content
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# mender configuration
# Override settings by editing this file, adding .mender/local.yaml, or
# setting environment variables with the MENDER_ prefix.
#
# Example environment variables:
#   export MENDER_DATABASE__PATH=/custom/path/mender.db
#   export MENDER_LOGGING__LEVEL=debug
#   export MENDER_REMEDIATION__DEFAULT_BATCH_SIZE=20

database:
  # Path to SQLite database file (project-local)
  path: ".mender/mender.db"
  max_connections: 5

logging:
  # trace, debug, info, warn, error
  level: "info"
  # json, pretty
  format: "pretty"
  # Uncomment for rolling JSON log files (daily, hourly, never)
  # log_dir: ".mender/logs"
  rotation: "daily"

remediation:
  placeholder_name: "Unnamed"
  unknown_species_id: 1
  human_species_name: "Human"
  default_batch_size: 50
  inter_item_delay_ms: 1000
  language_hint: "en"
  search_threshold: 0.6
  accept_threshold: 0.85
  # Extra synonyms, merged over the built-in table
  synonyms: {}

generation:
  base_url: "http://localhost:8080"
  timeout_secs: 120

image:
  base_url: "http://localhost:8188"
  timeout_secs: 300
  style_tag: "anime"

storage:
  base_url: "http://localhost:9000/characters"
  public_base_url: "http://localhost:9000/characters"
  timeout_secs: 60
"#;

/// Setup paths configuration
#[derive(Debug, Clone)]
pub struct SetupPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
    pub database_file: PathBuf,
}

impl SetupPaths {
    /// Setup paths rooted at `root`.
    pub fn new(root: &Path) -> Self {
        let config_dir = root.join(CONFIG_DIR);
        Self {
            config_file: config_dir.join("config.yaml"),
            database_file: config_dir.join("mender.db"),
            config_dir,
        }
    }

    /// Setup paths for the current directory
    pub fn current() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(Self::new(&current_dir))
    }

    pub fn is_initialized(&self) -> bool {
        self.config_file.exists() && self.database_file.exists()
    }
}

/// Create the configuration directory
pub fn create_config_dir(paths: &SetupPaths) -> Result<bool> {
    if paths.config_dir.exists() {
        return Ok(false);
    }

    fs::create_dir_all(&paths.config_dir).context("Failed to create config directory")?;
    Ok(true)
}

/// Write the default configuration file. Returns whether it was written.
pub fn create_config_file(paths: &SetupPaths, force: bool) -> Result<bool> {
    if paths.config_file.exists() && !force {
        return Ok(false);
    }

    fs::write(&paths.config_file, DEFAULT_CONFIG_TEMPLATE).context("Failed to write config file")?;
    Ok(true)
}

/// Create the database if needed and apply pending migrations.
///
/// Returns the number of migrations applied.
pub async fn run_migrations(paths: &SetupPaths) -> Result<usize> {
    let url = database_url(&paths.database_file.to_string_lossy());
    let pool = initialize_database(&url, None)
        .await
        .context("Failed to initialize database")?;

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(&pool)
        .await
        .context("Failed to read migration state")?;

    pool.close().await;
    Ok(usize::try_from(applied).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::Config;

    #[test]
    fn test_default_template_is_valid_config() {
        let config: Config = serde_yaml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        crate::infrastructure::config::ConfigLoader::validate(&config).unwrap();
        assert_eq!(config.database.path, ".mender/mender.db");
        assert_eq!(config.remediation.default_batch_size, 50);
    }

    #[tokio::test]
    async fn test_setup_creates_everything() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SetupPaths::new(dir.path());
        assert!(!paths.is_initialized());

        assert!(create_config_dir(&paths).unwrap());
        assert!(create_config_file(&paths, false).unwrap());
        assert!(!create_config_file(&paths, false).unwrap(), "existing file is kept");
        assert_eq!(run_migrations(&paths).await.unwrap(), 3);
        assert!(paths.is_initialized());

        // Re-running is harmless.
        assert_eq!(run_migrations(&paths).await.unwrap(), 3);
    }
}
