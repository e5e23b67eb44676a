//! Implementation of the `mender init` command.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::cli::output::{output, CommandOutput};
use crate::infrastructure::setup::{create_config_dir, create_config_file, run_migrations, SetupPaths};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub config_dir: PathBuf,
    pub config_written: bool,
    pub migrations_applied: usize,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if self.config_written {
            lines.push(format!("  config:   {}", self.config_dir.join("config.yaml").display()));
        }
        lines.push(format!("  database: {}", self.config_dir.join("mender.db").display()));
        lines.join("\n")
    }
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let paths = SetupPaths::new(&args.path);
    let was_initialized = paths.is_initialized();

    create_config_dir(&paths)?;
    let config_written = create_config_file(&paths, args.force)?;
    let migrations_applied = run_migrations(&paths).await?;

    let message = match (was_initialized, args.force) {
        (false, _) => "Project initialized.",
        (true, true) => "Project reinitialized; config file reset to defaults.",
        (true, false) => "Project already initialized; schema is up to date.",
    };

    output(
        &InitOutput {
            success: true,
            message: message.to_string(),
            config_dir: paths.config_dir,
            config_written,
            migrations_applied,
        },
        json_mode,
    );
    Ok(())
}
