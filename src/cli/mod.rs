//! Command-line interface for the `mender` binary.

pub mod commands;
pub mod context;
pub mod output;

use clap::{Parser, Subcommand};

use commands::{init::InitArgs, jobs::JobsArgs, remediate::RemediateArgs, species::SpeciesArgs};

#[derive(Parser, Debug)]
#[command(name = "mender", version, about = "Repair auto-generated character records")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create .mender/ with a default config and a migrated database
    Init(InitArgs),
    /// Run a remediation sweep
    Remediate(RemediateArgs),
    /// Inspect job logs
    Jobs(JobsArgs),
    /// Inspect the species taxonomy and the resolver
    Species(SpeciesArgs),
}

/// Print an error in the selected output mode and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "success": false,
            "error": err.to_string(),
            "causes": err.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>(),
        });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err}");
        for cause in err.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
    }
    std::process::exit(1);
}
