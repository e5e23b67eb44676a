//! `mender remediate`: run one remediation sweep.

use anyhow::Result;
use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::adapters::dry_run::DryRunLedger;
use crate::cli::context::{AppContext, RunOptions};
use crate::cli::output::{output, table, truncate, CommandOutput};
use crate::services::{BatchSummary, DefectKind};

#[derive(Args, Debug)]
pub struct RemediateArgs {
    #[command(subcommand)]
    pub command: RemediateCommands,
}

/// Options shared by every sweep.
#[derive(Args, Debug, Clone, Copy)]
pub struct SweepArgs {
    /// Maximum records to process (defaults to remediation.default_batch_size)
    #[arg(short, long)]
    pub limit: Option<u32>,

    /// Override the pause between records, in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Use in-process mock collaborators instead of the HTTP services
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug)]
pub enum RemediateCommands {
    /// Regenerate placeholder names and missing species
    Characters(SweepArgs),
    /// Generate avatars for records without an active one
    Avatars(SweepArgs),
}

#[derive(Debug, serde::Serialize)]
pub struct RemediateOutput {
    pub dry_run: bool,
    #[serde(flatten)]
    pub summary: BatchSummary,
    /// Changes a dry run would have written.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub withheld: Vec<WithheldChange>,
}

/// One record a dry run would have changed.
#[derive(Debug, Clone, serde::Serialize)]
pub struct WithheldChange {
    pub record_id: Uuid,
    pub primary_name: Option<String>,
    pub species_id: Option<i64>,
    pub avatar_key: Option<String>,
}

impl WithheldChange {
    /// Collect the ledger's attribute updates and image activations, one
    /// entry per record in first-seen order.
    pub async fn from_ledger(ledger: &DryRunLedger) -> Vec<Self> {
        let mut changes: Vec<Self> = Vec::new();
        for character in ledger.characters().await {
            let change = Self::entry(&mut changes, character.id);
            change.primary_name = Some(character.primary_name);
            change.species_id = character.species_id;
        }
        for image in ledger.images().await {
            Self::entry(&mut changes, image.character_id).avatar_key = Some(image.storage_key);
        }
        changes
    }

    fn entry(changes: &mut Vec<Self>, record_id: Uuid) -> &mut Self {
        let index = match changes.iter().position(|c| c.record_id == record_id) {
            Some(index) => index,
            None => {
                changes.push(Self {
                    record_id,
                    primary_name: None,
                    species_id: None,
                    avatar_key: None,
                });
                changes.len() - 1
            }
        };
        &mut changes[index]
    }
}

impl CommandOutput for RemediateOutput {
    fn to_human(&self) -> String {
        let s = &self.summary;
        let mut lines = Vec::new();

        if let Some(error) = &s.job_error {
            lines.push(format!("{} failed: {error}", s.job_type.as_str()));
        } else {
            lines.push(format!(
                "{}{}: {} processed, {} succeeded, {} failed in {:.1}s",
                s.job_type.as_str(),
                if self.dry_run { " (dry run)" } else { "" },
                s.target_count,
                s.success_count,
                s.failure_count,
                s.duration_ms as f64 / 1000.0,
            ));
        }

        if !s.errors.is_empty() {
            let mut t = table(["RECORD", "ERROR"]);
            for e in &s.errors {
                let record = e.record_id.map_or_else(|| "-".to_string(), |id| id.to_string());
                t.add_row(vec![record, truncate(&e.error, 80)]);
            }
            lines.push(t.to_string());
        }

        if !self.withheld.is_empty() {
            let mut t = table(["RECORD", "NAME", "SPECIES", "AVATAR"]);
            for change in &self.withheld {
                t.add_row(vec![
                    change.record_id.to_string(),
                    change.primary_name.clone().unwrap_or_else(|| "-".to_string()),
                    change.species_id.map_or_else(|| "-".to_string(), |id| id.to_string()),
                    change.avatar_key.as_deref().map_or_else(|| "-".to_string(), |key| truncate(key, 48)),
                ]);
            }
            lines.push("Would write:".to_string());
            lines.push(t.to_string());
        }

        if let Some(id) = s.job_log_id {
            lines.push(format!("Job log: {id}"));
        }
        lines.join("\n")
    }
}

/// Run one sweep against an open context.
pub async fn run_sweep(ctx: &AppContext, kind: DefectKind, sweep: SweepArgs) -> Result<RemediateOutput> {
    let run = ctx.orchestrator(
        kind,
        RunOptions {
            delay_ms: sweep.delay_ms,
            dry_run: sweep.dry_run,
        },
    )?;

    let mut summary = run.orchestrator.run_batch(sweep.limit.unwrap_or(0)).await;
    let withheld = match &run.dry_run {
        Some(ledger) => {
            // The job log was withheld along with everything else.
            summary.job_log_id = None;
            WithheldChange::from_ledger(ledger).await
        }
        None => Vec::new(),
    };

    Ok(RemediateOutput {
        dry_run: sweep.dry_run,
        summary,
        withheld,
    })
}

pub async fn execute(args: RemediateArgs, json_mode: bool) -> Result<()> {
    let (kind, sweep) = match args.command {
        RemediateCommands::Characters(sweep) => (DefectKind::Attributes, sweep),
        RemediateCommands::Avatars(sweep) => (DefectKind::MissingAvatar, sweep),
    };

    let ctx = AppContext::load().await?;
    let result = run_sweep(&ctx, kind, sweep).await?;
    let failed = result.summary.is_job_failure();
    output(&result, json_mode);

    if failed {
        anyhow::bail!("remediation job failed before processing any record");
    }
    Ok(())
}
