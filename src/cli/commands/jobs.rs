//! `mender jobs`: inspect the job log.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::cli::context::AppContext;
use crate::cli::output::{output, table, truncate, CommandOutput};
use crate::domain::models::JobLogEntry;
use crate::domain::ports::JobLogRepository;

#[derive(Args, Debug)]
pub struct JobsArgs {
    #[command(subcommand)]
    pub command: JobsCommands,
}

#[derive(Subcommand, Debug)]
pub enum JobsCommands {
    /// List recent jobs, newest first
    List {
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },
    /// Show one job with its per-record errors
    Show {
        /// Job ID
        id: Uuid,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct JobListOutput {
    pub jobs: Vec<JobLogEntry>,
}

impl CommandOutput for JobListOutput {
    fn to_human(&self) -> String {
        if self.jobs.is_empty() {
            return "No jobs recorded.".to_string();
        }

        let mut t = table(["ID", "TYPE", "STATUS", "TARGET", "OK", "FAILED", "SECONDS", "COMPLETED"]);
        for job in &self.jobs {
            t.add_row(vec![
                job.id.to_string()[..8].to_string(),
                job.job_type.as_str().to_string(),
                job.status.as_str().to_string(),
                job.target_count.to_string(),
                job.success_count.to_string(),
                job.failure_count.to_string(),
                format!("{:.1}", job.duration_seconds),
                job.completed_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ]);
        }
        format!("{t}\n{} job(s)", self.jobs.len())
    }
}

#[derive(Debug, serde::Serialize)]
pub struct JobDetailOutput {
    pub job: JobLogEntry,
}

impl CommandOutput for JobDetailOutput {
    fn to_human(&self) -> String {
        let job = &self.job;
        let mut lines = vec![
            format!("Job: {}", job.id),
            format!("Type: {}", job.job_type.as_str()),
            format!("Status: {}", job.status.as_str()),
            format!(
                "Records: {} targeted, {} succeeded, {} failed",
                job.target_count, job.success_count, job.failure_count
            ),
            format!("Duration: {:.2}s", job.duration_seconds),
            format!("Completed: {}", job.completed_at.format("%Y-%m-%d %H:%M:%S UTC")),
        ];

        if !job.errors.is_empty() {
            let mut t = table(["RECORD", "ERROR"]);
            for e in &job.errors {
                let record = e.record_id.map_or_else(|| "(job)".to_string(), |id| id.to_string());
                t.add_row(vec![record, truncate(&e.error, 100)]);
            }
            lines.push(String::new());
            lines.push(t.to_string());
        }
        lines.join("\n")
    }
}

pub async fn execute(args: JobsArgs, json_mode: bool) -> Result<()> {
    let ctx = AppContext::load().await?;
    let repo = ctx.job_logs();

    match args.command {
        JobsCommands::List { limit } => {
            let jobs = repo.list_recent(limit).await.context("Failed to list jobs")?;
            output(&JobListOutput { jobs }, json_mode);
        }
        JobsCommands::Show { id } => {
            let job = repo
                .get(id)
                .await
                .context("Failed to load job")?
                .ok_or_else(|| anyhow::anyhow!("Job not found: {id}"))?;
            output(&JobDetailOutput { job }, json_mode);
        }
    }
    Ok(())
}
