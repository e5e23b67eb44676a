//! The per-record remediation contract shared by every executor.

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::JobType;

use super::candidate_selector::DefectKind;

/// Result of remediating a single record.
///
/// Executors never return errors; every failure is folded into
/// [`RemediationOutcome::Failed`] or [`RemediationOutcome::Skipped`] with
/// the underlying message preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RemediationOutcome {
    /// The record was repaired and persisted.
    Repaired,
    /// Nothing to do; an earlier run already fixed the record.
    AlreadyRemediated,
    /// A guard rejected the record (missing, or owned by someone else).
    Skipped { reason: String },
    /// A collaborator or persistence call failed.
    Failed { error: String },
}

impl RemediationOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped { reason: reason.into() }
    }

    pub fn failed(error: impl std::fmt::Display) -> Self {
        Self::Failed { error: error.to_string() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Repaired | Self::AlreadyRemediated)
    }

    /// The message to record in the job log for unsuccessful outcomes.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Skipped { reason } => Some(reason),
            Self::Failed { error } => Some(error),
            Self::Repaired | Self::AlreadyRemediated => None,
        }
    }
}

/// A remediation executor driven by the batch orchestrator.
#[async_trait]
pub trait Remediator: Send + Sync {
    /// Job type recorded in the job log.
    fn job_type(&self) -> JobType;

    /// Which defect this executor repairs; selects its candidates.
    fn defect_kind(&self) -> DefectKind;

    /// Per-batch setup, run once before any candidate. A failure here fails
    /// the whole job.
    async fn prepare(&self) -> DomainResult<()> {
        Ok(())
    }

    /// Repair one record. Must not panic or propagate errors.
    async fn remediate(&self, record_id: Uuid) -> RemediationOutcome;
}
