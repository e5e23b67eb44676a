//! Job log models: the audit trail of remediation runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which remediation sweep a job ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    CharacterRemediation,
    AvatarRemediation,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CharacterRemediation => "character_remediation",
            Self::AvatarRemediation => "avatar_remediation",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "character_remediation" => Some(Self::CharacterRemediation),
            "avatar_remediation" => Some(Self::AvatarRemediation),
            _ => None,
        }
    }
}

/// Terminal status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// The candidate list was processed to the end.
    Completed,
    /// The run failed before any candidate was processed.
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// One failed record inside a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordError {
    /// `None` for job-level failures that are not tied to a record.
    pub record_id: Option<Uuid>,
    pub error: String,
}

impl RecordError {
    pub fn for_record(record_id: Uuid, error: impl Into<String>) -> Self {
        Self { record_id: Some(record_id), error: error.into() }
    }

    pub fn job_level(error: impl Into<String>) -> Self {
        Self { record_id: None, error: error.into() }
    }
}

/// Immutable audit record written once per orchestrator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobLogEntry {
    pub id: Uuid,
    pub job_type: JobType,
    pub status: JobStatus,
    pub target_count: u32,
    pub success_count: u32,
    pub failure_count: u32,
    pub duration_seconds: f64,
    pub completed_at: DateTime<Utc>,
    pub errors: Vec<RecordError>,
    pub metadata: serde_json::Value,
}
