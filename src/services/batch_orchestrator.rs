//! Batch orchestrator.
//!
//! Drives one remediation sweep: select candidates, run the executor on
//! each one in order, pace the calls, and write a single job log entry.
//! A failing record never stops the batch.

use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::domain::models::{JobLogEntry, JobStatus, JobType, RecordError, RemediationConfig};
use crate::domain::ports::JobLogRepository;

use super::candidate_selector::CandidateSelector;
use super::remediator::{RemediationOutcome, Remediator};

/// Configuration for a batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Used when the caller passes a limit of zero.
    pub default_limit: u32,
    /// Pause between consecutive records.
    pub inter_item_delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            default_limit: 50,
            inter_item_delay: Duration::from_secs(1),
        }
    }
}

impl From<&RemediationConfig> for BatchConfig {
    fn from(config: &RemediationConfig) -> Self {
        Self {
            default_limit: config.default_batch_size,
            inter_item_delay: Duration::from_millis(config.inter_item_delay_ms),
        }
    }
}

/// Result of one batch run.
///
/// `success_count + errors.len() == target_count` always holds.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub job_type: JobType,
    pub target_count: u32,
    pub success_count: u32,
    pub failure_count: u32,
    pub errors: Vec<RecordError>,
    pub duration_ms: u64,
    /// Set when the job failed before any record was processed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_error: Option<String>,
    /// Id of the job log entry, when it was written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_log_id: Option<Uuid>,
}

impl BatchSummary {
    fn empty(job_type: JobType) -> Self {
        Self {
            job_type,
            target_count: 0,
            success_count: 0,
            failure_count: 0,
            errors: Vec::new(),
            duration_ms: 0,
            job_error: None,
            job_log_id: None,
        }
    }

    pub fn is_job_failure(&self) -> bool {
        self.job_error.is_some()
    }
}

/// Runs a remediator over the candidates of its defect kind.
pub struct BatchOrchestrator {
    selector: Arc<CandidateSelector>,
    remediator: Arc<dyn Remediator>,
    job_logs: Arc<dyn JobLogRepository>,
    config: BatchConfig,
}

impl BatchOrchestrator {
    pub fn new(
        selector: Arc<CandidateSelector>,
        remediator: Arc<dyn Remediator>,
        job_logs: Arc<dyn JobLogRepository>,
        config: BatchConfig,
    ) -> Self {
        Self {
            selector,
            remediator,
            job_logs,
            config,
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Run one batch of at most `limit` records (zero means the default).
    #[instrument(skip(self), fields(job_type = self.remediator.job_type().as_str()))]
    pub async fn run_batch(&self, limit: u32) -> BatchSummary {
        let started = Instant::now();
        let limit = if limit == 0 { self.config.default_limit } else { limit };
        let job_type = self.remediator.job_type();
        let defect = self.remediator.defect_kind();
        let mut summary = BatchSummary::empty(job_type);

        info!(limit, defect = defect.as_str(), "starting remediation batch");

        if let Err(e) = self.remediator.prepare().await {
            let message = format!("job failed before processing: {e}");
            error!(error = %e, "remediation batch aborted");
            summary.job_error = Some(message.clone());
            summary.duration_ms = elapsed_ms(started);
            summary.job_log_id = self
                .write_job_log(&summary, JobStatus::Failed, vec![RecordError::job_level(message)], limit)
                .await;
            return summary;
        }

        let candidates = self.selector.find_candidates(defect, limit).await;
        summary.target_count = u32::try_from(candidates.len()).unwrap_or(u32::MAX);

        if candidates.is_empty() {
            info!("no defective records found");
        }

        for (index, candidate) in candidates.iter().enumerate() {
            let outcome = self.remediate_one(candidate.id).await;
            match outcome.error_message() {
                None => summary.success_count += 1,
                Some(message) => summary.errors.push(RecordError::for_record(candidate.id, message)),
            }

            let is_last = index + 1 == candidates.len();
            if !is_last && !self.config.inter_item_delay.is_zero() {
                tokio::time::sleep(self.config.inter_item_delay).await;
            }
        }

        summary.failure_count = u32::try_from(summary.errors.len()).unwrap_or(u32::MAX);
        summary.duration_ms = elapsed_ms(started);

        info!(
            candidates = summary.target_count,
            succeeded = summary.success_count,
            failed = summary.failure_count,
            duration_ms = summary.duration_ms,
            "remediation batch finished"
        );

        let errors = summary.errors.clone();
        summary.job_log_id = self.write_job_log(&summary, JobStatus::Completed, errors, limit).await;
        summary
    }

    /// Run the executor on one record, turning a panic into a failure.
    async fn remediate_one(&self, record_id: Uuid) -> RemediationOutcome {
        match AssertUnwindSafe(self.remediator.remediate(record_id)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(record_id = %record_id, panic = %message, "remediator panicked");
                RemediationOutcome::failed(format!("remediator panicked: {message}"))
            }
        }
    }

    async fn write_job_log(
        &self,
        summary: &BatchSummary,
        status: JobStatus,
        errors: Vec<RecordError>,
        limit: u32,
    ) -> Option<Uuid> {
        let entry = JobLogEntry {
            id: Uuid::new_v4(),
            job_type: summary.job_type,
            status,
            target_count: summary.target_count,
            success_count: summary.success_count,
            failure_count: summary.failure_count,
            duration_seconds: summary.duration_ms as f64 / 1000.0,
            completed_at: chrono::Utc::now(),
            errors,
            metadata: serde_json::json!({
                "limit": limit,
                "defect_kind": self.remediator.defect_kind().as_str(),
                "inter_item_delay_ms": u64::try_from(self.config.inter_item_delay.as_millis()).unwrap_or(u64::MAX),
            }),
        };

        match self.job_logs.insert(&entry).await {
            Ok(()) => Some(entry.id),
            Err(e) => {
                warn!(job_id = %entry.id, error = %e, "failed to write job log");
                None
            }
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteCharacterRepository, SqliteJobLogRepository};
    use crate::domain::errors::{DomainError, DomainResult};
    use crate::domain::models::Character;
    use crate::domain::ports::CharacterRepository;
    use crate::services::candidate_selector::DefectKind;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use tokio::sync::Mutex;

    /// Scripted remediator: fails or panics for chosen records.
    #[derive(Default)]
    struct ScriptedRemediator {
        failing: HashSet<Uuid>,
        panicking: HashSet<Uuid>,
        fail_prepare: bool,
        seen: Mutex<Vec<Uuid>>,
    }

    #[async_trait]
    impl Remediator for ScriptedRemediator {
        fn job_type(&self) -> JobType {
            JobType::CharacterRemediation
        }

        fn defect_kind(&self) -> DefectKind {
            DefectKind::Attributes
        }

        async fn prepare(&self) -> DomainResult<()> {
            if self.fail_prepare {
                return Err(DomainError::DatabaseError("taxonomy unavailable".to_string()));
            }
            Ok(())
        }

        async fn remediate(&self, record_id: Uuid) -> RemediationOutcome {
            self.seen.lock().await.push(record_id);
            if self.panicking.contains(&record_id) {
                panic!("scripted panic");
            }
            if self.failing.contains(&record_id) {
                return RemediationOutcome::failed("generation timed out");
            }
            RemediationOutcome::Repaired
        }
    }

    struct Harness {
        characters: Arc<SqliteCharacterRepository>,
        job_logs: Arc<SqliteJobLogRepository>,
        config: RemediationConfig,
    }

    impl Harness {
        async fn new() -> Self {
            let pool = create_migrated_test_pool().await.unwrap();
            Self {
                characters: Arc::new(SqliteCharacterRepository::new(pool.clone())),
                job_logs: Arc::new(SqliteJobLogRepository::new(pool)),
                config: RemediationConfig::default(),
            }
        }

        async fn seed(&self, count: usize) -> Vec<Uuid> {
            let base = chrono::Utc::now() - chrono::Duration::hours(1);
            let mut ids = Vec::new();
            for i in 0..count {
                let record = Character::new(self.config.generator_user_id, "Unnamed")
                    .with_created_at(base + chrono::Duration::seconds(i as i64));
                self.characters.insert(&record).await.unwrap();
                ids.push(record.id);
            }
            ids
        }

        fn orchestrator(&self, remediator: Arc<dyn Remediator>) -> BatchOrchestrator {
            BatchOrchestrator::new(
                Arc::new(CandidateSelector::new(self.characters.clone(), &self.config)),
                remediator,
                self.job_logs.clone(),
                BatchConfig {
                    default_limit: 50,
                    inter_item_delay: Duration::ZERO,
                },
            )
        }
    }

    #[tokio::test]
    async fn test_zero_candidates_writes_completed_log() {
        let h = Harness::new().await;
        let summary = h.orchestrator(Arc::new(ScriptedRemediator::default())).run_batch(10).await;

        assert_eq!(summary.target_count, 0);
        assert_eq!(summary.success_count, 0);
        assert!(summary.errors.is_empty());

        let logs = h.job_logs.list_recent(10).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, JobStatus::Completed);
        assert_eq!(Some(logs[0].id), summary.job_log_id);
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_batch() {
        let h = Harness::new().await;
        let ids = h.seed(3).await;
        let remediator = Arc::new(ScriptedRemediator {
            failing: HashSet::from([ids[1]]),
            ..Default::default()
        });

        let summary = h.orchestrator(remediator.clone()).run_batch(10).await;
        assert_eq!(summary.target_count, 3);
        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.failure_count, 1);
        assert_eq!(summary.errors, vec![RecordError::for_record(ids[1], "generation timed out")]);
        assert_eq!(*remediator.seen.lock().await, ids);

        let log = h.job_logs.get(summary.job_log_id.unwrap()).await.unwrap().unwrap();
        assert_eq!(log.target_count, 3);
        assert_eq!(log.success_count, 2);
        assert_eq!(log.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_panic_is_recorded_as_failure() {
        let h = Harness::new().await;
        let ids = h.seed(2).await;
        let remediator = Arc::new(ScriptedRemediator {
            panicking: HashSet::from([ids[0]]),
            ..Default::default()
        });

        let summary = h.orchestrator(remediator).run_batch(10).await;
        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].record_id, Some(ids[0]));
        assert!(summary.errors[0].error.contains("scripted panic"));
    }

    #[tokio::test]
    async fn test_limit_caps_candidates_and_zero_uses_default() {
        let h = Harness::new().await;
        h.seed(4).await;
        let orchestrator = h.orchestrator(Arc::new(ScriptedRemediator::default()));

        assert_eq!(orchestrator.run_batch(2).await.target_count, 2);
        assert_eq!(orchestrator.run_batch(0).await.target_count, 4);
    }

    #[tokio::test]
    async fn test_prepare_failure_is_job_level() {
        let h = Harness::new().await;
        h.seed(2).await;
        let remediator = Arc::new(ScriptedRemediator {
            fail_prepare: true,
            ..Default::default()
        });

        let summary = h.orchestrator(remediator.clone()).run_batch(10).await;
        assert!(summary.is_job_failure());
        assert_eq!(summary.target_count, 0);
        assert!(summary.errors.is_empty());
        assert!(remediator.seen.lock().await.is_empty());

        let log = h.job_logs.get(summary.job_log_id.unwrap()).await.unwrap().unwrap();
        assert_eq!(log.status, JobStatus::Failed);
        assert_eq!(log.errors.len(), 1);
        assert_eq!(log.errors[0].record_id, None);
    }

    #[tokio::test]
    async fn test_delay_applied_between_items_only() {
        let h = Harness::new().await;
        h.seed(3).await;
        let orchestrator = BatchOrchestrator::new(
            Arc::new(CandidateSelector::new(h.characters.clone(), &h.config)),
            Arc::new(ScriptedRemediator::default()),
            h.job_logs.clone(),
            BatchConfig {
                default_limit: 50,
                inter_item_delay: Duration::from_millis(40),
            },
        );

        let started = Instant::now();
        orchestrator.run_batch(10).await;
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(80));
        assert!(elapsed < Duration::from_millis(120) + Duration::from_secs(1));
    }

    #[test]
    fn test_panic_message_extraction() {
        let boxed: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(boxed.as_ref()), "static message");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");
        let boxed: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
