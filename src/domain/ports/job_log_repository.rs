use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::JobLogEntry;

/// Append-only store for job log entries.
#[async_trait]
pub trait JobLogRepository: Send + Sync {
    /// Append an entry. Entries are never updated afterwards.
    async fn insert(&self, entry: &JobLogEntry) -> DomainResult<()>;

    async fn get(&self, id: Uuid) -> DomainResult<Option<JobLogEntry>>;

    /// Most recent entries first.
    async fn list_recent(&self, limit: u32) -> DomainResult<Vec<JobLogEntry>>;
}
