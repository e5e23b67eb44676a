//! SQLite implementation of the JobLogRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_json_or_default, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{JobLogEntry, JobStatus, JobType};
use crate::domain::ports::JobLogRepository;

#[derive(Clone)]
pub struct SqliteJobLogRepository {
    pool: SqlitePool,
}

impl SqliteJobLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobLogRepository for SqliteJobLogRepository {
    async fn insert(&self, entry: &JobLogEntry) -> DomainResult<()> {
        let errors_json = serde_json::to_string(&entry.errors)?;
        let metadata_json = serde_json::to_string(&entry.metadata)?;

        sqlx::query(
            r#"INSERT INTO job_logs (id, job_type, status, target_count, success_count,
               failure_count, duration_seconds, completed_at, errors, metadata)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#
        )
        .bind(entry.id.to_string())
        .bind(entry.job_type.as_str())
        .bind(entry.status.as_str())
        .bind(i64::from(entry.target_count))
        .bind(i64::from(entry.success_count))
        .bind(i64::from(entry.failure_count))
        .bind(entry.duration_seconds)
        .bind(format_datetime(&entry.completed_at))
        .bind(&errors_json)
        .bind(&metadata_json)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<JobLogEntry>> {
        let row: Option<JobLogRow> = sqlx::query_as("SELECT * FROM job_logs WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn list_recent(&self, limit: u32) -> DomainResult<Vec<JobLogEntry>> {
        let rows: Vec<JobLogRow> = sqlx::query_as(
            "SELECT * FROM job_logs ORDER BY completed_at DESC LIMIT ?"
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[derive(sqlx::FromRow)]
struct JobLogRow {
    id: String,
    job_type: String,
    status: String,
    target_count: i64,
    success_count: i64,
    failure_count: i64,
    duration_seconds: f64,
    completed_at: String,
    errors: Option<String>,
    metadata: Option<String>,
}

fn count(value: i64) -> DomainResult<u32> {
    u32::try_from(value).map_err(|e| DomainError::SerializationError(e.to_string()))
}

impl TryFrom<JobLogRow> for JobLogEntry {
    type Error = DomainError;

    fn try_from(row: JobLogRow) -> Result<Self, Self::Error> {
        let job_type = JobType::from_str(&row.job_type)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid job type: {}", row.job_type)))?;
        let status = JobStatus::from_str(&row.status)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid job status: {}", row.status)))?;
        let metadata: Option<serde_json::Value> = parse_json_or_default(row.metadata)?;

        Ok(JobLogEntry {
            id: parse_uuid(&row.id)?,
            job_type,
            status,
            target_count: count(row.target_count)?,
            success_count: count(row.success_count)?,
            failure_count: count(row.failure_count)?,
            duration_seconds: row.duration_seconds,
            completed_at: parse_datetime(&row.completed_at)?,
            errors: parse_json_or_default(row.errors)?,
            metadata: metadata.unwrap_or(serde_json::Value::Null),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use crate::domain::models::RecordError;
    use chrono::{Duration, Utc};

    fn entry(completed_at: chrono::DateTime<Utc>) -> JobLogEntry {
        JobLogEntry {
            id: Uuid::new_v4(),
            job_type: JobType::CharacterRemediation,
            status: JobStatus::Completed,
            target_count: 3,
            success_count: 2,
            failure_count: 1,
            duration_seconds: 4.5,
            completed_at,
            errors: vec![RecordError::for_record(Uuid::new_v4(), "generation timed out")],
            metadata: serde_json::json!({ "limit": 50 }),
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = SqliteJobLogRepository::new(create_migrated_test_pool().await.unwrap());
        let log = entry(Utc::now());
        repo.insert(&log).await.unwrap();

        let retrieved = repo.get(log.id).await.unwrap().unwrap();
        assert_eq!(retrieved.job_type, JobType::CharacterRemediation);
        assert_eq!(retrieved.success_count, 2);
        assert_eq!(retrieved.errors, log.errors);
        assert_eq!(retrieved.metadata["limit"], 50);
    }

    #[tokio::test]
    async fn test_list_recent_newest_first() {
        let repo = SqliteJobLogRepository::new(create_migrated_test_pool().await.unwrap());
        let older = entry(Utc::now() - Duration::hours(1));
        let newer = entry(Utc::now());
        repo.insert(&older).await.unwrap();
        repo.insert(&newer).await.unwrap();

        let recent = repo.list_recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, newer.id);

        assert_eq!(repo.list_recent(1).await.unwrap().len(), 1);
    }
}
