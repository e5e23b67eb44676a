//! Read-through repositories that hold writes back.
//!
//! A dry-run sweep reads the real catalog but every write lands in a
//! shared [`DryRunLedger`] instead of the store, so the sweep can report
//! what it would have changed.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Character, CharacterImage, ImageType, JobLogEntry};
use crate::domain::ports::{CharacterImageRepository, CharacterRepository, JobLogRepository};

/// Writes withheld during a dry run, in the order they were attempted.
#[derive(Debug, Default)]
pub struct DryRunLedger {
    characters: RwLock<Vec<Character>>,
    images: RwLock<Vec<CharacterImage>>,
    job_logs: RwLock<Vec<JobLogEntry>>,
}

impl DryRunLedger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Character inserts and attribute updates that were not written.
    pub async fn characters(&self) -> Vec<Character> {
        self.characters.read().await.clone()
    }

    /// Image activations that were not written.
    pub async fn images(&self) -> Vec<CharacterImage> {
        self.images.read().await.clone()
    }

    pub async fn job_logs(&self) -> Vec<JobLogEntry> {
        self.job_logs.read().await.clone()
    }
}

pub struct DryRunCharacterRepository {
    inner: Arc<dyn CharacterRepository>,
    ledger: Arc<DryRunLedger>,
}

impl DryRunCharacterRepository {
    pub fn new(inner: Arc<dyn CharacterRepository>, ledger: Arc<DryRunLedger>) -> Self {
        Self { inner, ledger }
    }
}

#[async_trait]
impl CharacterRepository for DryRunCharacterRepository {
    async fn insert(&self, character: &Character) -> DomainResult<()> {
        self.ledger.characters.write().await.push(character.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Character>> {
        self.inner.get(id).await
    }

    async fn find_defective(
        &self,
        owner_id: Uuid,
        placeholder_name: &str,
        limit: u32,
    ) -> DomainResult<Vec<Character>> {
        self.inner.find_defective(owner_id, placeholder_name, limit).await
    }

    async fn find_missing_image(
        &self,
        owner_id: Uuid,
        image_type: ImageType,
        limit: u32,
    ) -> DomainResult<Vec<Character>> {
        self.inner.find_missing_image(owner_id, image_type, limit).await
    }

    async fn update_attributes(&self, character: &Character) -> DomainResult<()> {
        tracing::debug!(record_id = %character.id, "dry run: attribute update withheld");
        self.ledger.characters.write().await.push(character.clone());
        Ok(())
    }
}

pub struct DryRunImageRepository {
    inner: Arc<dyn CharacterImageRepository>,
    ledger: Arc<DryRunLedger>,
}

impl DryRunImageRepository {
    pub fn new(inner: Arc<dyn CharacterImageRepository>, ledger: Arc<DryRunLedger>) -> Self {
        Self { inner, ledger }
    }
}

#[async_trait]
impl CharacterImageRepository for DryRunImageRepository {
    async fn find_active(
        &self,
        character_id: Uuid,
        image_type: ImageType,
    ) -> DomainResult<Option<CharacterImage>> {
        self.inner.find_active(character_id, image_type).await
    }

    async fn replace_active(&self, image: &CharacterImage) -> DomainResult<()> {
        tracing::debug!(record_id = %image.character_id, "dry run: image activation withheld");
        self.ledger.images.write().await.push(image.clone());
        Ok(())
    }

    async fn list_for_character(&self, character_id: Uuid) -> DomainResult<Vec<CharacterImage>> {
        self.inner.list_for_character(character_id).await
    }
}

pub struct DryRunJobLogRepository {
    inner: Arc<dyn JobLogRepository>,
    ledger: Arc<DryRunLedger>,
}

impl DryRunJobLogRepository {
    pub fn new(inner: Arc<dyn JobLogRepository>, ledger: Arc<DryRunLedger>) -> Self {
        Self { inner, ledger }
    }
}

#[async_trait]
impl JobLogRepository for DryRunJobLogRepository {
    async fn insert(&self, entry: &JobLogEntry) -> DomainResult<()> {
        self.ledger.job_logs.write().await.push(entry.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<JobLogEntry>> {
        self.inner.get(id).await
    }

    async fn list_recent(&self, limit: u32) -> DomainResult<Vec<JobLogEntry>> {
        self.inner.list_recent(limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{
        create_migrated_test_pool, SqliteCharacterImageRepository, SqliteCharacterRepository,
        SqliteJobLogRepository,
    };
    use crate::domain::models::{JobStatus, JobType};

    #[tokio::test]
    async fn test_character_writes_are_withheld() {
        let pool = create_migrated_test_pool().await.unwrap();
        let real = Arc::new(SqliteCharacterRepository::new(pool));
        let owner = Uuid::new_v4();
        let stored = Character::new(owner, "Unnamed");
        real.insert(&stored).await.unwrap();

        let ledger = DryRunLedger::new();
        let repo = DryRunCharacterRepository::new(real.clone(), ledger.clone());

        let mut changed = stored.clone();
        changed.primary_name = "Mira Vale".to_string();
        changed.species_id = Some(2);
        repo.update_attributes(&changed).await.unwrap();
        repo.insert(&Character::new(owner, "Extra")).await.unwrap();

        let reread = real.get(stored.id).await.unwrap().unwrap();
        assert_eq!(reread.primary_name, "Unnamed");
        assert_eq!(reread.species_id, None);

        // Reads still see the real catalog.
        let defective = repo.find_defective(owner, "Unnamed", 10).await.unwrap();
        assert_eq!(defective.len(), 1);

        let held = ledger.characters().await;
        assert_eq!(held.len(), 2);
        assert_eq!(held[0].primary_name, "Mira Vale");
    }

    #[tokio::test]
    async fn test_image_and_job_log_writes_are_withheld() {
        let pool = create_migrated_test_pool().await.unwrap();
        let characters = SqliteCharacterRepository::new(pool.clone());
        let character = Character::new(Uuid::new_v4(), "Unnamed");
        characters.insert(&character).await.unwrap();

        let ledger = DryRunLedger::new();
        let images = DryRunImageRepository::new(
            Arc::new(SqliteCharacterImageRepository::new(pool.clone())),
            ledger.clone(),
        );
        let logs = DryRunJobLogRepository::new(Arc::new(SqliteJobLogRepository::new(pool)), ledger.clone());

        let image = CharacterImage::new_active(character.id, ImageType::Avatar, "mock://a.png", "a.png");
        images.replace_active(&image).await.unwrap();
        assert!(images.find_active(character.id, ImageType::Avatar).await.unwrap().is_none());

        let entry = JobLogEntry {
            id: Uuid::new_v4(),
            job_type: JobType::AvatarRemediation,
            status: JobStatus::Completed,
            target_count: 0,
            success_count: 0,
            failure_count: 0,
            duration_seconds: 0.0,
            completed_at: chrono::Utc::now(),
            errors: Vec::new(),
            metadata: serde_json::json!({}),
        };
        logs.insert(&entry).await.unwrap();
        assert!(logs.get(entry.id).await.unwrap().is_none());
        assert!(logs.list_recent(10).await.unwrap().is_empty());

        assert_eq!(ledger.images().await.len(), 1);
        assert_eq!(ledger.job_logs().await.len(), 1);
    }
}
