//! Common test utilities for integration tests
//!
//! Builds a migrated in-memory database and the full remediation service
//! graph wired to mock collaborators.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use mender::adapters::generation::{MockCharacterGenerator, MockImageGenerator, MockObjectStorage};
use mender::adapters::sqlite::{
    create_migrated_test_pool, SqliteCharacterImageRepository, SqliteCharacterRepository, SqliteJobLogRepository,
    SqliteSpeciesRepository,
};
use mender::domain::models::{Character, RemediationConfig};
use mender::domain::ports::{CharacterRepository, SpeciesRepository};
use mender::services::{
    AvatarRemediator, AvatarSettings, BatchConfig, BatchOrchestrator, CandidateSelector, CharacterRemediationSettings,
    CharacterRemediator, ResolverConfig, SpeciesResolver, SynonymTable,
};

/// Everything a remediation test needs, sharing one database.
pub struct TestStack {
    pub config: RemediationConfig,
    pub characters: Arc<SqliteCharacterRepository>,
    pub species: Arc<SqliteSpeciesRepository>,
    pub images: Arc<SqliteCharacterImageRepository>,
    pub job_logs: Arc<SqliteJobLogRepository>,
    pub generator: Arc<MockCharacterGenerator>,
    pub image_generator: Arc<MockImageGenerator>,
    pub storage: Arc<MockObjectStorage>,
}

impl TestStack {
    pub async fn new() -> Self {
        Self::with_generator(MockCharacterGenerator::new()).await
    }

    pub async fn with_generator(generator: MockCharacterGenerator) -> Self {
        let pool = create_migrated_test_pool().await.expect("test pool");
        Self {
            config: RemediationConfig::default(),
            characters: Arc::new(SqliteCharacterRepository::new(pool.clone())),
            species: Arc::new(SqliteSpeciesRepository::new(pool.clone())),
            images: Arc::new(SqliteCharacterImageRepository::new(pool.clone())),
            job_logs: Arc::new(SqliteJobLogRepository::new(pool)),
            generator: Arc::new(generator),
            image_generator: Arc::new(MockImageGenerator::new()),
            storage: Arc::new(MockObjectStorage::new()),
        }
    }

    /// Add taxonomy entries; returns their ids in order.
    pub async fn add_species(&self, names: &[&str]) -> Vec<i64> {
        let mut ids = Vec::new();
        for name in names {
            ids.push(self.species.insert(name).await.expect("insert species").id);
        }
        ids
    }

    /// Insert records owned by the generating principal, oldest first.
    pub async fn seed_generated(&self, names: &[&str]) -> Vec<Character> {
        let base = chrono::Utc::now() - chrono::Duration::hours(1);
        let mut records = Vec::new();
        for (i, name) in names.iter().enumerate() {
            let record = Character::new(self.config.generator_user_id, *name)
                .with_created_at(base + chrono::Duration::seconds(i as i64));
            self.characters.insert(&record).await.expect("insert character");
            records.push(record);
        }
        records
    }

    pub fn resolver(&self) -> Arc<SpeciesResolver> {
        Arc::new(SpeciesResolver::new(
            self.species.clone(),
            SynonymTable::builtin(),
            ResolverConfig::from(&self.config),
        ))
    }

    pub fn character_remediator(&self) -> Arc<CharacterRemediator> {
        Arc::new(CharacterRemediator::new(
            self.characters.clone(),
            self.generator.clone(),
            self.resolver(),
            CharacterRemediationSettings::from(&self.config),
        ))
    }

    pub fn avatar_remediator(&self) -> Arc<AvatarRemediator> {
        Arc::new(AvatarRemediator::new(
            self.character_remediator(),
            self.images.clone(),
            self.image_generator.clone(),
            self.storage.clone(),
            AvatarSettings::new(&Default::default(), &Default::default()),
        ))
    }

    pub fn orchestrator(&self, remediator: Arc<dyn mender::services::Remediator>) -> BatchOrchestrator {
        BatchOrchestrator::new(
            Arc::new(CandidateSelector::new(self.characters.clone(), &self.config)),
            remediator,
            self.job_logs.clone(),
            BatchConfig {
                default_limit: self.config.default_batch_size,
                inter_item_delay: Duration::ZERO,
            },
        )
    }
}
