//! Wiring for CLI commands: configuration, database, and service graph.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::dry_run::{DryRunCharacterRepository, DryRunImageRepository, DryRunJobLogRepository, DryRunLedger};
use crate::adapters::generation::{
    HttpCharacterGenerator, HttpImageGenerator, HttpObjectStorage, MockCharacterGenerator, MockImageGenerator,
    MockObjectStorage,
};
use crate::adapters::sqlite::{
    database_url, initialize_database, PoolConfig, SqliteCharacterImageRepository, SqliteCharacterRepository,
    SqliteJobLogRepository, SqliteSpeciesRepository,
};
use crate::domain::models::Config;
use crate::domain::ports::{
    CharacterGenerator, CharacterImageRepository, CharacterRepository, ImageGenerator, JobLogRepository, ObjectStorage,
};
use crate::infrastructure::config::ConfigLoader;
use crate::services::{
    AvatarRemediator, AvatarSettings, BatchConfig, BatchOrchestrator, CandidateSelector, CharacterRemediationSettings,
    CharacterRemediator, DefectKind, Remediator, ResolverConfig, SpeciesResolver, SynonymTable,
};

/// Loaded configuration plus an open, migrated database.
pub struct AppContext {
    pub config: Config,
    pub pool: SqlitePool,
}

/// Per-run overrides from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub delay_ms: Option<u64>,
    /// Mock collaborators and no writes to the database.
    pub dry_run: bool,
}

/// A ready-to-run orchestrator. Dry runs also carry the ledger of
/// withheld writes.
pub struct Sweep {
    pub orchestrator: BatchOrchestrator,
    pub dry_run: Option<Arc<DryRunLedger>>,
}

impl AppContext {
    /// Load configuration and open the configured database.
    pub async fn load() -> Result<Self> {
        let config = ConfigLoader::load()?;
        Self::open(config).await
    }

    pub async fn open(config: Config) -> Result<Self> {
        let url = database_url(&config.database.path);
        let pool = initialize_database(&url, Some(PoolConfig::from(&config.database)))
            .await
            .context("Failed to initialize database. Run 'mender init' first.")?;
        Ok(Self { config, pool })
    }

    pub fn species_resolver(&self) -> SpeciesResolver {
        let remediation = &self.config.remediation;
        SpeciesResolver::new(
            Arc::new(SqliteSpeciesRepository::new(self.pool.clone())),
            SynonymTable::builtin().with_overrides(&remediation.synonyms),
            ResolverConfig::from(remediation),
        )
    }

    /// Build the orchestrator for one sweep.
    pub fn orchestrator(&self, kind: DefectKind, options: RunOptions) -> Result<Sweep> {
        let mut characters: Arc<dyn CharacterRepository> = Arc::new(SqliteCharacterRepository::new(self.pool.clone()));
        let mut images: Arc<dyn CharacterImageRepository> =
            Arc::new(SqliteCharacterImageRepository::new(self.pool.clone()));
        let mut job_logs: Arc<dyn JobLogRepository> = Arc::new(SqliteJobLogRepository::new(self.pool.clone()));

        let ledger = options.dry_run.then(DryRunLedger::new);
        if let Some(ledger) = &ledger {
            characters = Arc::new(DryRunCharacterRepository::new(characters, ledger.clone()));
            images = Arc::new(DryRunImageRepository::new(images, ledger.clone()));
            job_logs = Arc::new(DryRunJobLogRepository::new(job_logs, ledger.clone()));
        }

        let remediation = &self.config.remediation;
        let generator: Arc<dyn CharacterGenerator> = if options.dry_run {
            Arc::new(MockCharacterGenerator::new())
        } else {
            Arc::new(HttpCharacterGenerator::new(&self.config.generation)?)
        };

        let attributes = Arc::new(CharacterRemediator::new(
            characters.clone(),
            generator,
            Arc::new(self.species_resolver()),
            CharacterRemediationSettings::from(remediation),
        ));

        let remediator: Arc<dyn Remediator> = match kind {
            DefectKind::Attributes => attributes,
            DefectKind::MissingAvatar => {
                let (image_generator, storage): (Arc<dyn ImageGenerator>, Arc<dyn ObjectStorage>) =
                    if options.dry_run {
                        (Arc::new(MockImageGenerator::new()), Arc::new(MockObjectStorage::new()))
                    } else {
                        (
                            Arc::new(HttpImageGenerator::new(&self.config.image)?),
                            Arc::new(HttpObjectStorage::new(&self.config.storage)?),
                        )
                    };
                Arc::new(AvatarRemediator::new(
                    attributes,
                    images,
                    image_generator,
                    storage,
                    AvatarSettings::new(&self.config.image, &self.config.storage),
                ))
            }
        };

        let mut batch = BatchConfig::from(remediation);
        if let Some(delay_ms) = options.delay_ms {
            batch.inter_item_delay = Duration::from_millis(delay_ms);
        }

        let orchestrator = BatchOrchestrator::new(
            Arc::new(CandidateSelector::new(characters, remediation)),
            remediator,
            job_logs,
            batch,
        );
        Ok(Sweep { orchestrator, dry_run: ledger })
    }

    pub fn job_logs(&self) -> SqliteJobLogRepository {
        SqliteJobLogRepository::new(self.pool.clone())
    }
}
