//! SQLite implementation of the SpeciesRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::Species;
use crate::domain::ports::SpeciesRepository;

#[derive(Clone)]
pub struct SqliteSpeciesRepository {
    pool: SqlitePool,
}

impl SqliteSpeciesRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SpeciesRepository for SqliteSpeciesRepository {
    async fn list(&self) -> DomainResult<Vec<Species>> {
        let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM species ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|(id, name)| Species { id, name }).collect())
    }

    async fn insert(&self, name: &str) -> DomainResult<Species> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::ValidationFailed("species name cannot be empty".to_string()));
        }

        let result = sqlx::query("INSERT INTO species (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(Species::new(result.last_insert_rowid(), name))
    }
}
