use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::Species;

/// Read access to the species taxonomy.
#[async_trait]
pub trait SpeciesRepository: Send + Sync {
    /// List every species, including the sentinel, ordered by id.
    async fn list(&self) -> DomainResult<Vec<Species>>;

    /// Insert a species and return it with its assigned id.
    async fn insert(&self, name: &str) -> DomainResult<Species>;
}
