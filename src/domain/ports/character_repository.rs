use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Character, ImageType};

/// Repository port for character persistence.
#[async_trait]
pub trait CharacterRepository: Send + Sync {
    /// Insert a new character.
    async fn insert(&self, character: &Character) -> DomainResult<()>;

    /// Get a character by ID.
    async fn get(&self, id: Uuid) -> DomainResult<Option<Character>>;

    /// Characters owned by `owner_id` that have no species or still carry
    /// the placeholder name, oldest first.
    async fn find_defective(
        &self,
        owner_id: Uuid,
        placeholder_name: &str,
        limit: u32,
    ) -> DomainResult<Vec<Character>>;

    /// Characters owned by `owner_id` without an active image of the given
    /// type, oldest first.
    async fn find_missing_image(
        &self,
        owner_id: Uuid,
        image_type: ImageType,
        limit: u32,
    ) -> DomainResult<Vec<Character>>;

    /// Overwrite the attribute columns of an existing character.
    ///
    /// Identity and ownership columns are never written.
    async fn update_attributes(&self, character: &Character) -> DomainResult<()>;
}
