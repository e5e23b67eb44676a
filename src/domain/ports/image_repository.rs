use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{CharacterImage, ImageType};

/// Repository port for character images.
#[async_trait]
pub trait CharacterImageRepository: Send + Sync {
    /// The active image of the given type, if any.
    async fn find_active(
        &self,
        character_id: Uuid,
        image_type: ImageType,
    ) -> DomainResult<Option<CharacterImage>>;

    /// Deactivate every active image of `image.image_type` for the character
    /// and insert `image` as the active one, atomically.
    async fn replace_active(&self, image: &CharacterImage) -> DomainResult<()>;

    /// All images for a character, newest first.
    async fn list_for_character(&self, character_id: Uuid) -> DomainResult<Vec<CharacterImage>>;
}
