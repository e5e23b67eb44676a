//! SQLite implementation of the CharacterImageRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CharacterImage, ImageType};
use crate::domain::ports::CharacterImageRepository;

#[derive(Clone)]
pub struct SqliteCharacterImageRepository {
    pool: SqlitePool,
}

impl SqliteCharacterImageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CharacterImageRepository for SqliteCharacterImageRepository {
    async fn find_active(
        &self,
        character_id: Uuid,
        image_type: ImageType,
    ) -> DomainResult<Option<CharacterImage>> {
        let row: Option<ImageRow> = sqlx::query_as(
            r#"SELECT * FROM character_images
               WHERE character_id = ? AND image_type = ? AND is_active = 1
               LIMIT 1"#
        )
        .bind(character_id.to_string())
        .bind(image_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn replace_active(&self, image: &CharacterImage) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        let deactivated = sqlx::query(
            r#"UPDATE character_images SET is_active = 0
               WHERE character_id = ? AND image_type = ? AND is_active = 1"#
        )
        .bind(image.character_id.to_string())
        .bind(image.image_type.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query(
            r#"INSERT INTO character_images (id, character_id, image_type, url, storage_key, is_active, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#
        )
        .bind(image.id.to_string())
        .bind(image.character_id.to_string())
        .bind(image.image_type.as_str())
        .bind(&image.url)
        .bind(&image.storage_key)
        .bind(image.is_active)
        .bind(format_datetime(&image.created_at))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            character_id = %image.character_id,
            image_type = image.image_type.as_str(),
            deactivated,
            "replaced active image"
        );
        Ok(())
    }

    async fn list_for_character(&self, character_id: Uuid) -> DomainResult<Vec<CharacterImage>> {
        let rows: Vec<ImageRow> = sqlx::query_as(
            "SELECT * FROM character_images WHERE character_id = ? ORDER BY created_at DESC"
        )
        .bind(character_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[derive(sqlx::FromRow)]
struct ImageRow {
    id: String,
    character_id: String,
    image_type: String,
    url: String,
    storage_key: String,
    is_active: bool,
    created_at: String,
}

impl TryFrom<ImageRow> for CharacterImage {
    type Error = DomainError;

    fn try_from(row: ImageRow) -> Result<Self, Self::Error> {
        let image_type = ImageType::from_str(&row.image_type)
            .ok_or_else(|| DomainError::SerializationError(format!("Invalid image type: {}", row.image_type)))?;

        Ok(CharacterImage {
            id: parse_uuid(&row.id)?,
            character_id: parse_uuid(&row.character_id)?,
            image_type,
            url: row.url,
            storage_key: row.storage_key,
            is_active: row.is_active,
            created_at: parse_datetime(&row.created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteCharacterRepository};
    use crate::domain::models::Character;
    use crate::domain::ports::CharacterRepository;

    async fn setup() -> (SqliteCharacterImageRepository, Uuid) {
        let pool = create_migrated_test_pool().await.unwrap();
        let characters = SqliteCharacterRepository::new(pool.clone());
        let character = Character::new(Uuid::new_v4(), "Lyra");
        characters.insert(&character).await.unwrap();
        (SqliteCharacterImageRepository::new(pool), character.id)
    }

    #[tokio::test]
    async fn test_replace_active_keeps_single_active_image() {
        let (repo, character_id) = setup().await;

        let first = CharacterImage::new_active(character_id, ImageType::Avatar, "https://cdn/1.png", "1.png");
        let second = CharacterImage::new_active(character_id, ImageType::Avatar, "https://cdn/2.png", "2.png");
        repo.replace_active(&first).await.unwrap();
        repo.replace_active(&second).await.unwrap();

        let active = repo.find_active(character_id, ImageType::Avatar).await.unwrap().unwrap();
        assert_eq!(active.id, second.id);

        let all = repo.list_for_character(character_id).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all.iter().filter(|i| i.is_active).count(), 1);
    }

    #[tokio::test]
    async fn test_image_types_are_independent() {
        let (repo, character_id) = setup().await;

        repo.replace_active(&CharacterImage::new_active(character_id, ImageType::Avatar, "a", "a"))
            .await
            .unwrap();
        repo.replace_active(&CharacterImage::new_active(character_id, ImageType::FullBody, "b", "b"))
            .await
            .unwrap();

        assert!(repo.find_active(character_id, ImageType::Avatar).await.unwrap().is_some());
        assert!(repo.find_active(character_id, ImageType::FullBody).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_insert_rolls_back_deactivation() {
        let (repo, character_id) = setup().await;

        let first = CharacterImage::new_active(character_id, ImageType::Avatar, "a", "a");
        repo.replace_active(&first).await.unwrap();

        // Reusing the primary key makes the insert fail after the deactivate ran.
        let mut duplicate = CharacterImage::new_active(character_id, ImageType::Avatar, "b", "b");
        duplicate.id = first.id;
        assert!(repo.replace_active(&duplicate).await.is_err());

        let active = repo.find_active(character_id, ImageType::Avatar).await.unwrap().unwrap();
        assert_eq!(active.id, first.id);
    }
}
