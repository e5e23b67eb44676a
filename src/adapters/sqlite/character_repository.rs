//! SQLite implementation of the CharacterRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{format_datetime, parse_datetime, parse_json_or_default, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Character, ImageType};
use crate::domain::ports::CharacterRepository;

#[derive(Clone)]
pub struct SqliteCharacterRepository {
    pool: SqlitePool,
}

impl SqliteCharacterRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CharacterRepository for SqliteCharacterRepository {
    async fn insert(&self, character: &Character) -> DomainResult<()> {
        let tags_json = serde_json::to_string(&character.tags)?;

        sqlx::query(
            r#"INSERT INTO characters (id, owner_id, primary_name, secondary_name, species_id,
               appearance, personality, backstory, attire, tags, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#
        )
        .bind(character.id.to_string())
        .bind(character.owner_id.to_string())
        .bind(&character.primary_name)
        .bind(&character.secondary_name)
        .bind(character.species_id)
        .bind(&character.appearance)
        .bind(&character.personality)
        .bind(&character.backstory)
        .bind(&character.attire)
        .bind(&tags_json)
        .bind(format_datetime(&character.created_at))
        .bind(format_datetime(&character.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<Character>> {
        let row: Option<CharacterRow> = sqlx::query_as("SELECT * FROM characters WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_defective(
        &self,
        owner_id: Uuid,
        placeholder_name: &str,
        limit: u32,
    ) -> DomainResult<Vec<Character>> {
        let rows: Vec<CharacterRow> = sqlx::query_as(
            r#"SELECT * FROM characters
               WHERE owner_id = ?
                 AND (species_id IS NULL
                      OR lower(trim(primary_name)) = lower(trim(?))
                      OR trim(primary_name) = '')
               ORDER BY created_at ASC, id ASC
               LIMIT ?"#
        )
        .bind(owner_id.to_string())
        .bind(placeholder_name)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn find_missing_image(
        &self,
        owner_id: Uuid,
        image_type: ImageType,
        limit: u32,
    ) -> DomainResult<Vec<Character>> {
        let rows: Vec<CharacterRow> = sqlx::query_as(
            r#"SELECT c.* FROM characters c
               WHERE c.owner_id = ?
                 AND NOT EXISTS (
                     SELECT 1 FROM character_images i
                     WHERE i.character_id = c.id AND i.image_type = ? AND i.is_active = 1
                 )
               ORDER BY c.created_at ASC, c.id ASC
               LIMIT ?"#
        )
        .bind(owner_id.to_string())
        .bind(image_type.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn update_attributes(&self, character: &Character) -> DomainResult<()> {
        let tags_json = serde_json::to_string(&character.tags)?;

        let result = sqlx::query(
            r#"UPDATE characters SET primary_name = ?, secondary_name = ?, species_id = ?,
               appearance = ?, personality = ?, backstory = ?, attire = ?, tags = ?,
               updated_at = ?
               WHERE id = ?"#
        )
        .bind(&character.primary_name)
        .bind(&character.secondary_name)
        .bind(character.species_id)
        .bind(&character.appearance)
        .bind(&character.personality)
        .bind(&character.backstory)
        .bind(&character.attire)
        .bind(&tags_json)
        .bind(format_datetime(&Utc::now()))
        .bind(character.id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::CharacterNotFound(character.id));
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct CharacterRow {
    id: String,
    owner_id: String,
    primary_name: String,
    secondary_name: Option<String>,
    species_id: Option<i64>,
    appearance: Option<String>,
    personality: Option<String>,
    backstory: Option<String>,
    attire: Option<String>,
    tags: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<CharacterRow> for Character {
    type Error = DomainError;

    fn try_from(row: CharacterRow) -> Result<Self, Self::Error> {
        Ok(Character {
            id: parse_uuid(&row.id)?,
            owner_id: parse_uuid(&row.owner_id)?,
            primary_name: row.primary_name,
            secondary_name: row.secondary_name,
            species_id: row.species_id,
            appearance: row.appearance,
            personality: row.personality,
            backstory: row.backstory,
            attire: row.attire,
            tags: parse_json_or_default(row.tags)?,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}
