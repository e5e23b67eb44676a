//! Character image models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of character image. At most one image of each kind is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageType {
    Avatar,
    FullBody,
}

impl ImageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Avatar => "avatar",
            Self::FullBody => "full_body",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "avatar" => Some(Self::Avatar),
            "full_body" => Some(Self::FullBody),
            _ => None,
        }
    }
}

/// An uploaded image attached to a character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterImage {
    pub id: Uuid,
    pub character_id: Uuid,
    pub image_type: ImageType,
    /// Public URL returned by the storage collaborator.
    pub url: String,
    /// Object key inside the storage bucket.
    pub storage_key: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl CharacterImage {
    /// A new active image.
    pub fn new_active(
        character_id: Uuid,
        image_type: ImageType,
        url: impl Into<String>,
        storage_key: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            character_id,
            image_type,
            url: url.into(),
            storage_key: storage_key.into(),
            is_active: true,
            created_at: Utc::now(),
        }
    }
}
