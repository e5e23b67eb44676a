//! Candidate selection: which records a sweep should try to repair.

use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::models::{Character, ImageType, RemediationConfig};
use crate::domain::ports::CharacterRepository;

/// The defect a sweep looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectKind {
    /// No species, or the name is still the placeholder.
    Attributes,
    /// No active avatar image.
    MissingAvatar,
}

impl DefectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attributes => "attributes",
            Self::MissingAvatar => "missing_avatar",
        }
    }
}

/// Finds defective records owned by the generating principal, oldest first.
///
/// Store failures are logged and reported as "no candidates".
pub struct CandidateSelector {
    characters: Arc<dyn CharacterRepository>,
    generator_user_id: Uuid,
    placeholder_name: String,
}

impl CandidateSelector {
    pub fn new(characters: Arc<dyn CharacterRepository>, config: &RemediationConfig) -> Self {
        Self {
            characters,
            generator_user_id: config.generator_user_id,
            placeholder_name: config.placeholder_name.clone(),
        }
    }

    /// Records with missing attributes.
    pub async fn find_defective(&self, limit: u32) -> Vec<Character> {
        self.find_candidates(DefectKind::Attributes, limit).await
    }

    pub async fn find_candidates(&self, kind: DefectKind, limit: u32) -> Vec<Character> {
        if limit == 0 {
            return Vec::new();
        }

        let result = match kind {
            DefectKind::Attributes => {
                self.characters
                    .find_defective(self.generator_user_id, &self.placeholder_name, limit)
                    .await
            }
            DefectKind::MissingAvatar => {
                self.characters
                    .find_missing_image(self.generator_user_id, ImageType::Avatar, limit)
                    .await
            }
        };

        match result {
            Ok(candidates) => {
                tracing::info!(defect = kind.as_str(), limit, found = candidates.len(), "selected candidates");
                candidates
            }
            Err(e) => {
                tracing::error!(defect = kind.as_str(), limit, error = %e, "candidate query failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteCharacterRepository};
    use crate::domain::errors::{DomainError, DomainResult};
    use async_trait::async_trait;

    struct FailingRepository;

    #[async_trait]
    impl CharacterRepository for FailingRepository {
        async fn insert(&self, _c: &Character) -> DomainResult<()> {
            Err(DomainError::DatabaseError("down".to_string()))
        }
        async fn get(&self, _id: Uuid) -> DomainResult<Option<Character>> {
            Err(DomainError::DatabaseError("down".to_string()))
        }
        async fn find_defective(&self, _o: Uuid, _p: &str, _l: u32) -> DomainResult<Vec<Character>> {
            Err(DomainError::DatabaseError("down".to_string()))
        }
        async fn find_missing_image(&self, _o: Uuid, _t: ImageType, _l: u32) -> DomainResult<Vec<Character>> {
            Err(DomainError::DatabaseError("down".to_string()))
        }
        async fn update_attributes(&self, _c: &Character) -> DomainResult<()> {
            Err(DomainError::DatabaseError("down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_only_generator_owned_records_are_selected() {
        let config = RemediationConfig::default();
        let repo = Arc::new(SqliteCharacterRepository::new(create_migrated_test_pool().await.unwrap()));

        let bot_record = Character::new(config.generator_user_id, &config.placeholder_name);
        let human_record = Character::new(Uuid::new_v4(), &config.placeholder_name);
        repo.insert(&bot_record).await.unwrap();
        repo.insert(&human_record).await.unwrap();

        let selector = CandidateSelector::new(repo, &config);
        let found = selector.find_defective(50).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, bot_record.id);
        assert!(found.iter().all(|c| c.owner_id == config.generator_user_id));
    }

    #[tokio::test]
    async fn test_missing_avatar_candidates() {
        let config = RemediationConfig::default();
        let repo = Arc::new(SqliteCharacterRepository::new(create_migrated_test_pool().await.unwrap()));
        let named = Character::new(config.generator_user_id, "Lyra").with_species(2);
        repo.insert(&named).await.unwrap();

        let selector = CandidateSelector::new(repo, &config);
        assert!(selector.find_defective(50).await.is_empty());
        assert_eq!(selector.find_candidates(DefectKind::MissingAvatar, 50).await.len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_yields_no_candidates() {
        let selector = CandidateSelector::new(Arc::new(FailingRepository), &RemediationConfig::default());
        assert!(selector.find_defective(10).await.is_empty());
    }

    #[tokio::test]
    async fn test_zero_limit_selects_nothing() {
        let config = RemediationConfig::default();
        let repo = Arc::new(SqliteCharacterRepository::new(create_migrated_test_pool().await.unwrap()));
        repo.insert(&Character::new(config.generator_user_id, "Unnamed")).await.unwrap();

        let selector = CandidateSelector::new(repo, &config);
        assert!(selector.find_defective(0).await.is_empty());
    }
}
