//! Attribute remediation: regenerate missing names and species.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Character, GeneratedCharacter, GenerationRequest, JobType, RemediationConfig};
use crate::domain::ports::{CharacterGenerator, CharacterRepository};

use super::candidate_selector::DefectKind;
use super::remediator::{RemediationOutcome, Remediator};
use super::species_resolver::SpeciesResolver;

/// Settings the attribute remediator needs from [`RemediationConfig`].
#[derive(Debug, Clone)]
pub struct CharacterRemediationSettings {
    pub generator_user_id: Uuid,
    pub placeholder_name: String,
    pub language_hint: String,
}

impl From<&RemediationConfig> for CharacterRemediationSettings {
    fn from(config: &RemediationConfig) -> Self {
        Self {
            generator_user_id: config.generator_user_id,
            placeholder_name: config.placeholder_name.clone(),
            language_hint: config.language_hint.clone(),
        }
    }
}

/// Regenerates attributes for records with a placeholder name or no species.
pub struct CharacterRemediator {
    characters: Arc<dyn CharacterRepository>,
    generator: Arc<dyn CharacterGenerator>,
    resolver: Arc<SpeciesResolver>,
    settings: CharacterRemediationSettings,
}

impl CharacterRemediator {
    pub fn new(
        characters: Arc<dyn CharacterRepository>,
        generator: Arc<dyn CharacterGenerator>,
        resolver: Arc<SpeciesResolver>,
        settings: CharacterRemediationSettings,
    ) -> Self {
        Self {
            characters,
            generator,
            resolver,
            settings,
        }
    }

    pub fn settings(&self) -> &CharacterRemediationSettings {
        &self.settings
    }

    pub fn resolver(&self) -> &Arc<SpeciesResolver> {
        &self.resolver
    }

    /// Load a record and check that it belongs to the generating principal.
    ///
    /// Guard rejections come back as the outcome to report.
    pub async fn load_owned(&self, record_id: Uuid) -> Result<Character, RemediationOutcome> {
        let character = match self.characters.get(record_id).await {
            Ok(Some(character)) => character,
            Ok(None) => {
                tracing::warn!(record_id = %record_id, "record not found, skipping");
                return Err(RemediationOutcome::skipped(format!("record {record_id} not found")));
            }
            Err(e) => return Err(RemediationOutcome::failed(e)),
        };

        if character.owner_id != self.settings.generator_user_id {
            tracing::warn!(
                record_id = %record_id,
                owner_id = %character.owner_id,
                "record not owned by the generating principal, skipping"
            );
            return Err(RemediationOutcome::skipped(format!(
                "record {record_id} is not owned by the generating principal"
            )));
        }

        Ok(character)
    }

    /// Generate, merge, and persist attributes for a loaded record.
    pub async fn repair_attributes(&self, character: Character) -> DomainResult<Character> {
        let placeholder = self.settings.placeholder_name.as_str();
        let known = character.known_attributes(placeholder);

        let seed = if character.has_placeholder_name(placeholder) {
            None
        } else {
            let species_name = match character.species_id {
                Some(id) => self.resolver.species_name(id).await,
                None => None,
            };
            known.seed_description(species_name.as_deref())
        };

        let request = GenerationRequest {
            seed_description: seed,
            image_analysis: None,
            existing_attributes: known,
            language_hint: self.settings.language_hint.clone(),
            caller_context: Some(format!("remediation:{}", character.id)),
        };

        tracing::debug!(record_id = %character.id, generator = self.generator.name(), "requesting attributes");
        let generated = self.generator.generate(&request).await?;

        if character.has_placeholder_name(placeholder) && generated.name.trim().is_empty() {
            return Err(DomainError::GenerationFailed(
                "generation returned an empty name for a placeholder record".to_string(),
            ));
        }

        let species_id = match character.species_id {
            Some(_) => None,
            None => Some(self.resolver.resolve(&generated.species, Some(character.id)).await),
        };

        let repaired = merge_generated(character, generated, species_id, placeholder);
        self.characters.update_attributes(&repaired).await?;

        tracing::info!(
            record_id = %repaired.id,
            name = %repaired.primary_name,
            species_id = ?repaired.species_id,
            "attributes repaired"
        );
        Ok(repaired)
    }

    async fn run(&self, record_id: Uuid) -> RemediationOutcome {
        let character = match self.load_owned(record_id).await {
            Ok(character) => character,
            Err(outcome) => return outcome,
        };

        if !character.is_attribute_defective(&self.settings.placeholder_name) {
            tracing::debug!(record_id = %record_id, "attributes already present");
            return RemediationOutcome::AlreadyRemediated;
        }

        match self.repair_attributes(character).await {
            Ok(_) => RemediationOutcome::Repaired,
            Err(e) => {
                tracing::error!(record_id = %record_id, error = %e, "attribute remediation failed");
                RemediationOutcome::failed(e)
            }
        }
    }
}

#[async_trait]
impl Remediator for CharacterRemediator {
    fn job_type(&self) -> JobType {
        JobType::CharacterRemediation
    }

    fn defect_kind(&self) -> DefectKind {
        DefectKind::Attributes
    }

    async fn prepare(&self) -> DomainResult<()> {
        self.resolver.refresh().await.map(|_| ())
    }

    async fn remediate(&self, record_id: Uuid) -> RemediationOutcome {
        self.run(record_id).await
    }
}

/// Fold generated attributes into a record.
///
/// The placeholder name is replaced, an empty secondary name is filled,
/// and the species is set only when `species_id` is given. Descriptive
/// fields take the generated value when it is non-empty; tags are unioned.
/// Identity and ownership are left alone.
pub fn merge_generated(
    mut character: Character,
    generated: GeneratedCharacter,
    species_id: Option<i64>,
    placeholder: &str,
) -> Character {
    if character.has_placeholder_name(placeholder) {
        let name = generated.name.trim();
        if !name.is_empty() {
            character.primary_name = name.to_string();
        }
    }

    if character.secondary_name.as_deref().is_none_or(|s| s.trim().is_empty()) {
        character.secondary_name = non_empty(generated.secondary_name).or(character.secondary_name);
    }

    if character.species_id.is_none() {
        character.species_id = species_id;
    }

    for (field, value) in [
        (&mut character.appearance, generated.appearance),
        (&mut character.personality, generated.personality),
        (&mut character.backstory, generated.backstory),
        (&mut character.attire, generated.attire),
    ] {
        if let Some(value) = non_empty(value) {
            *field = Some(value);
        }
    }

    for tag in generated.tags {
        let tag = tag.trim();
        if !tag.is_empty() && !character.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            character.tags.push(tag.to_string());
        }
    }

    character
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::generation::MockCharacterGenerator;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteCharacterRepository, SqliteSpeciesRepository};
    use crate::domain::ports::SpeciesRepository;
    use crate::services::species_resolver::ResolverConfig;
    use crate::services::synonyms::SynonymTable;

    struct Fixture {
        characters: Arc<SqliteCharacterRepository>,
        generator: Arc<MockCharacterGenerator>,
        remediator: CharacterRemediator,
        config: RemediationConfig,
        elf_id: i64,
    }

    async fn fixture(generated: GeneratedCharacter) -> Fixture {
        let pool = create_migrated_test_pool().await.unwrap();
        let characters = Arc::new(SqliteCharacterRepository::new(pool.clone()));
        let species = Arc::new(SqliteSpeciesRepository::new(pool));
        let elf_id = species.insert("Elf").await.unwrap().id;

        let config = RemediationConfig::default();
        let resolver = Arc::new(SpeciesResolver::new(
            species,
            SynonymTable::builtin(),
            ResolverConfig::from(&config),
        ));
        let generator = Arc::new(MockCharacterGenerator::with_response(generated));
        let remediator = CharacterRemediator::new(
            characters.clone(),
            generator.clone(),
            resolver,
            CharacterRemediationSettings::from(&config),
        );

        Fixture {
            characters,
            generator,
            remediator,
            config,
            elf_id,
        }
    }

    fn generated(name: &str, species: &str) -> GeneratedCharacter {
        GeneratedCharacter {
            name: name.to_string(),
            species: species.to_string(),
            appearance: Some("Silver hair".to_string()),
            tags: vec!["mage".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_placeholder_record_is_repaired() {
        let f = fixture(generated("Aerin", "Dark Elf")).await;
        let record = Character::new(f.config.generator_user_id, "Unnamed");
        f.characters.insert(&record).await.unwrap();

        let outcome = f.remediator.remediate(record.id).await;
        assert_eq!(outcome, RemediationOutcome::Repaired);

        let stored = f.characters.get(record.id).await.unwrap().unwrap();
        assert_eq!(stored.primary_name, "Aerin");
        assert_eq!(stored.species_id, Some(f.elf_id));
        assert_eq!(stored.owner_id, record.owner_id);
        assert!(!stored.is_attribute_defective("Unnamed"));

        let requests = f.generator.requests().await;
        assert_eq!(requests.len(), 1);
        assert!(requests[0].seed_description.is_none());
        assert!(requests[0].image_analysis.is_none());
        assert_eq!(requests[0].language_hint, "en");
    }

    #[tokio::test]
    async fn test_named_record_keeps_name_and_sends_seed() {
        let f = fixture(generated("Someone Else", "Elf")).await;
        let record = Character::new(f.config.generator_user_id, "Kaela").with_appearance("Green eyes");
        f.characters.insert(&record).await.unwrap();

        assert_eq!(f.remediator.remediate(record.id).await, RemediationOutcome::Repaired);

        let stored = f.characters.get(record.id).await.unwrap().unwrap();
        assert_eq!(stored.primary_name, "Kaela");
        assert_eq!(stored.species_id, Some(f.elf_id));

        let seed = f.generator.requests().await[0].seed_description.clone().unwrap();
        assert!(seed.contains("Name: Kaela"));
        assert!(seed.contains("Green eyes"));
    }

    #[tokio::test]
    async fn test_existing_species_is_not_reresolved() {
        let f = fixture(generated("Aerin", "Elf")).await;
        let record = Character::new(f.config.generator_user_id, "Unnamed").with_species(2);
        f.characters.insert(&record).await.unwrap();

        assert_eq!(f.remediator.remediate(record.id).await, RemediationOutcome::Repaired);
        let stored = f.characters.get(record.id).await.unwrap().unwrap();
        assert_eq!(stored.species_id, Some(2));

        let seed = &f.generator.requests().await[0].seed_description;
        assert!(seed.is_none());
    }

    #[tokio::test]
    async fn test_unmatched_species_uses_sentinel() {
        let f = fixture(generated("Aerin", "qwzxv")).await;
        let record = Character::new(f.config.generator_user_id, "Unnamed");
        f.characters.insert(&record).await.unwrap();

        assert_eq!(f.remediator.remediate(record.id).await, RemediationOutcome::Repaired);
        let stored = f.characters.get(record.id).await.unwrap().unwrap();
        assert_eq!(stored.species_id, Some(f.config.unknown_species_id));
    }

    #[tokio::test]
    async fn test_foreign_record_is_skipped_untouched() {
        let f = fixture(generated("Aerin", "Elf")).await;
        let record = Character::new(Uuid::new_v4(), "Unnamed");
        f.characters.insert(&record).await.unwrap();

        let outcome = f.remediator.remediate(record.id).await;
        assert!(matches!(outcome, RemediationOutcome::Skipped { .. }));
        assert_eq!(f.characters.get(record.id).await.unwrap().unwrap(), record);
        assert!(f.generator.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_record_is_skipped() {
        let f = fixture(generated("Aerin", "Elf")).await;
        let outcome = f.remediator.remediate(Uuid::new_v4()).await;
        assert!(matches!(outcome, RemediationOutcome::Skipped { .. }));
    }

    #[tokio::test]
    async fn test_complete_record_is_already_remediated() {
        let f = fixture(generated("Aerin", "Elf")).await;
        let record = Character::new(f.config.generator_user_id, "Kaela").with_species(2);
        f.characters.insert(&record).await.unwrap();

        assert_eq!(f.remediator.remediate(record.id).await, RemediationOutcome::AlreadyRemediated);
        assert!(f.generator.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_generation_failure_is_reported() {
        let f = fixture(generated("Aerin", "Elf")).await;
        f.generator.fail_when_seed_contains("Broken").await;
        let record = Character::new(f.config.generator_user_id, "Broken Doll");
        f.characters.insert(&record).await.unwrap();

        let outcome = f.remediator.remediate(record.id).await;
        assert!(matches!(outcome, RemediationOutcome::Failed { .. }));
        assert_eq!(f.characters.get(record.id).await.unwrap().unwrap().species_id, None);
    }

    #[tokio::test]
    async fn test_empty_generated_name_fails_placeholder_record() {
        let f = fixture(generated("   ", "Elf")).await;
        let record = Character::new(f.config.generator_user_id, "Unnamed");
        f.characters.insert(&record).await.unwrap();

        let outcome = f.remediator.remediate(record.id).await;
        assert!(matches!(outcome, RemediationOutcome::Failed { .. }));
    }

    #[test]
    fn test_merge_rules() {
        let owner = Uuid::new_v4();
        let mut record = Character::new(owner, "Unnamed");
        record.secondary_name = Some(" ".to_string());
        record.personality = Some("Quiet".to_string());
        record.tags = vec!["Mage".to_string()];

        let generated = GeneratedCharacter {
            name: " Aerin ".to_string(),
            secondary_name: Some("The Pale".to_string()),
            species: "Elf".to_string(),
            appearance: Some("Silver hair".to_string()),
            personality: Some("".to_string()),
            backstory: None,
            attire: Some("Robes".to_string()),
            tags: vec!["mage".to_string(), "scholar".to_string(), " ".to_string()],
        };

        let merged = merge_generated(record.clone(), generated, Some(3), "Unnamed");
        assert_eq!(merged.id, record.id);
        assert_eq!(merged.owner_id, owner);
        assert_eq!(merged.primary_name, "Aerin");
        assert_eq!(merged.secondary_name.as_deref(), Some("The Pale"));
        assert_eq!(merged.species_id, Some(3));
        assert_eq!(merged.appearance.as_deref(), Some("Silver hair"));
        assert_eq!(merged.personality.as_deref(), Some("Quiet"));
        assert_eq!(merged.attire.as_deref(), Some("Robes"));
        assert_eq!(merged.tags, vec!["Mage".to_string(), "scholar".to_string()]);
    }

    #[test]
    fn test_merge_keeps_real_name_and_species() {
        let record = Character::new(Uuid::new_v4(), "Kaela").with_species(2);
        let merged = merge_generated(record, generated("Other", "Elf"), Some(3), "Unnamed");
        assert_eq!(merged.primary_name, "Kaela");
        assert_eq!(merged.species_id, Some(2));
    }
}
