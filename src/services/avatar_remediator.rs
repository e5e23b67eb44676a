//! Avatar remediation: generate, upload, and activate a missing avatar.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    Character, CharacterImage, ImageConfig, ImagePrompt, ImageType, JobType, StorageConfig, UploadRequest,
};
use crate::domain::ports::{CharacterImageRepository, ImageGenerator, ObjectStorage};

use super::candidate_selector::DefectKind;
use super::character_remediator::CharacterRemediator;
use super::remediator::{RemediationOutcome, Remediator};

const AVATAR_CONTENT_TYPE: &str = "image/png";

const PORTRAIT_PREFIX: &[&str] = &["masterpiece", "best quality", "portrait", "solo", "looking at viewer"];

/// Prompt and upload settings for avatar generation.
#[derive(Debug, Clone)]
pub struct AvatarSettings {
    pub style_tag: String,
    pub negative_prompt: String,
    pub lora_references: Vec<String>,
    pub cache_control: String,
}

impl AvatarSettings {
    pub fn new(image: &ImageConfig, storage: &StorageConfig) -> Self {
        Self {
            style_tag: image.style_tag.clone(),
            negative_prompt: image.negative_prompt.clone(),
            lora_references: image.lora_references.clone(),
            cache_control: storage.cache_control.clone(),
        }
    }
}

/// Produces an avatar for records that have no active one.
///
/// Records that still have attribute defects get those repaired first so
/// the prompt is built from real attributes.
pub struct AvatarRemediator {
    attributes: Arc<CharacterRemediator>,
    images: Arc<dyn CharacterImageRepository>,
    image_generator: Arc<dyn ImageGenerator>,
    storage: Arc<dyn ObjectStorage>,
    settings: AvatarSettings,
}

impl AvatarRemediator {
    pub fn new(
        attributes: Arc<CharacterRemediator>,
        images: Arc<dyn CharacterImageRepository>,
        image_generator: Arc<dyn ImageGenerator>,
        storage: Arc<dyn ObjectStorage>,
        settings: AvatarSettings,
    ) -> Self {
        Self {
            attributes,
            images,
            image_generator,
            storage,
            settings,
        }
    }

    async fn run(&self, record_id: Uuid) -> DomainResult<RemediationOutcome> {
        let character = match self.attributes.load_owned(record_id).await {
            Ok(character) => character,
            Err(outcome) => return Ok(outcome),
        };

        if self.images.find_active(record_id, ImageType::Avatar).await?.is_some() {
            tracing::debug!(record_id = %record_id, "active avatar already present");
            return Ok(RemediationOutcome::AlreadyRemediated);
        }

        let placeholder = self.attributes.settings().placeholder_name.as_str();
        let character = if character.is_attribute_defective(placeholder) {
            tracing::info!(record_id = %record_id, "repairing attributes before avatar generation");
            self.attributes.repair_attributes(character).await?
        } else {
            character
        };

        let species_name = match character.species_id {
            Some(id) => self.attributes.resolver().species_name(id).await,
            None => None,
        };
        let prompt = build_avatar_prompt(&character, species_name.as_deref(), &self.settings);

        tracing::debug!(record_id = %record_id, generator = self.image_generator.name(), "generating avatar");
        let bytes = self.image_generator.generate(&prompt).await?;

        let key = avatar_storage_key(record_id);
        let uploaded = self
            .storage
            .upload(UploadRequest {
                key: key.clone(),
                bytes,
                content_type: AVATAR_CONTENT_TYPE.to_string(),
                cache_control: self.settings.cache_control.clone(),
            })
            .await?;

        let image = CharacterImage::new_active(record_id, ImageType::Avatar, uploaded.public_url, key.clone());
        if let Err(e) = self.images.replace_active(&image).await {
            if let Err(cleanup) = self.storage.delete(&key).await {
                tracing::warn!(
                    record_id = %record_id,
                    key = %key,
                    error = %cleanup,
                    "failed to delete orphaned upload"
                );
            }
            return Err(e);
        }

        tracing::info!(record_id = %record_id, url = %image.url, "avatar activated");
        Ok(RemediationOutcome::Repaired)
    }
}

#[async_trait]
impl Remediator for AvatarRemediator {
    fn job_type(&self) -> JobType {
        JobType::AvatarRemediation
    }

    fn defect_kind(&self) -> DefectKind {
        DefectKind::MissingAvatar
    }

    async fn prepare(&self) -> DomainResult<()> {
        self.attributes.prepare().await
    }

    async fn remediate(&self, record_id: Uuid) -> RemediationOutcome {
        match self.run(record_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(record_id = %record_id, error = %e, "avatar remediation failed");
                RemediationOutcome::failed(e)
            }
        }
    }
}

/// Storage key for a freshly generated avatar. Unique per attempt.
pub fn avatar_storage_key(record_id: Uuid) -> String {
    format!("characters/{record_id}/avatar/{}.png", Uuid::new_v4())
}

/// Build a portrait prompt from a character's attributes.
pub fn build_avatar_prompt(
    character: &Character,
    species_name: Option<&str>,
    settings: &AvatarSettings,
) -> ImagePrompt {
    let mut parts: Vec<String> = PORTRAIT_PREFIX.iter().map(|s| (*s).to_string()).collect();
    if let Some(species) = species_name {
        parts.push(species.to_lowercase());
    }
    for value in [&character.appearance, &character.attire].into_iter().flatten() {
        let value = value.trim();
        if !value.is_empty() {
            parts.push(value.to_string());
        }
    }
    parts.extend(character.tags.iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()));

    ImagePrompt {
        positive_prompt: parts.join(", "),
        negative_prompt: settings.negative_prompt.clone(),
        style_tag: settings.style_tag.clone(),
        content_type_hint: AVATAR_CONTENT_TYPE.to_string(),
        lora_references: settings.lora_references.clone(),
    }
}
