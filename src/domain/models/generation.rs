//! Request/response shapes exchanged with the generation, image and
//! storage collaborators.

use serde::{Deserialize, Serialize};

use super::character::PartialCharacter;

/// Request to the character generation collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Free-text seed. `None` lets the collaborator invent freely.
    pub seed_description: Option<String>,
    /// Always `None` for remediation; no reference image is analysed.
    pub image_analysis: Option<String>,
    pub existing_attributes: PartialCharacter,
    pub language_hint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller_context: Option<String>,
}

/// A fully populated attribute set returned by generation.
///
/// `species` is free text and must go through species resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCharacter {
    pub name: String,
    #[serde(default)]
    pub secondary_name: Option<String>,
    #[serde(default)]
    pub species: String,
    #[serde(default)]
    pub appearance: Option<String>,
    #[serde(default)]
    pub personality: Option<String>,
    #[serde(default)]
    pub backstory: Option<String>,
    #[serde(default)]
    pub attire: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Request to the image generation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePrompt {
    pub positive_prompt: String,
    pub negative_prompt: String,
    pub style_tag: String,
    pub content_type_hint: String,
    #[serde(default)]
    pub lora_references: Vec<String>,
}

/// Request to the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub key: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub cache_control: String,
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedObject {
    pub public_url: String,
}
