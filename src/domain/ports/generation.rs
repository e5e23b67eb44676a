//! Ports for the external generation collaborators.
//!
//! All of them are slow and fallible. Timeouts are the responsibility of
//! the implementing client.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    GeneratedCharacter, GenerationRequest, ImagePrompt, UploadRequest, UploadedObject,
};

/// Synthesizes character attributes from partial input.
#[async_trait]
pub trait CharacterGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, request: &GenerationRequest) -> DomainResult<GeneratedCharacter>;
}

/// Renders an image from a prompt and returns the raw bytes.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, prompt: &ImagePrompt) -> DomainResult<Vec<u8>>;
}

/// Object storage / CDN upload.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn upload(&self, request: UploadRequest) -> DomainResult<UploadedObject>;

    /// Remove an object. Missing objects are not an error.
    async fn delete(&self, key: &str) -> DomainResult<()>;
}
