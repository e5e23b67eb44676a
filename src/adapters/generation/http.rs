//! JSON-over-HTTP clients for the generation, image and storage services.
//!
//! Every client is built with a request timeout, so a hung collaborator
//! surfaces as an ordinary error instead of stalling a batch.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use std::time::Duration;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    GeneratedCharacter, GenerationConfig, GenerationRequest, ImageConfig, ImagePrompt,
    StorageConfig, UploadRequest, UploadedObject,
};
use crate::domain::ports::{CharacterGenerator, ImageGenerator, ObjectStorage};

fn build_client(timeout_secs: u64) -> DomainResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| DomainError::ExecutionFailed(format!("Failed to build HTTP client: {e}")))
}

fn api_key(configured: Option<&String>, env_var: &str) -> Option<String> {
    configured.cloned().or_else(|| std::env::var(env_var).ok())
}

fn with_auth(request: reqwest::RequestBuilder, key: Option<&String>) -> reqwest::RequestBuilder {
    match key {
        Some(key) => request.header(header::AUTHORIZATION, format!("Bearer {key}")),
        None => request,
    }
}

async fn error_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read response body".to_string())
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Character generation service client.
pub struct HttpCharacterGenerator {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpCharacterGenerator {
    pub fn new(config: &GenerationConfig) -> DomainResult<Self> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            base_url: config.base_url.clone(),
            api_key: api_key(config.api_key.as_ref(), "MENDER_GENERATION_API_KEY"),
        })
    }
}

#[async_trait]
impl CharacterGenerator for HttpCharacterGenerator {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn generate(&self, request: &GenerationRequest) -> DomainResult<GeneratedCharacter> {
        let url = join_url(&self.base_url, "characters/generate");
        let response = with_auth(self.client.post(&url), self.api_key.as_ref())
            .json(request)
            .send()
            .await
            .map_err(|e| DomainError::GenerationFailed(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = error_body(response).await;
            return Err(DomainError::GenerationFailed(format!("service returned {status}: {body}")));
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::SerializationError(format!("Failed to parse generation response: {e}")))
    }
}

/// Image generation backend client.
pub struct HttpImageGenerator {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpImageGenerator {
    pub fn new(config: &ImageConfig) -> DomainResult<Self> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            base_url: config.base_url.clone(),
            api_key: api_key(config.api_key.as_ref(), "MENDER_IMAGE_API_KEY"),
        })
    }
}

#[async_trait]
impl ImageGenerator for HttpImageGenerator {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn generate(&self, prompt: &ImagePrompt) -> DomainResult<Vec<u8>> {
        let url = join_url(&self.base_url, "images/generate");
        let response = with_auth(self.client.post(&url), self.api_key.as_ref())
            .json(prompt)
            .send()
            .await
            .map_err(|e| DomainError::ImageGenerationFailed(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = error_body(response).await;
            return Err(DomainError::ImageGenerationFailed(format!("backend returned {status}: {body}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DomainError::ImageGenerationFailed(format!("failed to read image body: {e}")))?;

        if bytes.is_empty() {
            return Err(DomainError::ImageGenerationFailed("backend returned an empty image".to_string()));
        }
        Ok(bytes.to_vec())
    }
}

/// Object storage client. Objects are written with `PUT {base_url}/{key}`
/// and served from `{public_base_url}/{key}`.
pub struct HttpObjectStorage {
    client: Client,
    base_url: String,
    public_base_url: String,
    api_key: Option<String>,
}

impl HttpObjectStorage {
    pub fn new(config: &StorageConfig) -> DomainResult<Self> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            base_url: config.base_url.clone(),
            public_base_url: config.public_base_url.clone(),
            api_key: api_key(config.api_key.as_ref(), "MENDER_STORAGE_API_KEY"),
        })
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn upload(&self, request: UploadRequest) -> DomainResult<UploadedObject> {
        let url = join_url(&self.base_url, &request.key);
        let response = with_auth(self.client.put(&url), self.api_key.as_ref())
            .header(header::CONTENT_TYPE, &request.content_type)
            .header(header::CACHE_CONTROL, &request.cache_control)
            .body(request.bytes)
            .send()
            .await
            .map_err(|e| DomainError::StorageError(format!("upload of {} failed: {e}", request.key)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = error_body(response).await;
            return Err(DomainError::StorageError(format!(
                "upload of {} returned {status}: {body}",
                request.key
            )));
        }

        Ok(UploadedObject {
            public_url: join_url(&self.public_base_url, &request.key),
        })
    }

    async fn delete(&self, key: &str) -> DomainResult<()> {
        let url = join_url(&self.base_url, key);
        let response = with_auth(self.client.delete(&url), self.api_key.as_ref())
            .send()
            .await
            .map_err(|e| DomainError::StorageError(format!("delete of {key} failed: {e}")))?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else {
            let body = error_body(response).await;
            Err(DomainError::StorageError(format!("delete of {key} returned {status}: {body}")))
        }
    }
}
