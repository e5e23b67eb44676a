//! In-memory collaborators for tests and dry runs.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    GeneratedCharacter, GenerationRequest, ImagePrompt, UploadRequest, UploadedObject,
};
use crate::domain::ports::{CharacterGenerator, ImageGenerator, ObjectStorage};

/// Mock character generator.
///
/// Returns a fixed response, or fails for any request whose seed contains
/// one of the configured failure markers.
pub struct MockCharacterGenerator {
    response: GeneratedCharacter,
    fail_markers: Arc<RwLock<Vec<String>>>,
    requests: Arc<RwLock<Vec<GenerationRequest>>>,
}

impl MockCharacterGenerator {
    pub fn new() -> Self {
        Self::with_response(GeneratedCharacter {
            name: "Mira Vale".to_string(),
            secondary_name: None,
            species: "Human".to_string(),
            appearance: Some("Short auburn hair and a travel-worn cloak".to_string()),
            personality: Some("Curious and stubborn".to_string()),
            backstory: Some("A cartographer's apprentice who never finished her first map".to_string()),
            attire: Some("Leather boots and a patched green coat".to_string()),
            tags: vec!["adventurer".to_string()],
        })
    }

    pub fn with_response(response: GeneratedCharacter) -> Self {
        Self {
            response,
            fail_markers: Arc::new(RwLock::new(Vec::new())),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Fail every request whose seed description contains `marker`.
    pub async fn fail_when_seed_contains(&self, marker: impl Into<String>) {
        self.fail_markers.write().await.push(marker.into());
    }

    /// Requests received so far.
    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.read().await.clone()
    }
}

impl Default for MockCharacterGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CharacterGenerator for MockCharacterGenerator {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(&self, request: &GenerationRequest) -> DomainResult<GeneratedCharacter> {
        self.requests.write().await.push(request.clone());

        let seed = request.seed_description.as_deref().unwrap_or_default();
        let markers = self.fail_markers.read().await;
        if let Some(marker) = markers.iter().find(|m| seed.contains(m.as_str())) {
            return Err(DomainError::GenerationFailed(format!("mock failure for seed marker '{marker}'")));
        }

        Ok(self.response.clone())
    }
}

/// Mock image generator returning a tiny fixed payload.
pub struct MockImageGenerator {
    calls: AtomicUsize,
    fail: bool,
}

impl MockImageGenerator {
    pub fn new() -> Self {
        Self { calls: AtomicUsize::new(0), fail: false }
    }

    pub fn failing() -> Self {
        Self { calls: AtomicUsize::new(0), fail: true }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockImageGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerator for MockImageGenerator {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(&self, _prompt: &ImagePrompt) -> DomainResult<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DomainError::ImageGenerationFailed("mock backend unavailable".to_string()));
        }
        Ok(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
    }
}

/// In-memory object storage.
pub struct MockObjectStorage {
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    deleted: Arc<RwLock<HashSet<String>>>,
    public_base_url: String,
}

impl MockObjectStorage {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            deleted: Arc::new(RwLock::new(HashSet::new())),
            public_base_url: "mock://storage".to_string(),
        }
    }

    pub async fn object_count(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    pub async fn was_deleted(&self, key: &str) -> bool {
        self.deleted.read().await.contains(key)
    }
}

impl Default for MockObjectStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStorage for MockObjectStorage {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn upload(&self, request: UploadRequest) -> DomainResult<UploadedObject> {
        let public_url = format!("{}/{}", self.public_base_url, request.key);
        self.objects.write().await.insert(request.key, request.bytes);
        Ok(UploadedObject { public_url })
    }

    async fn delete(&self, key: &str) -> DomainResult<()> {
        self.objects.write().await.remove(key);
        self.deleted.write().await.insert(key.to_string());
        Ok(())
    }
}
