//! Domain errors for the remediation system.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors that can occur while remediating characters.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Character not found: {0}")]
    CharacterNotFound(Uuid),

    #[error("Species not found: {0}")]
    SpeciesNotFound(i64),

    #[error("Job log not found: {0}")]
    JobLogNotFound(Uuid),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Image generation failed: {0}")]
    ImageGenerationFailed(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
