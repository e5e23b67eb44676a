pub mod character;
pub mod config;
pub mod generation;
pub mod image;
pub mod job_log;
pub mod species;

pub use character::{Character, PartialCharacter};
pub use config::{
    Config, DatabaseConfig, GenerationConfig, ImageConfig, LoggingConfig, RemediationConfig,
    StorageConfig, DEFAULT_GENERATOR_USER_ID,
};
pub use generation::{GeneratedCharacter, GenerationRequest, ImagePrompt, UploadRequest, UploadedObject};
pub use image::{CharacterImage, ImageType};
pub use job_log::{JobLogEntry, JobStatus, JobType, RecordError};
pub use species::{Species, Taxonomy, TaxonomyEntry};
