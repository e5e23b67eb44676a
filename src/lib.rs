//! mender - remediation sweeps for auto-generated characters
//!
//! Finds character records that were created with missing attributes or
//! without an avatar, regenerates what is missing through external
//! collaborators, and records every sweep in an append-only job log.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors, and port traits
//! - **Adapters** (`adapters`): `SQLite` repositories and HTTP/mock collaborators
//! - **Service Layer** (`services`): species resolution, candidate selection,
//!   per-record remediation, and batch orchestration
//! - **Infrastructure Layer** (`infrastructure`): configuration, logging, setup
//! - **CLI Layer** (`cli`): command-line interface

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    Character, CharacterImage, Config, ImageType, JobLogEntry, JobStatus, JobType, RecordError, Species, Taxonomy,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    BatchOrchestrator, BatchSummary, CandidateSelector, DefectKind, RemediationOutcome, Remediator, SpeciesResolver,
};
