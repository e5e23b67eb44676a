//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that adapters must implement:
//! - CharacterRepository, SpeciesRepository, CharacterImageRepository,
//!   JobLogRepository: the record store
//! - CharacterGenerator, ImageGenerator, ObjectStorage: external services
//!
//! These traits keep the remediation services independent of `SQLite` and
//! of the concrete HTTP collaborators.

pub mod character_repository;
pub mod generation;
pub mod image_repository;
pub mod job_log_repository;
pub mod species_repository;

pub use character_repository::CharacterRepository;
pub use generation::{CharacterGenerator, ImageGenerator, ObjectStorage};
pub use image_repository::CharacterImageRepository;
pub use job_log_repository::JobLogRepository;
pub use species_repository::SpeciesRepository;
