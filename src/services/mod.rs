//! Remediation services.
//!
//! - [`species_resolver`]: free-text species label to taxonomy id
//! - [`candidate_selector`]: which records need repair
//! - [`character_remediator`] / [`avatar_remediator`]: per-record executors
//! - [`batch_orchestrator`]: one paced, logged sweep over the candidates

pub mod avatar_remediator;
pub mod batch_orchestrator;
pub mod candidate_selector;
pub mod character_remediator;
pub mod remediator;
pub mod species_resolver;
pub mod synonyms;

pub use avatar_remediator::{build_avatar_prompt, AvatarRemediator, AvatarSettings};
pub use batch_orchestrator::{BatchConfig, BatchOrchestrator, BatchSummary};
pub use candidate_selector::{CandidateSelector, DefectKind};
pub use character_remediator::{merge_generated, CharacterRemediationSettings, CharacterRemediator};
pub use remediator::{RemediationOutcome, Remediator};
pub use species_resolver::{MatchStrategy, Resolution, ResolverConfig, SpeciesResolver};
pub use synonyms::{normalize, SynonymTable};
