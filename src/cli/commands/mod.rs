//! CLI command implementations.

pub mod init;
pub mod jobs;
pub mod remediate;
pub mod species;
