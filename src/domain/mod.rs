//! Domain layer for the remediation system.
//!
//! Core models, port traits, and error types. Nothing in here talks to a
//! database or the network directly.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
