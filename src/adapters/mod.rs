//! Infrastructure adapters for external systems.

pub mod dry_run;
pub mod generation;
pub mod sqlite;
