//! Infrastructure layer module
//!
//! - Configuration management (figment)
//! - Logging (tracing-subscriber, tracing-appender)
//! - Project setup for `mender init`

pub mod config;
pub mod logging;
pub mod setup;
