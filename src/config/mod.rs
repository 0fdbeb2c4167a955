//! Project configuration
//!
//! Database settings, environment variables and other service settings.

pub mod database;
pub mod environment;

pub use database::DatabaseConfig;
pub use environment::*;
