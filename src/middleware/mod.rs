//! HTTP middleware
//!
//! Caller identity, request extractors and CORS.

pub mod auth;
pub mod cors;
pub mod extract;

pub use auth::CallerId;
pub use cors::*;
pub use extract::{AppJson, AppPath, AppQuery};
