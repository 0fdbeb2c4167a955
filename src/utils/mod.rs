//! System utilities
//!
//! Error handling, JWT helpers and the time domains.

pub mod errors;
pub mod jwt;
pub mod time;
