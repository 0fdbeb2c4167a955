//! Request extractors
//!
//! Thin wrappers over axum's `Json`, `Path` and `Query` whose rejections are
//! reported as [`AppError::InvalidInput`] instead of axum's plain-text bodies.

use axum::extract::{FromRequest, FromRequestParts};

use crate::utils::errors::AppError;

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// Path parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// Query string
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);
