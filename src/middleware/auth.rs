//! Caller identity
//!
//! Every rental and billing operation acts on behalf of one explicit user.
//! [`CallerId`] pulls that user out of the `Authorization: Bearer` header.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::{
    state::AppState,
    utils::{
        errors::AppError,
        jwt::{extract_token_from_header, verify_token},
    },
};

/// Authenticated caller, injected into handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerId(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for CallerId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Authorization token required".to_string()))?;

        let token = extract_token_from_header(auth_header)?;
        let user_id = verify_token(token, &state.jwt)?;

        Ok(CallerId(user_id))
    }
}
