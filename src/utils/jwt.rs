//! JWT helpers
//!
//! Caller identity arrives as an HS256 bearer token whose `sub` claim is the
//! user's UUID. Tokens are issued by the account service; this crate only
//! verifies them (and mints them for tests and local tooling).

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::environment::EnvironmentConfig, utils::errors::AppError};

/// Claims carried by a caller token
#[derive(Debug, Serialize, Deserialize)]
pub struct CallerClaims {
    pub sub: String, // user_id
    pub exp: usize,
    pub iat: usize,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
}

impl From<&EnvironmentConfig> for JwtConfig {
    fn from(config: &EnvironmentConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
        }
    }
}

/// Mint a token for `user_id`, valid for `ttl_seconds`
pub fn generate_token(user_id: Uuid, ttl_seconds: i64, config: &JwtConfig) -> Result<String, AppError> {
    let now = chrono::Utc::now();
    let expires_at = now + chrono::Duration::seconds(ttl_seconds);

    let claims = CallerClaims {
        sub: user_id.to_string(),
        exp: expires_at.timestamp().max(0) as usize,
        iat: now.timestamp().max(0) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_ref()),
    )
    .map_err(|e| AppError::Internal(format!("Error generating token: {}", e)))
}

/// Verify a token and return the caller's user id
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<Uuid, AppError> {
    let token_data = decode::<CallerClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

    Uuid::parse_str(&token_data.claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid user id in token".to_string()))
}

/// Extract the token from an `Authorization` header value
pub fn extract_token_from_header(auth_header: &str) -> Result<&str, AppError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Authorization header must start with 'Bearer '".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AppError::Unauthorized("Token cannot be empty".to_string()));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
        }
    }

    #[test]
    fn test_token_round_trip_yields_user() {
        let user_id = Uuid::new_v4();
        let token = generate_token(user_id, 3600, &config("secret")).unwrap();
        assert_eq!(verify_token(&token, &config("secret")).unwrap(), user_id);
    }

    #[test]
    fn test_wrong_secret_is_unauthorized() {
        let token = generate_token(Uuid::new_v4(), 3600, &config("secret")).unwrap();
        let error = verify_token(&token, &config("other")).unwrap_err();
        assert!(matches!(error, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        let token = generate_token(Uuid::new_v4(), -3600, &config("secret")).unwrap();
        assert!(verify_token(&token, &config("secret")).is_err());
    }

    #[test]
    fn test_extract_token_from_header() {
        assert_eq!(extract_token_from_header("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
        assert!(extract_token_from_header("Basic abc").is_err());
        assert!(extract_token_from_header("Bearer   ").is_err());
    }
}
