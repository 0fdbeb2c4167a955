//! Error handling
//!
//! Defines every error the rental engine can signal and how each one is
//! turned into an HTTP response at the boundary.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Classification of failures exposed to callers.
///
/// Every operation of the engine returns exactly one of these kinds on
/// failure. Only `Unavailable` is safe to retry without changing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    Conflict,
    Forbidden,
    PolicyRejected,
    Unavailable,
    Unauthorized,
    Internal,
}

/// Main application errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Rejected by policy: {0}")]
    PolicyRejected(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) | AppError::InvalidInput(_) => ErrorKind::InvalidInput,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::Forbidden(_) => ErrorKind::Forbidden,
            AppError::PolicyRejected(_) => ErrorKind::PolicyRejected,
            AppError::Unavailable(_) => ErrorKind::Unavailable,
            AppError::Unauthorized(_) => ErrorKind::Unauthorized,
            AppError::Database(_) | AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Unavailable
    }

    /// Wrap a driver error raised by a statement inside a unit of work.
    ///
    /// Unique violations come from the partial indexes guarding the
    /// one-active-rental invariants, so they surface as `Conflict`.
    pub fn from_statement(context: &str, error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict(format!("{}: {}", context, db.message()))
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::Unavailable(error)
            }
            _ => AppError::Database(error),
        }
    }
}

// Malformed bodies, paths and query strings are caller errors like any other.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

/// Error body returned by the API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    code: String,
}

impl ErrorKind {
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::PolicyRejected => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::PolicyRejected => "POLICY_REJECTED",
            ErrorKind::Unavailable => "SERVICE_UNAVAILABLE",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }

    fn title(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "Invalid Input",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::PolicyRejected => "Policy Rejected",
            ErrorKind::Unavailable => "Service Unavailable",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Internal => "Internal Server Error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();

        let (message, details) = match &self {
            AppError::Validation(e) => (
                "The provided data is invalid".to_string(),
                Some(json!(e)),
            ),
            AppError::Unavailable(e) => {
                tracing::error!(error.message = %e, "Storage unavailable");
                (
                    "Storage is temporarily unavailable, retry later".to_string(),
                    None,
                )
            }
            AppError::Database(e) => {
                tracing::error!(error.cause_chain = ?e, error.message = %e, "Database error");
                (
                    "An error occurred while accessing the database".to_string(),
                    None,
                )
            }
            AppError::Internal(msg) => {
                tracing::error!(error.message = %msg, "Internal error");
                ("An unexpected error occurred".to_string(), None)
            }
            AppError::InvalidInput(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Forbidden(msg)
            | AppError::PolicyRejected(msg)
            | AppError::Unauthorized(msg) => {
                tracing::debug!(code = kind.code(), "{}", msg);
                (msg.clone(), None)
            }
        };

        let body = ErrorResponse {
            error: kind.title().to_string(),
            message,
            details,
            code: kind.code().to_string(),
        };

        (kind.status_code(), Json(body)).into_response()
    }
}

/// Typed result for fallible operations
pub type AppResult<T> = Result<T, AppError>;

/// Helper for missing resources
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Helper for malformed request data
pub fn invalid_input_error(message: &str) -> AppError {
    AppError::InvalidInput(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_map_to_status_codes() {
        let cases = [
            (AppError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (AppError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (
                AppError::PolicyRejected("x".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::Unavailable(sqlx::Error::PoolTimedOut),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_only_unavailable_is_retryable() {
        assert!(AppError::Unavailable(sqlx::Error::PoolClosed).is_retryable());
        assert!(!AppError::Conflict("taken".into()).is_retryable());
        assert!(!AppError::PolicyRejected("late".into()).is_retryable());
    }

    #[test]
    fn test_pool_timeout_is_unavailable() {
        let error = AppError::from_statement("insert rental", sqlx::Error::PoolTimedOut);
        assert_eq!(error.kind(), ErrorKind::Unavailable);

        let error = AppError::from_statement("insert rental", sqlx::Error::RowNotFound);
        assert_eq!(error.kind(), ErrorKind::Internal);
    }

    #[derive(Debug)]
    struct FakeDbError {
        unique: bool,
    }

    impl std::fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "fake database error")
        }
    }

    impl std::error::Error for FakeDbError {}

    impl sqlx::error::DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint \"rentals_one_active_per_vehicle\""
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            if self.unique {
                sqlx::error::ErrorKind::UniqueViolation
            } else {
                sqlx::error::ErrorKind::ForeignKeyViolation
            }
        }
    }

    #[test]
    fn test_unique_violation_is_conflict() {
        let error = sqlx::Error::Database(Box::new(FakeDbError { unique: true }));
        let error = AppError::from_statement("creating rental", error);

        assert_eq!(error.kind(), ErrorKind::Conflict);
        assert!(error.to_string().contains("rentals_one_active_per_vehicle"));
        assert_eq!(error.into_response().status(), StatusCode::CONFLICT);

        let error = sqlx::Error::Database(Box::new(FakeDbError { unique: false }));
        assert_eq!(AppError::from_statement("creating rental", error).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_validation_errors_are_invalid_input() {
        let errors = validator::ValidationErrors::new();
        assert_eq!(AppError::from(errors).kind(), ErrorKind::InvalidInput);
    }
}
