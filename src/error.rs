use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// ApiError
///
/// The single error taxonomy of the application. Every failure that crosses
/// the HTTP boundary is one of these kinds, serialized as
/// `{"error": {"kind": ..., "message": ...}}` so clients can branch on a
/// stable machine-readable kind rather than parsing messages.
///
/// Ordering matters to callers: `Unauthenticated` is raised before any role
/// check, `Forbidden` before any data access, `Validation` before any write.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// No or invalid identity. Rejected before any role check.
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated, but the caller's role is not allowed the operation.
    #[error("{0}")]
    Forbidden(String),

    /// A required field is missing or out of bounds. Rejected before any write.
    #[error("{0}")]
    Validation(String),

    /// The enrollment/assignment/rating pair (or email) already exists.
    /// Existing data is unchanged.
    #[error("{0}")]
    Duplicate(String),

    /// A referenced id does not exist, or lies outside the caller's scope.
    #[error("{0}")]
    NotFound(String),

    /// Storage timeout or connection failure. Safe to retry; no partial
    /// writes are observable.
    #[error("{0}")]
    Unavailable(String),

    /// Anything else. The underlying detail is logged, never sent to the
    /// caller.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        Self::Duplicate(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// The stable, machine-readable discriminator exposed to clients.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthenticated(_) => "unauthenticated",
            Self::Forbidden(_) => "forbidden",
            Self::Validation(_) => "validation_failed",
            Self::Duplicate(_) => "duplicate_conflict",
            Self::NotFound(_) => "not_found",
            Self::Unavailable(_) => "unavailable",
            Self::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Duplicate(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "kind": self.kind(),
                "message": self.to_string(),
            }
        }));
        (self.status(), body).into_response()
    }
}

/// Maps low-level sqlx failures onto the API taxonomy in one place, so no
/// storage error detail leaks to the caller and constraint violations become
/// domain errors.
///
/// Unique violations become `Duplicate` (the database is the authority for
/// pair uniqueness under concurrency), foreign-key violations become
/// `NotFound` (the referenced record does not exist), and pool/transport
/// failures become the retryable `Unavailable`.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::duplicate("record already exists")
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                ApiError::not_found("referenced record does not exist")
            }
            sqlx::Error::RowNotFound => ApiError::not_found("record not found"),
            sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
                tracing::warn!("storage unavailable: {err:?}");
                ApiError::unavailable("storage temporarily unavailable, retry later")
            }
            _ => {
                tracing::error!("database error: {err:?}");
                ApiError::internal("internal storage error")
            }
        }
    }
}
