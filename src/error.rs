use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Access denied: {0}")]
    Unauthorized(String),

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref err) => match err {
                DatabaseError::NotFound => (StatusCode::NOT_FOUND, "Resource not found"),
                DatabaseError::Duplicate => (StatusCode::CONFLICT, "Resource already exists"),
                DatabaseError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Invalid input data"),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred",
                ),
            },
            AppError::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AppError::Unauthorized(_) => (StatusCode::FORBIDDEN, "Access denied"),
            AppError::InvalidTransition { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Status transition not permitted",
            ),
            AppError::PreconditionFailed(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "Precondition failed")
            }
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "Validation error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Resource not found"),
            AppError::Conflict(_) => (StatusCode::CONFLICT, "Resource conflict"),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred",
            ),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "details": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(DatabaseError::from(err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_mapping() {
        let cases = [
            (
                AppError::Unauthenticated("no token".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AppError::Unauthorized("no capability".into()),
                StatusCode::FORBIDDEN,
            ),
            (
                AppError::InvalidTransition {
                    from: "completed".into(),
                    to: "planned".into(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::PreconditionFailed("date".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (AppError::NotFound("session".into()), StatusCode::NOT_FOUND),
            (AppError::Conflict("stale".into()), StatusCode::CONFLICT),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
