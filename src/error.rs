use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::validation::FieldError;

/// Failures reported by a repository implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the statement; carries the driver message.
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Database(sqlx::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return StoreError::Conflict(db.message().to_string());
            }
        }
        StoreError::Database(e)
    }
}

/// Error side of every handler. Rendered as `{"message": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("invalid request: {0:?}")]
    Invalid(Vec<FieldError>),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Invalid(_) | ApiError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let message = match self {
            ApiError::BadRequest(m)
            | ApiError::Unauthorized(m)
            | ApiError::NotFound(m)
            | ApiError::Conflict(m) => Message::One(m.clone()),
            ApiError::Invalid(errors) => {
                Message::Many(errors.iter().map(ToString::to_string).collect())
            }
            // raw detail stays in the log
            ApiError::Internal(_) => Message::One("Database error".into()),
        };
        ErrorBody { message }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<Vec<FieldError>> for ApiError {
    fn from(errors: Vec<FieldError>) -> Self {
        ApiError::Invalid(errors)
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Message {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    message: Message,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let ApiError::Internal(detail) = &self {
            error!(error = %detail, "persistence failure");
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Field;

    fn body_json(err: &ApiError) -> serde_json::Value {
        serde_json::to_value(err.body()).expect("serialize")
    }

    #[test]
    fn field_errors_render_as_array() {
        let err = ApiError::from(vec![
            FieldError::Missing(Field::Title),
            FieldError::Missing(Field::Price),
        ]);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(&err),
            serde_json::json!({"message": ["Title is required", "Price is required"]})
        );
    }

    #[test]
    fn internal_errors_are_sanitized() {
        let err = ApiError::from(StoreError::Unavailable("connection refused".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(&err), serde_json::json!({"message": "Database error"}));
    }

    #[test]
    fn conflicts_keep_the_store_message() {
        let err = ApiError::from(StoreError::Conflict("duplicate key".into()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(&err), serde_json::json!({"message": "duplicate key"}));
    }

    #[test]
    fn not_found_and_unauthorized_statuses() {
        assert_eq!(
            ApiError::NotFound("Book not found".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Unauthorized("nope".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }
}
