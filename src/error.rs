use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClaError {
    #[error("{entity} does not exist: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("storage error: {message}")]
    Storage { message: String },

    #[error("upstream service error: {message}")]
    Upstream { message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ClaError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        ClaError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        ClaError::Storage {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ClaError::NotFound { .. } => StatusCode::NOT_FOUND,
            ClaError::Validation(_) => StatusCode::BAD_REQUEST,
            ClaError::Conflict(_) | ClaError::InvalidStatusTransition { .. } => StatusCode::CONFLICT,
            ClaError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ClaError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        let body = serde_json::json!({
            "code": status.as_u16(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ClaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ClaError::not_found("company", "c-1").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ClaError::Validation("blank".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ClaError::InvalidStatusTransition {
                from: "approved".into(),
                to: "rejected".into()
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ClaError::storage("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = ClaError::not_found("company", "abc");
        assert_eq!(err.to_string(), "company does not exist: abc");
    }
}
