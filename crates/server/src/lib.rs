//! Compliance Assistant Server
//!
//! Provides the HTTP endpoints agents and admins use to query the matrix.

pub mod answer;
pub mod auth;
pub mod http;
pub mod metrics;
pub mod state;

pub use answer::{Answer, AnswerDebug};
pub use auth::admin_auth;
pub use http::create_router;
pub use metrics::{init_metrics, record_knowledge_rows, record_request, record_search_latency};
pub use state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use compliance_assist_rag::RagError;
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    /// Body is the bare message, e.g. "Missing question"
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Knowledge error: {0}")]
    Knowledge(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RagError> for ServerError {
    fn from(err: RagError) -> Self {
        ServerError::Knowledge(err.to_string())
    }
}

impl From<&ServerError> for StatusCode {
    fn from(err: &ServerError) -> Self {
        match err {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Knowledge(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = StatusCode::from(&self);
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            StatusCode::from(&ServerError::InvalidRequest("Missing question".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            StatusCode::from(&ServerError::from(RagError::Io("disk".to_string()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            StatusCode::from(&ServerError::Internal("task panicked".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_request_message_is_bare() {
        let err = ServerError::InvalidRequest("Missing question".to_string());
        assert_eq!(err.to_string(), "Missing question");
    }
}
