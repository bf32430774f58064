use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    #[error("LLM rate limit exceeded, retry after {retry_after:?} seconds")]
    LlmRateLimit { retry_after: Option<u64> },

    #[error("Response formatting failed after all attempts: {details}")]
    RetryExhausted {
        details: String,
        raw_response: String,
    },

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for PulseError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            PulseError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            PulseError::Retrieval(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            PulseError::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            PulseError::Http(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            PulseError::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            PulseError::Llm(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            PulseError::LlmUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            PulseError::LlmRateLimit { .. } => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            PulseError::RetryExhausted { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            PulseError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, PulseError>;
