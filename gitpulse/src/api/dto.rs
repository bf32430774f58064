//! Request/response DTOs for the analysis API.
//!
//! Success envelope: `{session_id, response_type, response, history}`.
//! Error envelope: `{error, details?, raw_response?, suggestion?}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{AnalyticsQuery, ConversationTurn, QueryIntent};

fn validate_prompt_words(prompt: &str) -> Result<(), ValidationError> {
    if prompt.split_whitespace().count() < 2 {
        let mut error = ValidationError::new("prompt_too_short");
        error.message = Some("Query must contain at least 2 words".into());
        return Err(error);
    }
    Ok(())
}

fn validate_session_id(session_id: &str) -> Result<(), ValidationError> {
    if Uuid::parse_str(session_id).is_err() {
        let mut error = ValidationError::new("invalid_session_id");
        error.message = Some("session_id must be a UUID".into());
        return Err(error);
    }
    Ok(())
}

/// Body of `POST /analyze`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnalyzeRequest {
    #[validate(custom(function = validate_prompt_words))]
    pub prompt: String,
    #[validate(custom(function = validate_session_id))]
    pub session_id: Option<String>,
    #[serde(default)]
    pub intent: QueryIntent,
    pub repos: Option<Vec<String>>,
    pub timeframe: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl From<AnalyzeRequest> for AnalyticsQuery {
    fn from(req: AnalyzeRequest) -> Self {
        Self {
            prompt: req.prompt,
            session_id: req.session_id,
            intent: req.intent,
            repos: req.repos,
            timeframe: req.timeframe,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub session_id: String,
    pub response_type: &'static str,
    pub response: Value,
    pub history: Vec<ConversationTurn>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            raw_response: None,
            suggestion: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_raw_response(mut self, raw: impl Into<String>) -> Self {
        self.raw_response = Some(raw.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub vector_store: bool,
    pub data_ready: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsResponse {
    pub metrics: Vec<String>,
}
