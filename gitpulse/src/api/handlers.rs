//! HTTP handlers: analysis, health, and metric discovery.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use validator::Validate;

use crate::api::dto::{
    AnalyzeRequest, AnalyzeResponse, ErrorEnvelope, HealthResponse, MetricsResponse,
};
use crate::api::state::AppState;
use crate::config::AVAILABLE_METRICS;
use crate::error::PulseError;

/// `POST /analyze`
///
/// Runs the full pipeline and answers with the success envelope, or with the
/// error envelope when the pipeline gives up.
pub async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Response {
    if let Err(errors) = request.validate() {
        let envelope =
            ErrorEnvelope::new("Invalid query").with_details(errors.to_string());
        return (StatusCode::BAD_REQUEST, Json(envelope)).into_response();
    }

    match state.analytics.answer(request.into()).await {
        Ok(outcome) => {
            let response = AnalyzeResponse {
                session_id: outcome.session_id,
                response_type: outcome.result.body.kind(),
                response: outcome.result.body.into_value(),
                history: outcome.history,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: PulseError) -> Response {
    match error {
        PulseError::RetryExhausted {
            details,
            raw_response,
        } => {
            let envelope = ErrorEnvelope::new("Response formatting failed")
                .with_details(details)
                .with_raw_response(raw_response)
                .with_suggestion("Try a simpler query or different metrics");
            (StatusCode::UNPROCESSABLE_ENTITY, Json(envelope)).into_response()
        }
        PulseError::Validation(message) => {
            let envelope = ErrorEnvelope::new("Invalid query").with_details(message);
            (StatusCode::BAD_REQUEST, Json(envelope)).into_response()
        }
        PulseError::Retrieval(message) => {
            tracing::error!(error = %message, "Context retrieval failed");
            let envelope = ErrorEnvelope::new("Context retrieval failed").with_details(message);
            (StatusCode::BAD_GATEWAY, Json(envelope)).into_response()
        }
        PulseError::LlmUnavailable(message) => {
            let envelope = ErrorEnvelope::new("Model unavailable").with_details(message);
            (StatusCode::SERVICE_UNAVAILABLE, Json(envelope)).into_response()
        }
        rate_limited @ PulseError::LlmRateLimit { .. } => {
            let envelope = ErrorEnvelope::new(rate_limited.to_string())
                .with_suggestion("Please retry shortly");
            (StatusCode::TOO_MANY_REQUESTS, Json(envelope)).into_response()
        }
        other => {
            tracing::error!(error = %other, "Analysis request failed");
            let envelope = ErrorEnvelope::new("Analysis failed")
                .with_details(other.to_string())
                .with_suggestion("Please rephrase your query");
            (StatusCode::BAD_GATEWAY, Json(envelope)).into_response()
        }
    }
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ready".to_string(),
        model: state
            .llm
            .model_name()
            .unwrap_or_else(|| "unavailable".to_string()),
        vector_store: state.analytics.vector_ready(),
        data_ready: state.analytics.data_ready(),
    })
}

/// `GET /metrics` — the fixed set of recognized telemetry metric names.
pub async fn list_metrics() -> Json<MetricsResponse> {
    Json(MetricsResponse {
        metrics: AVAILABLE_METRICS.iter().map(|m| m.to_string()).collect(),
    })
}

/// `GET /` — API self-description.
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Engineering Telemetry Analytics API with semantic search",
        "endpoints": {
            "POST /analyze": {
                "description": "Analyze engineering telemetry with natural language",
                "example_body": {"prompt": "Compare commits between React and Vue"}
            },
            "GET /metrics": "List all metric names recognized in queries",
            "GET /health": "Check API status and dependencies"
        },
        "features": [
            "Semantic search over indexed telemetry",
            "JSON-formatted responses with visualizations",
            "Conversational memory"
        ]
    }))
}
