use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of analysis categories a query can ask for. Produced by the
/// classifier, consumed by the retriever and the prompt composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    Compare,
    Trend,
    Stats,
    CodeQuality,
    CiCd,
    Activity,
    Prediction,
    Anomaly,
    TeamPerformance,
    RiskAssessment,
    Productivity,
    CodeHealth,
    ReleaseReadiness,
    #[default]
    Unknown,
}

impl QueryIntent {
    pub const ALL: &'static [QueryIntent] = &[
        QueryIntent::Compare,
        QueryIntent::Trend,
        QueryIntent::Stats,
        QueryIntent::CodeQuality,
        QueryIntent::CiCd,
        QueryIntent::Activity,
        QueryIntent::Prediction,
        QueryIntent::Anomaly,
        QueryIntent::TeamPerformance,
        QueryIntent::RiskAssessment,
        QueryIntent::Productivity,
        QueryIntent::CodeHealth,
        QueryIntent::ReleaseReadiness,
        QueryIntent::Unknown,
    ];

    pub fn as_token(&self) -> &'static str {
        match self {
            QueryIntent::Compare => "compare",
            QueryIntent::Trend => "trend",
            QueryIntent::Stats => "stats",
            QueryIntent::CodeQuality => "code_quality",
            QueryIntent::CiCd => "ci_cd",
            QueryIntent::Activity => "activity",
            QueryIntent::Prediction => "prediction",
            QueryIntent::Anomaly => "anomaly",
            QueryIntent::TeamPerformance => "team_performance",
            QueryIntent::RiskAssessment => "risk_assessment",
            QueryIntent::Productivity => "productivity",
            QueryIntent::CodeHealth => "code_health",
            QueryIntent::ReleaseReadiness => "release_readiness",
            QueryIntent::Unknown => "unknown",
        }
    }

    /// Resolve a classifier token back into an intent. Anything outside the
    /// enumeration maps to `Unknown`.
    pub fn from_token(token: &str) -> QueryIntent {
        let token = token.trim().to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|intent| intent.as_token() == token)
            .unwrap_or(QueryIntent::Unknown)
    }
}

/// An analytical question about engineering telemetry. Immutable once
/// submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsQuery {
    pub prompt: String,
    pub session_id: Option<String>,
    #[serde(default)]
    pub intent: QueryIntent,
    /// Optional restriction to specific repositories.
    pub repos: Option<Vec<String>>,
    /// Optional (start, end) analysis period.
    pub timeframe: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl AnalyticsQuery {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            session_id: None,
            intent: QueryIntent::Unknown,
            repos: None,
            timeframe: None,
        }
    }
}
