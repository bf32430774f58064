//! Two-tier query classification: a deterministic keyword pass for the common
//! cases, with an LLM fallback for open-vocabulary queries.

use std::sync::Arc;

use crate::llm::{prompts, GenerationOptions, TextGenerator};
use crate::models::QueryIntent;

/// Keyword phrases per intent, in priority order. The first intent with a
/// matching phrase wins, so the order of this table is significant.
const KEYWORD_TABLE: &[(QueryIntent, &[&str])] = &[
    (
        QueryIntent::Compare,
        &["compare", "vs", "versus", "difference between", "comparison", "contrast"],
    ),
    (
        QueryIntent::Trend,
        &["trend", "over time", "history", "evolution", "progress", "last month", "last year"],
    ),
    (
        QueryIntent::CodeQuality,
        &["quality", "sonar", "bugs", "vulnerabilities", "code smells", "coverage", "technical debt"],
    ),
    (
        QueryIntent::CiCd,
        &["ci", "cd", "pipeline", "build", "deploy", "github actions", "jenkins", "failed tests"],
    ),
    (
        QueryIntent::TeamPerformance,
        &["team performance", "velocity", "review delay", "merge time", "contributors"],
    ),
    (
        QueryIntent::RiskAssessment,
        &["risk", "risky", "reopened", "exposure"],
    ),
    (
        QueryIntent::CodeHealth,
        &["code health", "maintainability", "debt ratio"],
    ),
    (
        QueryIntent::ReleaseReadiness,
        &["release", "readiness", "ship", "milestone"],
    ),
    (
        QueryIntent::Productivity,
        &["productivity", "throughput", "output"],
    ),
    (
        QueryIntent::Prediction,
        &["predict", "forecast", "estimate", "projection"],
    ),
    (
        QueryIntent::Anomaly,
        &["anomaly", "anomalies", "unusual", "spike", "outlier"],
    ),
    (
        QueryIntent::Activity,
        &["activity", "active", "engagement"],
    ),
    (
        QueryIntent::Stats,
        &["stats", "statistics", "count", "total", "average", "how many"],
    ),
];

/// Deterministic keyword tier. Matches whole words/phrases only: both the
/// query and the phrase are padded with spaces, so "ci" does not fire inside
/// "social".
pub fn classify_keywords(query: &str) -> Option<QueryIntent> {
    let padded = format!(" {} ", query.to_lowercase());

    KEYWORD_TABLE.iter().find_map(|(intent, phrases)| {
        phrases
            .iter()
            .any(|phrase| padded.contains(&format!(" {phrase} ")))
            .then_some(*intent)
    })
}

/// Maps free text to a [`QueryIntent`]. Total: classification never fails,
/// unrecognized input degrades to `Unknown`.
#[derive(Clone)]
pub struct QueryClassifier {
    llm: Arc<dyn TextGenerator>,
    options: GenerationOptions,
}

impl QueryClassifier {
    pub fn new(llm: Arc<dyn TextGenerator>, options: GenerationOptions) -> Self {
        Self { llm, options }
    }

    pub async fn classify(&self, query: &str) -> QueryIntent {
        if let Some(intent) = classify_keywords(query) {
            return intent;
        }

        match self
            .llm
            .generate(&prompts::classifier_prompt(query), &self.options)
            .await
        {
            Ok(reply) => QueryIntent::from_token(&reply),
            Err(e) => {
                tracing::warn!(error = %e, "Intent classification fell back to unknown");
                QueryIntent::Unknown
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PulseError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CannedLlm {
        reply: Result<&'static str>,
        calls: AtomicUsize,
    }

    impl CannedLlm {
        fn replying(reply: &'static str) -> Self {
            Self {
                reply: Ok(reply),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(PulseError::Llm("provider down".to_string())),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for CannedLlm {
        async fn generate(&self, _prompt: &str, _options: &GenerationOptions) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(text) => Ok((*text).to_string()),
                Err(_) => Err(PulseError::Llm("provider down".to_string())),
            }
        }
    }

    fn options() -> GenerationOptions {
        GenerationOptions {
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 16,
        }
    }

    #[test]
    fn compare_keyword_wins() {
        assert_eq!(
            classify_keywords("Compare commits between React and Vue"),
            Some(QueryIntent::Compare)
        );
    }

    #[test]
    fn keyword_matching_is_whole_word_only() {
        // "ci" must not match inside "social".
        assert_eq!(classify_keywords("social coding platforms"), None);
        assert_eq!(classify_keywords("why did ci fail today"), Some(QueryIntent::CiCd));
    }

    #[test]
    fn first_matching_intent_in_table_order_wins() {
        // "compare" (Compare) appears before "trend" (Trend) in the table.
        assert_eq!(
            classify_keywords("compare the trend of merge times"),
            Some(QueryIntent::Compare)
        );
    }

    #[test]
    fn keyword_tier_is_deterministic() {
        for _ in 0..3 {
            assert_eq!(
                classify_keywords("show the coverage trend"),
                Some(QueryIntent::Trend)
            );
        }
    }

    #[tokio::test]
    async fn keyword_match_never_calls_the_llm() {
        let llm = Arc::new(CannedLlm::replying("stats"));
        let classifier = QueryClassifier::new(llm.clone(), options());
        let intent = classifier.classify("compare react and vue").await;
        assert_eq!(intent, QueryIntent::Compare);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn llm_fallback_resolves_enumerated_token() {
        let llm = Arc::new(CannedLlm::replying("team_performance"));
        let classifier = QueryClassifier::new(llm.clone(), options());
        let intent = classifier.classify("who shipped the most value?").await;
        assert_eq!(intent, QueryIntent::TeamPerformance);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn llm_fallback_with_garbage_reply_is_unknown() {
        let llm = Arc::new(CannedLlm::replying("I think this is about commits"));
        let classifier = QueryClassifier::new(llm, options());
        let intent = classifier.classify("tell me something interesting").await;
        assert_eq!(intent, QueryIntent::Unknown);
    }

    #[tokio::test]
    async fn llm_failure_degrades_to_unknown() {
        let llm = Arc::new(CannedLlm::failing());
        let classifier = QueryClassifier::new(llm, options());
        let intent = classifier.classify("tell me something interesting").await;
        assert_eq!(intent, QueryIntent::Unknown);
    }
}
