use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;

use crate::config::VectorConfig;
use crate::error::Result;
use crate::models::{QueryIntent, RetrievedRecord};
use crate::retrieval::VectorSearch;

/// Wraps the similarity-search capability with intent-aware filtering and a
/// hard cap on the number of records handed to the prompt composer.
#[derive(Clone)]
pub struct ContextRetriever {
    search: Arc<dyn VectorSearch>,
    raw_hits: usize,
    max_records: usize,
    data_ready: Arc<AtomicBool>,
}

/// Document category naturally matching an intent. Records of this type are
/// preferred; others are deprioritized but never dropped to empty.
fn preferred_doc_type(intent: QueryIntent) -> Option<&'static str> {
    match intent {
        QueryIntent::TeamPerformance => Some("developer"),
        QueryIntent::Trend => Some("trend"),
        QueryIntent::RiskAssessment => Some("kpi_status"),
        _ => None,
    }
}

impl ContextRetriever {
    pub fn new(search: Arc<dyn VectorSearch>, config: &VectorConfig) -> Self {
        Self {
            search,
            raw_hits: config.raw_hits.max(1),
            max_records: config.max_records.max(1),
            data_ready: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Retrieve, rank, and flatten context records for a query. A search
    /// failure is a retrieval error; it is not retried here.
    ///
    /// With a resolved intent the hits are ranked by document-type preference
    /// and narrowed to `max_records`; an unknown intent keeps the raw top
    /// hits untouched.
    pub async fn retrieve(&self, query: &str, intent: QueryIntent) -> Result<Vec<Value>> {
        let hits = self.search.search(query, self.raw_hits).await?;
        self.data_ready.store(true, Ordering::Relaxed);

        let cap = if intent == QueryIntent::Unknown {
            self.raw_hits
        } else {
            self.max_records
        };
        let ranked = rank_by_intent(hits, intent);

        Ok(ranked
            .iter()
            .take(cap)
            .map(RetrievedRecord::flatten)
            .collect())
    }

    /// True once at least one search has completed successfully.
    pub fn has_retrieved(&self) -> bool {
        self.data_ready.load(Ordering::Relaxed)
    }

    pub fn is_ready(&self) -> bool {
        self.search.is_ready()
    }
}

/// Stable partition: records whose metadata type matches the intent's
/// preferred category first, everything else after, original order preserved
/// within each group.
fn rank_by_intent(hits: Vec<RetrievedRecord>, intent: QueryIntent) -> Vec<RetrievedRecord> {
    let Some(preferred) = preferred_doc_type(intent) else {
        return hits;
    };

    let (matching, rest): (Vec<_>, Vec<_>) = hits
        .into_iter()
        .partition(|record| record.doc_type() == Some(preferred));

    let mut ranked = matching;
    ranked.extend(rest);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PulseError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct FixedSearch {
        hits: Vec<RetrievedRecord>,
        seen_k: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl VectorSearch for FixedSearch {
        async fn search(&self, _query: &str, k: usize) -> Result<Vec<RetrievedRecord>> {
            self.seen_k.lock().expect("lock").push(k);
            Ok(self.hits.clone())
        }

        fn is_ready(&self) -> bool {
            true
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl VectorSearch for FailingSearch {
        async fn search(&self, _query: &str, _k: usize) -> Result<Vec<RetrievedRecord>> {
            Err(PulseError::Retrieval("index offline".to_string()))
        }

        fn is_ready(&self) -> bool {
            false
        }
    }

    fn record(doc_type: &str, name: &str) -> RetrievedRecord {
        RetrievedRecord {
            content: json!({"name": name}).to_string(),
            metadata: json!({"type": doc_type})
                .as_object()
                .expect("object")
                .clone(),
        }
    }

    fn config() -> VectorConfig {
        VectorConfig {
            base_url: "http://localhost:8100".to_string(),
            api_key: None,
            timeout_secs: 5,
            max_retries: 0,
            raw_hits: 5,
            max_records: 3,
        }
    }

    fn retriever(hits: Vec<RetrievedRecord>) -> ContextRetriever {
        ContextRetriever::new(
            Arc::new(FixedSearch {
                hits,
                seen_k: Mutex::new(Vec::new()),
            }),
            &config(),
        )
    }

    #[tokio::test]
    async fn caps_results_at_max_records() {
        let hits = (0..5).map(|i| record("stat", &format!("r{i}"))).collect();
        let retriever = retriever(hits);
        let records = retriever
            .retrieve("commit activity", QueryIntent::Stats)
            .await
            .expect("retrieve");
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["name"], "r0");
    }

    #[tokio::test]
    async fn intent_preference_reorders_but_keeps_everything() {
        let hits = vec![
            record("trend", "t1"),
            record("developer", "d1"),
            record("developer", "d2"),
            record("trend", "t2"),
        ];
        let retriever = retriever(hits);
        let records = retriever
            .retrieve("who is fastest", QueryIntent::TeamPerformance)
            .await
            .expect("retrieve");
        let names: Vec<&str> = records.iter().filter_map(|r| r["name"].as_str()).collect();
        assert_eq!(names, vec!["d1", "d2", "t1"]);
    }

    #[tokio::test]
    async fn no_matching_type_still_returns_top_results() {
        let hits = vec![record("commit", "c1"), record("commit", "c2")];
        let retriever = retriever(hits);
        let records = retriever
            .retrieve("risk outlook", QueryIntent::RiskAssessment)
            .await
            .expect("retrieve");
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn unknown_intent_keeps_all_raw_hits() {
        let hits = (0..5).map(|i| record("stat", &format!("r{i}"))).collect();
        let retriever = retriever(hits);
        let records = retriever
            .retrieve("anything general", QueryIntent::Unknown)
            .await
            .expect("retrieve");
        assert_eq!(records.len(), 5);
    }

    #[tokio::test]
    async fn requests_raw_hits_from_search() {
        let search = Arc::new(FixedSearch {
            hits: Vec::new(),
            seen_k: Mutex::new(Vec::new()),
        });
        let retriever = ContextRetriever::new(search.clone(), &config());
        retriever
            .retrieve("anything at all", QueryIntent::Unknown)
            .await
            .expect("retrieve");
        assert_eq!(*search.seen_k.lock().expect("lock"), vec![5]);
    }

    #[tokio::test]
    async fn search_failure_propagates_and_data_ready_stays_false() {
        let retriever = ContextRetriever::new(Arc::new(FailingSearch), &config());
        let err = retriever
            .retrieve("broken query", QueryIntent::Unknown)
            .await
            .unwrap_err();
        assert!(matches!(err, PulseError::Retrieval(_)));
        assert!(!retriever.has_retrieved());
    }

    #[tokio::test]
    async fn data_ready_latches_after_first_success() {
        let retriever = retriever(vec![record("stat", "r0")]);
        assert!(!retriever.has_retrieved());
        retriever
            .retrieve("anything here", QueryIntent::Unknown)
            .await
            .expect("retrieve");
        assert!(retriever.has_retrieved());
    }
}
