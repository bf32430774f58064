//! The query orchestrator: session resolution, classification, retrieval,
//! prompt composition, the retry loop, and the session commit.

use std::sync::Arc;

use uuid::Uuid;

use crate::config::Config;
use crate::error::{PulseError, Result};
use crate::llm::{GenerationOptions, TextGenerator};
use crate::models::{AnalyticsQuery, ConversationTurn, FormattedResult, QueryIntent};
use crate::pipeline::{composer, QueryClassifier, RetryController};
use crate::retrieval::{ContextRetriever, VectorSearch};
use crate::session::ConversationStore;

/// The answer to one analytics query, plus the session it belongs to.
#[derive(Debug, Clone)]
pub struct AnalyticsOutcome {
    pub session_id: String,
    pub result: FormattedResult,
    pub history: Vec<ConversationTurn>,
}

/// Holds every pipeline collaborator explicitly; all of them are
/// constructor-supplied so tests can substitute doubles.
#[derive(Clone)]
pub struct AnalyticsService {
    classifier: QueryClassifier,
    retriever: ContextRetriever,
    retry: RetryController,
    store: ConversationStore,
}

impl AnalyticsService {
    pub fn new(
        llm: Arc<dyn TextGenerator>,
        search: Arc<dyn VectorSearch>,
        config: &Config,
    ) -> Self {
        let options = GenerationOptions::from(&config.generation);
        Self {
            classifier: QueryClassifier::new(llm.clone(), options),
            retriever: ContextRetriever::new(search, &config.vector),
            retry: RetryController::new(llm, options, config.generation.max_attempts),
            store: ConversationStore::new(config.memory.context_window),
        }
    }

    /// Answer a query. The session is only updated after a successful
    /// exchange, so a failed request leaves the history untouched.
    pub async fn answer(&self, query: AnalyticsQuery) -> Result<AnalyticsOutcome> {
        if query.prompt.split_whitespace().count() < 2 {
            return Err(PulseError::Validation(
                "Query must contain at least 2 words".to_string(),
            ));
        }

        let session_id = query
            .session_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        // Prior turns only; the current query is not yet part of the history.
        let prior = self.store.history(&session_id).await;

        let intent = match query.intent {
            QueryIntent::Unknown => self.classifier.classify(&query.prompt).await,
            explicit => explicit,
        };
        tracing::debug!(session_id = %session_id, intent = intent.as_token(), "Query classified");

        let records = self.retriever.retrieve(&query.prompt, intent).await?;
        let prompt = composer::compose_prompt(&query.prompt, intent, &records, &prior);

        let result = self.retry.run(prompt, &query.prompt).await?;

        let history = self
            .store
            .append_exchange(
                &session_id,
                ConversationTurn::user(&query.prompt),
                ConversationTurn::assistant(result.body.as_history_text()),
            )
            .await;

        Ok(AnalyticsOutcome {
            session_id,
            result,
            history,
        })
    }

    /// True once at least one retrieval has completed successfully.
    pub fn data_ready(&self) -> bool {
        self.retriever.has_retrieved()
    }

    /// Whether the vector index behind the retriever is reachable.
    pub fn vector_ready(&self) -> bool {
        self.retriever.is_ready()
    }
}
