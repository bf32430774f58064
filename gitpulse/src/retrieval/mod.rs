mod http;
mod retriever;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::RetrievedRecord;

pub use http::HttpVectorSearch;
pub use retriever::ContextRetriever;

/// Similarity-search capability over the telemetry index. The index build
/// pipeline lives elsewhere; this crate only consumes search results.
#[async_trait]
pub trait VectorSearch: Send + Sync {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedRecord>>;

    /// Whether the underlying index is reachable/configured.
    fn is_ready(&self) -> bool;
}
