use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde::{Deserialize, Serialize};

use crate::config::VectorConfig;
use crate::error::{PulseError, Result};
use crate::models::RetrievedRecord;
use crate::retrieval::VectorSearch;

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    k: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<RetrievedRecord>,
}

/// Vector-search client talking JSON to an external index service.
#[derive(Clone)]
pub struct HttpVectorSearch {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    max_retries: u32,
}

impl HttpVectorSearch {
    pub fn new(config: &VectorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PulseError::Retrieval(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            max_retries: config.max_retries,
        })
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(ref api_key) = self.api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {api_key}"))
                    .map_err(|e| PulseError::Retrieval(format!("Invalid API key header: {e}")))?,
            );
        }

        Ok(headers)
    }
}

#[async_trait]
impl VectorSearch for HttpVectorSearch {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<RetrievedRecord>> {
        let request = SearchRequest { query, k };
        let headers = self.headers()?;
        let url = format!("{}/search", self.base_url);

        let mut last_error = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(100 * 2_u64.pow(attempt - 1));
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .headers(headers.clone())
                .json(&request)
                .send()
                .await;

            match response {
                Ok(resp) => {
                    let status = resp.status();

                    if status.is_success() {
                        let body: SearchResponse = resp.json().await.map_err(|e| {
                            PulseError::Retrieval(format!("Invalid search response: {e}"))
                        })?;
                        return Ok(body.results);
                    }

                    let message = resp.text().await.unwrap_or_default();
                    let error =
                        PulseError::Retrieval(format!("Vector search failed ({status}): {message}"));

                    if status.is_server_error() && attempt < self.max_retries {
                        last_error = Some(error);
                        continue;
                    }

                    return Err(error);
                }
                Err(e) => {
                    let error = PulseError::Retrieval(format!("Vector search request failed: {e}"));
                    if attempt < self.max_retries {
                        last_error = Some(error);
                        continue;
                    }
                    return Err(error);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| PulseError::Retrieval("Vector search failed after retries".into())))
    }

    fn is_ready(&self) -> bool {
        !self.base_url.is_empty()
    }
}
