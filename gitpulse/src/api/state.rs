use std::sync::Arc;

use crate::config::Config;
use crate::llm::LlmProvider;
use crate::retrieval::VectorSearch;
use crate::services::AnalyticsService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub llm: LlmProvider,
    pub analytics: AnalyticsService,
}

impl AppState {
    pub fn new(config: Config, search: Arc<dyn VectorSearch>, llm: LlmProvider) -> Self {
        let config = Arc::new(config);
        let analytics = AnalyticsService::new(Arc::new(llm.clone()), search, &config);

        Self {
            config,
            llm,
            analytics,
        }
    }
}
