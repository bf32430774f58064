use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{parse_llm_provider_model, GenerationConfig, LlmConfig};
use crate::error::{PulseError, Result};
use crate::llm::api::LlmApiClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmBackend {
    OpenAI,
    OpenRouter,
    Ollama,
    LmStudio,
    OpenAICompatible { base_url: String },
    Unavailable { reason: String },
}

/// Decoding configuration for one generation call. Fixed per request; the
/// retry loop never varies it across attempts.
#[derive(Debug, Clone, Copy)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl From<&GenerationConfig> for GenerationOptions {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens,
        }
    }
}

/// The "generate text from prompt" capability consumed by the classifier and
/// the retry controller. Implemented by [`LlmProvider`] in production and by
/// test doubles in unit tests.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct LlmProvider {
    backend: LlmBackend,
    config: Option<Arc<LlmConfig>>,
}

impl LlmProvider {
    pub fn new(config: Option<&LlmConfig>) -> Self {
        let Some(config) = config else {
            return Self::unavailable("No LLM configuration provided");
        };

        let (provider, _model) = parse_llm_provider_model(&config.model);

        let backend = match provider.to_lowercase().as_str() {
            "openai" => LlmBackend::OpenAI,
            "openrouter" => LlmBackend::OpenRouter,
            "ollama" => LlmBackend::Ollama,
            "lmstudio" => LlmBackend::LmStudio,
            _ => {
                if let Some(base_url) = &config.base_url {
                    LlmBackend::OpenAICompatible {
                        base_url: base_url.clone(),
                    }
                } else {
                    LlmBackend::Unavailable {
                        reason: format!("Unknown provider in model: {}", config.model),
                    }
                }
            }
        };

        Self {
            backend,
            config: Some(Arc::new(config.clone())),
        }
    }

    pub fn unavailable(reason: &str) -> Self {
        Self {
            backend: LlmBackend::Unavailable {
                reason: reason.to_string(),
            },
            config: None,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self.backend, LlmBackend::Unavailable { .. })
    }

    pub fn backend(&self) -> &LlmBackend {
        &self.backend
    }

    pub fn config(&self) -> Option<&LlmConfig> {
        self.config.as_deref()
    }

    /// Model identifier for the health surface.
    pub fn model_name(&self) -> Option<String> {
        self.config.as_ref().map(|c| c.model.clone())
    }

    fn unavailable_reason(&self) -> String {
        match &self.backend {
            LlmBackend::Unavailable { reason } => reason.clone(),
            _ => "LLM generation is not available".to_string(),
        }
    }
}

#[async_trait]
impl TextGenerator for LlmProvider {
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        if !self.is_available() {
            return Err(PulseError::LlmUnavailable(self.unavailable_reason()));
        }

        let config = self
            .config()
            .ok_or_else(|| PulseError::LlmUnavailable("No config available".to_string()))?;

        let client = LlmApiClient::new(config)?;
        client.generate(prompt, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm_config(model: &str) -> LlmConfig {
        LlmConfig {
            model: model.to_string(),
            api_key: None,
            base_url: None,
            timeout_secs: 30,
            max_retries: 0,
        }
    }

    #[test]
    fn missing_config_is_unavailable() {
        let provider = LlmProvider::new(None);
        assert!(!provider.is_available());
        assert!(provider.model_name().is_none());
    }

    #[test]
    fn provider_prefix_selects_backend() {
        let provider = LlmProvider::new(Some(&llm_config("ollama/llama3")));
        assert_eq!(*provider.backend(), LlmBackend::Ollama);
        assert!(provider.is_available());
    }

    #[test]
    fn bare_model_defaults_to_openai_backend() {
        let provider = LlmProvider::new(Some(&llm_config("gpt-4o-mini")));
        assert_eq!(*provider.backend(), LlmBackend::OpenAI);
    }

    #[tokio::test]
    async fn unavailable_provider_fails_generation() {
        let provider = LlmProvider::unavailable("not configured");
        let options = GenerationOptions {
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 100,
        };
        let err = provider.generate("hello world", &options).await.unwrap_err();
        assert!(matches!(err, PulseError::LlmUnavailable(_)));
    }
}
