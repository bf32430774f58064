use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

/// Telemetry metric names recognized by the analysis prompts and exposed on
/// `GET /metrics` for client-side validation.
pub const AVAILABLE_METRICS: &[&str] = &[
    "commits",
    "prs",
    "issues",
    "merge_time",
    "review_comments",
    "code_coverage",
    "test_failures",
    "dependencies",
];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub vector: VectorConfig,
    pub generation: GenerationConfig,
    pub memory: MemoryConfig,
    pub llm: Option<LlmConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

/// Connection settings for the external vector-search service that serves
/// similarity hits over the telemetry index.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// Raw similarity hits requested per query.
    pub raw_hits: usize,
    /// Records kept after intent filtering.
    pub max_records: usize,
}

/// Fixed decoding configuration for answer generation. Constant across the
/// attempts of a single request.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Most-recent conversation turns retained per session.
    pub context_window: usize,
}

/// LLM configuration for chat/completion models
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("GITPULSE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("GITPULSE_PORT", 3000),
                allowed_origins: env::var("ALLOWED_ORIGINS")
                    .map(|origins| origins.split(',').map(|s| s.trim().to_string()).collect())
                    .unwrap_or_default(),
            },
            vector: VectorConfig {
                base_url: env::var("VECTOR_SERVICE_URL")
                    .unwrap_or_else(|_| "http://localhost:8100".to_string()),
                api_key: env::var("VECTOR_SERVICE_API_KEY").ok(),
                timeout_secs: parse_env_or("VECTOR_TIMEOUT", 10),
                max_retries: parse_env_or("VECTOR_MAX_RETRIES", 2),
                raw_hits: parse_env_or("VECTOR_RAW_HITS", 5),
                max_records: parse_env_or("VECTOR_MAX_RECORDS", 3),
            },
            generation: GenerationConfig {
                temperature: parse_env_or("GENERATION_TEMPERATURE", 0.7),
                top_p: parse_env_or("GENERATION_TOP_P", 0.9),
                max_tokens: parse_env_or("GENERATION_MAX_TOKENS", 4000),
                max_attempts: parse_env_or("GENERATION_MAX_ATTEMPTS", 3),
            },
            memory: MemoryConfig {
                context_window: parse_env_or("CONTEXT_WINDOW", 3),
            },
            llm: env::var("LLM_MODEL").ok().map(|model| LlmConfig {
                model,
                api_key: env::var("LLM_API_KEY").ok(),
                base_url: env::var("LLM_BASE_URL").ok(),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 30),
                max_retries: parse_env_or("LLM_MAX_RETRIES", 3),
            }),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known LLM providers that use OpenAI-compatible APIs
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

/// Parse a model name into (provider, model) tuple.
///
/// `"openrouter/meta-llama/llama-3-8b"` yields `("openrouter",
/// "meta-llama/llama-3-8b")`; a bare model name defaults to `("openai", name)`.
pub fn parse_llm_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_LLM_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    ("openai", model)
}
