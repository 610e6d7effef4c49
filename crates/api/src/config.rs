use serde::{Deserialize, Serialize};
use tracing::warn;

use rank::RankConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub qdrant_url: String,
    pub jd_collection: String,
    pub cv_collection: String,
    pub ollama_url: String,
    pub model: String,
    pub rank: RankConfig,
    pub retry: RetryConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_entries: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            qdrant_url: "http://localhost:6333".to_string(),
            jd_collection: "jd_chunks".to_string(),
            cv_collection: "cv_chunks".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
            rank: RankConfig::default(),
            retry: RetryConfig {
                max_retries: 3,
                initial_backoff_ms: 1000,
                max_backoff_ms: 10000,
            },
            cache: CacheConfig {
                enabled: true,
                max_entries: 10000,
            },
        }
    }
}

impl AppConfig {
    /// Defaults overridden by environment variables where set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("QDRANT_URL") {
            config.qdrant_url = url;
        }
        if let Ok(url) = std::env::var("OLLAMA_URL") {
            config.ollama_url = url;
        }
        if let Ok(model) = std::env::var("RANK_MODEL") {
            config.model = model;
        }
        if let Some(n) = env_usize("RANK_MAX_CONCURRENT_EVALUATIONS") {
            config.rank.orchestrator.max_concurrent_evaluations = n;
        }
        if let Some(n) = env_usize("RANK_EVALUATION_TIMEOUT_SECS") {
            config.rank.orchestrator.evaluation_timeout_secs = n as u64;
        }
        if let Some(n) = env_usize("RANK_TOP_K_PER_CHUNK") {
            config.rank.stage_one.top_k_per_chunk = n;
        }
        config
    }
}

fn env_usize(key: &str) -> Option<usize> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = raw, "Ignoring unparseable environment override");
            None
        }
    }
}
