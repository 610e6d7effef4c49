pub mod cache;
pub mod client;
pub mod prompt;
pub mod retry;
pub mod schema;

pub use cache::ComparisonCache;
pub use client::OllamaClient;
pub use retry::RetryPolicy;
pub use schema::CandidateEvaluation;

use anyhow::{Context, Result};
use tracing::{debug, info};

const JSON_RETRIES: usize = 3;

/// Client for the pairwise-evaluation collaborator: takes two full
/// document texts and returns one validated [`CandidateEvaluation`].
/// The judgment itself is the model's; this side owns prompt shape,
/// transport retries and response validation.
pub struct Evaluator {
    llm: OllamaClient,
    retry: RetryPolicy,
    cache: Option<ComparisonCache>,
}

impl Evaluator {
    pub fn new(llm: OllamaClient, retry: RetryPolicy) -> Self {
        Self {
            llm,
            retry,
            cache: None,
        }
    }

    pub fn with_cache(mut self, max_entries: usize) -> Self {
        self.cache = Some(ComparisonCache::new(max_entries));
        self
    }

    pub fn client(&self) -> &OllamaClient {
        &self.llm
    }

    pub async fn compare(
        &self,
        jd_text: &str,
        cv_text: &str,
        candidate_id: &str,
    ) -> Result<CandidateEvaluation> {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(jd_text, cv_text) {
                debug!(candidate_id, "Comparison served from cache");
                return Ok(CandidateEvaluation {
                    candidate_id: candidate_id.to_string(),
                    ..hit
                });
            }
        }

        let prompt = prompt::build_comparison_prompt(jd_text, cv_text, candidate_id);

        info!(candidate_id, "Requesting pairwise comparison");
        let response = self
            .retry
            .retry("pairwise_comparison", || {
                self.llm.generate_json_with_retry(&prompt, JSON_RETRIES)
            })
            .await
            .context("Pairwise comparison call failed")?;

        let evaluation = schema::parse_comparison(&response, candidate_id)?;

        if let Some(cache) = &self.cache {
            cache.set(jd_text, cv_text, evaluation.clone());
        }

        Ok(evaluation)
    }
}
