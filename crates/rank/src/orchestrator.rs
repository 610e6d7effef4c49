use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{info, warn};

use evaluate::CandidateEvaluation;
use store::ChunkStore;

/// The pairwise-evaluation capability the orchestrator fans out over.
/// [`evaluate::Evaluator`] is the production implementation; tests
/// inject scripted ones.
#[async_trait]
pub trait PairwiseEvaluator: Send + Sync {
    async fn compare(
        &self,
        jd_text: &str,
        cv_text: &str,
        candidate_id: &str,
    ) -> Result<CandidateEvaluation>;
}

#[async_trait]
impl PairwiseEvaluator for evaluate::Evaluator {
    async fn compare(
        &self,
        jd_text: &str,
        cv_text: &str,
        candidate_id: &str,
    ) -> Result<CandidateEvaluation> {
        evaluate::Evaluator::compare(self, jd_text, cv_text, candidate_id).await
    }
}

#[async_trait]
impl<T: PairwiseEvaluator + ?Sized> PairwiseEvaluator for std::sync::Arc<T> {
    async fn compare(
        &self,
        jd_text: &str,
        cv_text: &str,
        candidate_id: &str,
    ) -> Result<CandidateEvaluation> {
        (**self).compare(jd_text, cv_text, candidate_id).await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Concurrent evaluation calls in flight at once. The pool of
    /// selected candidates can be large; the collaborator should not
    /// see all of it at the same time.
    pub max_concurrent_evaluations: usize,
    /// Ceiling per call. The collaborator may retry internally and take
    /// variable time, so this is deliberately generous.
    pub evaluation_timeout_secs: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_evaluations: 4,
            evaluation_timeout_secs: 120,
        }
    }
}

/// Per-candidate result of stage two. A failed evaluation keeps its
/// candidate visible with the reason; it is never silently dropped.
#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    pub candidate_id: String,
    #[serde(flatten)]
    pub outcome: EvaluationOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EvaluationOutcome {
    Scored(CandidateEvaluation),
    Failed { reason: String },
}

impl RankedCandidate {
    pub fn score(&self) -> Option<f32> {
        match &self.outcome {
            EvaluationOutcome::Scored(evaluation) => Some(evaluation.score),
            EvaluationOutcome::Failed { .. } => None,
        }
    }
}

/// Fan out one evaluation per selected candidate and wait for all of
/// them to settle. Concurrency is cooperative within this task: calls
/// are issued without waiting on each other, capped by a semaphore, and
/// dropping the returned future cancels every call still in flight.
/// One candidate's failure (transport, timeout, unparseable response,
/// missing document text) is recorded as that candidate's outcome and
/// never aborts the batch.
pub async fn evaluate_candidates<C, E>(
    store: &C,
    evaluator: &E,
    jd_text: &str,
    selected: &[String],
    config: &OrchestratorConfig,
) -> Vec<RankedCandidate>
where
    C: ChunkStore + ?Sized,
    E: PairwiseEvaluator + ?Sized,
{
    let semaphore = Semaphore::new(config.max_concurrent_evaluations.max(1));
    let ceiling = Duration::from_secs(config.evaluation_timeout_secs);

    let calls = selected.iter().map(|candidate_id| {
        let semaphore = &semaphore;
        async move {
            let _permit = semaphore
                .acquire()
                .await
                .expect("evaluation semaphore closed");

            let outcome = evaluate_one(store, evaluator, jd_text, candidate_id, ceiling).await;
            RankedCandidate {
                candidate_id: candidate_id.clone(),
                outcome,
            }
        }
    });

    let mut results = join_all(calls).await;

    let failed = results
        .iter()
        .filter(|r| matches!(r.outcome, EvaluationOutcome::Failed { .. }))
        .count();
    info!(
        candidates = results.len(),
        failed, "All evaluation calls settled"
    );

    sort_ranking(&mut results);
    results
}

async fn evaluate_one<C, E>(
    store: &C,
    evaluator: &E,
    jd_text: &str,
    candidate_id: &str,
    ceiling: Duration,
) -> EvaluationOutcome
where
    C: ChunkStore + ?Sized,
    E: PairwiseEvaluator + ?Sized,
{
    let cv_text = match store.candidate_text(candidate_id).await {
        Ok(text) => text,
        Err(e) => {
            warn!(candidate_id, error = %e, "Could not reconstruct candidate text");
            return EvaluationOutcome::Failed {
                reason: format!("could not reconstruct candidate text: {e}"),
            };
        }
    };

    match timeout(ceiling, evaluator.compare(jd_text, &cv_text, candidate_id)).await {
        Ok(Ok(evaluation)) => EvaluationOutcome::Scored(evaluation),
        Ok(Err(e)) => {
            warn!(candidate_id, error = %e, "Evaluation failed");
            EvaluationOutcome::Failed {
                reason: format!("evaluation failed: {e}"),
            }
        }
        Err(_) => {
            warn!(candidate_id, timeout_secs = ceiling.as_secs(), "Evaluation timed out");
            EvaluationOutcome::Failed {
                reason: format!("evaluation timed out after {}s", ceiling.as_secs()),
            }
        }
    }
}

/// Deterministic final order regardless of completion order: scored
/// candidates by score descending, ties by id ascending; failed
/// candidates after all scored ones, by id ascending.
pub fn sort_ranking(results: &mut [RankedCandidate]) {
    results.sort_by(|a, b| match (a.score(), b.score()) {
        (Some(sa), Some(sb)) => sb
            .total_cmp(&sa)
            .then_with(|| a.candidate_id.cmp(&b.candidate_id)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.candidate_id.cmp(&b.candidate_id),
    });
}
