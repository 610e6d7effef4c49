pub mod aggregate;
pub mod error;
pub mod orchestrator;
pub mod score;
pub mod stage_one;

pub use aggregate::{AggregationStrategy, CandidateAggregate, EliminatedCandidate, ScoreBoard};
pub use error::RankError;
pub use orchestrator::{
    EvaluationOutcome, OrchestratorConfig, PairwiseEvaluator, RankedCandidate,
};
pub use score::weighted_contribution;
pub use stage_one::{StageOneConfig, StageOneOutcome};

use serde::{Deserialize, Serialize};
use tracing::info;

use store::{ChunkStore, SimilaritySearch};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankConfig {
    pub stage_one: StageOneConfig,
    pub orchestrator: OrchestratorConfig,
}

/// Final result of one ranking request. `rankings` holds every
/// candidate that reached pairwise evaluation, scored or explicitly
/// failed; `eliminated_stage_one` accounts for the rest, so every
/// submitted candidate id appears exactly once across the two lists.
#[derive(Debug, Serialize)]
pub struct Ranking {
    pub rankings: Vec<RankedCandidate>,
    pub eliminated_stage_one: Vec<EliminatedCandidate>,
    pub stage_one_bypassed: bool,
}

/// The two-stage ranking engine: a weighted similarity pre-filter that
/// shrinks the candidate pool, then concurrent pairwise evaluations
/// whose scores alone decide the final order. All collaborators are
/// injected; the engine holds no global state and never writes.
pub struct Ranker<C, S, E> {
    store: C,
    search: S,
    evaluator: E,
    config: RankConfig,
}

impl<C, S, E> Ranker<C, S, E>
where
    C: ChunkStore,
    S: SimilaritySearch,
    E: PairwiseEvaluator,
{
    pub fn new(store: C, search: S, evaluator: E, config: RankConfig) -> Self {
        Self {
            store,
            search,
            evaluator,
            config,
        }
    }

    /// Rank `candidate_ids` against the job description. `top_n` of
    /// `None` ranks everyone. The stage-one similarity numbers are
    /// diagnostics only; the returned order is the evaluation score's.
    pub async fn rank(
        &self,
        jd_id: &str,
        candidate_ids: &[String],
        top_n: Option<usize>,
    ) -> Result<Ranking, RankError> {
        if candidate_ids.is_empty() {
            return Err(RankError::EmptyCandidateSet);
        }
        if top_n == Some(0) {
            return Err(RankError::InvalidTopN);
        }

        // Duplicate ids would evaluate twice and break the
        // exactly-once output guarantee.
        let mut pool: Vec<String> = candidate_ids.to_vec();
        pool.sort();
        pool.dedup();

        let jd_chunks = self
            .store
            .job_chunks(jd_id)
            .await
            .map_err(|_| RankError::UnknownJobDescription(jd_id.to_string()))?;

        let total = pool.len();
        let effective_top_n = top_n.unwrap_or(total);

        // Stage one exists only to shrink the pool before the expensive
        // evaluations; with nothing to shrink it is skipped outright.
        let outcome = if effective_top_n >= total {
            info!(
                jd_id,
                candidates = total,
                top_n = effective_top_n,
                "Ranking all candidates, similarity pre-filter skipped"
            );
            StageOneOutcome::bypass(&pool)
        } else {
            info!(
                jd_id,
                candidates = total,
                top_n = effective_top_n,
                "Running similarity pre-filter"
            );
            stage_one::select_candidates(
                &self.search,
                jd_id,
                &jd_chunks,
                &pool,
                effective_top_n,
                &self.config.stage_one,
            )
            .await?
        };

        let jd_text = self.store.job_text(jd_id).await?;

        let rankings = orchestrator::evaluate_candidates(
            &self.store,
            &self.evaluator,
            &jd_text,
            &outcome.selected,
            &self.config.orchestrator,
        )
        .await;

        let scored = rankings.iter().filter(|r| r.score().is_some()).count();
        if scored == 0 {
            let first_reason = rankings
                .iter()
                .find_map(|r| match &r.outcome {
                    EvaluationOutcome::Failed { reason } => Some(reason.clone()),
                    EvaluationOutcome::Scored(_) => None,
                })
                .unwrap_or_else(|| "no candidates were evaluated".to_string());
            return Err(RankError::NoScoredCandidates(first_reason));
        }

        info!(
            jd_id,
            ranked = rankings.len(),
            scored,
            eliminated = outcome.eliminated.len(),
            "Ranking complete"
        );

        Ok(Ranking {
            rankings,
            eliminated_stage_one: outcome.eliminated,
            stage_one_bypassed: outcome.bypassed,
        })
    }
}
