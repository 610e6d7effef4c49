use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use store::{SimilaritySearch, StoredChunk, Weight};

use crate::aggregate::{AggregationStrategy, EliminatedCandidate, ScoreBoard};
use crate::score::weighted_contribution;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOneConfig {
    /// Candidate chunks retrieved per job-description chunk.
    pub top_k_per_chunk: usize,
    pub strategy: AggregationStrategy,
}

impl Default for StageOneConfig {
    fn default() -> Self {
        Self {
            top_k_per_chunk: 15,
            strategy: AggregationStrategy::default(),
        }
    }
}

/// Outcome of the pre-filter: who goes on to pairwise evaluation, who
/// was dropped and with what numbers, and whether the stage ran at all.
#[derive(Debug)]
pub struct StageOneOutcome {
    pub selected: Vec<String>,
    pub eliminated: Vec<EliminatedCandidate>,
    pub bypassed: bool,
}

impl StageOneOutcome {
    pub fn bypass(pool: &[String]) -> Self {
        Self {
            selected: pool.to_vec(),
            eliminated: Vec::new(),
            bypassed: true,
        }
    }
}

/// Run the similarity pre-filter: one pool-restricted top-K search per
/// job-description chunk, contributions folded into a [`ScoreBoard`],
/// top `top_n` promoted to stage two.
///
/// Degrades instead of failing: chunks without usable text or
/// embeddings are skipped, and a search error on one chunk only costs
/// that chunk's signal. A job description yielding no searchable chunks
/// at all falls back to selecting everyone, same as the gate bypass.
pub async fn select_candidates<S: SimilaritySearch + ?Sized>(
    search: &S,
    jd_id: &str,
    jd_chunks: &[StoredChunk],
    pool: &[String],
    top_n: usize,
    config: &StageOneConfig,
) -> Result<StageOneOutcome> {
    let mut board = ScoreBoard::new(pool);
    let mut searched_chunks = 0usize;

    for (index, chunk) in jd_chunks.iter().enumerate() {
        let weight = chunk.weight.unwrap_or(Weight::General);

        if chunk.enriched_text.trim().is_empty() && chunk.text.trim().is_empty() {
            warn!(jd_id, chunk = index, "Job-description chunk is blank, skipping search");
            continue;
        }
        if chunk.embedding.is_empty() {
            warn!(jd_id, chunk = index, "Job-description chunk has no embedding, skipping search");
            continue;
        }

        let matches = match search
            .search_candidates(&chunk.embedding, config.top_k_per_chunk, pool)
            .await
        {
            Ok(matches) => matches,
            Err(e) => {
                warn!(
                    jd_id,
                    chunk = index,
                    error = %e,
                    "Similarity search failed for chunk, continuing without its signal"
                );
                continue;
            }
        };
        searched_chunks += 1;

        debug!(
            jd_id,
            chunk = index,
            weight = weight.factor(),
            matches = matches.len(),
            "Processed job-description chunk"
        );

        for m in &matches {
            let contribution = weighted_contribution(m.similarity, weight);
            debug!(
                jd_id,
                chunk = index,
                candidate = %m.doc_id,
                similarity = m.similarity,
                contribution,
                "Recorded match"
            );
            board.record(&m.doc_id, contribution);
        }
    }

    if searched_chunks == 0 {
        warn!(
            jd_id,
            "No job-description chunk produced a similarity signal; selecting all candidates"
        );
        return Ok(StageOneOutcome::bypass(pool));
    }

    for id in pool {
        if let Some(aggregate) = board.aggregate(id) {
            debug!(
                jd_id,
                candidate = %id,
                max_contribution = aggregate.max_contribution,
                total_contribution = aggregate.total_contribution,
                match_count = aggregate.match_count,
                "Stage-one aggregate"
            );
        }
    }

    let (selected, eliminated) = board.select_top(top_n, config.strategy);
    info!(
        jd_id,
        selected = selected.len(),
        eliminated = eliminated.len(),
        strategy = ?config.strategy,
        "Stage one selected candidates"
    );

    Ok(StageOneOutcome {
        selected,
        eliminated,
        bypassed: false,
    })
}
