use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// How stage one turns per-candidate contribution streams into a
/// ranking key. `MaxContribution` is the documented default: a
/// candidate's single best weighted match decides, so one outstanding
/// hit on an essential requirement beats breadth of mediocre matches.
/// `TotalScore` keeps the summed alternative available for callers who
/// want breadth to count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationStrategy {
    #[default]
    MaxContribution,
    TotalScore,
}

/// Running totals for one candidate during stage one. Discarded once
/// stage two starts; only diagnostics survive.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CandidateAggregate {
    pub total_contribution: f32,
    pub max_contribution: f32,
    pub match_count: usize,
}

/// A candidate dropped by stage one, with the numbers that dropped it.
#[derive(Debug, Clone, Serialize)]
pub struct EliminatedCandidate {
    pub candidate_id: String,
    pub aggregate: CandidateAggregate,
}

/// Accumulates weighted contributions per candidate across all
/// job-description chunks of one ranking request.
pub struct ScoreBoard {
    aggregates: HashMap<String, CandidateAggregate>,
}

impl ScoreBoard {
    /// Every pool member starts with a zero aggregate so candidates with
    /// no matches at all still show up (and get eliminated explicitly).
    pub fn new(pool: &[String]) -> Self {
        Self {
            aggregates: pool
                .iter()
                .map(|id| (id.clone(), CandidateAggregate::default()))
                .collect(),
        }
    }

    /// Record one weighted contribution. Matches for documents outside
    /// the pool are ignored; the search filter should already exclude
    /// them, this is the local guarantee.
    pub fn record(&mut self, candidate_id: &str, contribution: f32) {
        let Some(aggregate) = self.aggregates.get_mut(candidate_id) else {
            return;
        };
        aggregate.total_contribution += contribution;
        aggregate.match_count += 1;
        if contribution > aggregate.max_contribution {
            aggregate.max_contribution = contribution;
        }
    }

    pub fn aggregate(&self, candidate_id: &str) -> Option<&CandidateAggregate> {
        self.aggregates.get(candidate_id)
    }

    /// Rank by the configured strategy and split the pool into the
    /// selected top `n` and the eliminated rest. Ties break by
    /// candidate id ascending so selection is deterministic.
    pub fn select_top(
        self,
        n: usize,
        strategy: AggregationStrategy,
    ) -> (Vec<String>, Vec<EliminatedCandidate>) {
        let key = |aggregate: &CandidateAggregate| match strategy {
            AggregationStrategy::MaxContribution => aggregate.max_contribution,
            AggregationStrategy::TotalScore => aggregate.total_contribution,
        };

        let mut ranked: Vec<(String, CandidateAggregate)> = self.aggregates.into_iter().collect();
        ranked.sort_by(|(id_a, agg_a), (id_b, agg_b)| {
            key(agg_b).total_cmp(&key(agg_a)).then_with(|| id_a.cmp(id_b))
        });

        let eliminated = ranked
            .split_off(n.min(ranked.len()))
            .into_iter()
            .map(|(candidate_id, aggregate)| EliminatedCandidate {
                candidate_id,
                aggregate,
            })
            .collect();
        let selected = ranked.into_iter().map(|(id, _)| id).collect();
        (selected, eliminated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn max_policy_prefers_one_shiny_match_over_many_mediocre() {
        // CV A: one 0.9 hit on a weight-3 requirement plus noise.
        // CV B: 0.6 hits on four weight-1 requirements, higher sum.
        let mut board = ScoreBoard::new(&pool(&["cv-a", "cv-b"]));
        board.record("cv-a", 2.43);
        board.record("cv-a", 0.1);
        board.record("cv-a", 0.1);
        board.record("cv-a", 0.1);
        for _ in 0..4 {
            board.record("cv-b", 0.36);
        }

        let (selected, eliminated) =
            board.select_top(1, AggregationStrategy::MaxContribution);
        assert_eq!(selected, vec!["cv-a"]);
        assert_eq!(eliminated.len(), 1);
        assert_eq!(eliminated[0].candidate_id, "cv-b");
    }

    #[test]
    fn total_policy_is_the_configurable_alternative() {
        let mut board = ScoreBoard::new(&pool(&["cv-a", "cv-b"]));
        board.record("cv-a", 2.43);
        for _ in 0..4 {
            board.record("cv-b", 0.7);
        }

        let (selected, _) = board.select_top(1, AggregationStrategy::TotalScore);
        assert_eq!(selected, vec!["cv-b"]);
    }

    #[test]
    fn unmatched_candidates_are_eliminated_not_lost() {
        let mut board = ScoreBoard::new(&pool(&["cv-a", "cv-b", "cv-c"]));
        board.record("cv-a", 1.0);

        let (selected, eliminated) =
            board.select_top(1, AggregationStrategy::MaxContribution);
        assert_eq!(selected, vec!["cv-a"]);
        let mut dropped: Vec<_> = eliminated.iter().map(|e| e.candidate_id.as_str()).collect();
        dropped.sort();
        assert_eq!(dropped, vec!["cv-b", "cv-c"]);
    }

    #[test]
    fn matches_outside_the_pool_are_ignored() {
        let mut board = ScoreBoard::new(&pool(&["cv-a"]));
        board.record("cv-stranger", 9.0);
        assert!(board.aggregate("cv-stranger").is_none());
        assert_eq!(board.aggregate("cv-a").unwrap().match_count, 0);
    }

    #[test]
    fn ties_break_by_candidate_id() {
        let mut board = ScoreBoard::new(&pool(&["cv-z", "cv-a"]));
        board.record("cv-z", 1.0);
        board.record("cv-a", 1.0);

        let (selected, _) = board.select_top(1, AggregationStrategy::MaxContribution);
        assert_eq!(selected, vec!["cv-a"]);
    }

    #[test]
    fn aggregate_tracks_sum_max_and_count() {
        let mut board = ScoreBoard::new(&pool(&["cv-a"]));
        board.record("cv-a", 0.5);
        board.record("cv-a", 1.5);
        board.record("cv-a", 0.25);

        let aggregate = board.aggregate("cv-a").unwrap();
        assert!((aggregate.total_contribution - 2.25).abs() < 1e-6);
        assert_eq!(aggregate.max_contribution, 1.5);
        assert_eq!(aggregate.match_count, 3);
    }
}
