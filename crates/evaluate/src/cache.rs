use dashmap::DashMap;
use sha2::{Digest, Sha256};

use crate::schema::CandidateEvaluation;

/// Cache of validated comparisons keyed by the content of both
/// documents. Chunks are immutable once written, so a (jd, cv) pair
/// always evaluates the same inputs and a hit is always safe to reuse.
pub struct ComparisonCache {
    entries: DashMap<String, CandidateEvaluation>,
    max_entries: usize,
}

impl ComparisonCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries,
        }
    }

    pub fn get(&self, jd_text: &str, cv_text: &str) -> Option<CandidateEvaluation> {
        let key = Self::key(jd_text, cv_text);
        self.entries.get(&key).map(|r| r.value().clone())
    }

    pub fn set(&self, jd_text: &str, cv_text: &str, evaluation: CandidateEvaluation) {
        if self.entries.len() >= self.max_entries {
            // Simple eviction: drop 25% when full
            let to_remove: Vec<_> = self
                .entries
                .iter()
                .take(self.max_entries / 4)
                .map(|r| r.key().clone())
                .collect();
            for key in to_remove {
                self.entries.remove(&key);
            }
        }
        self.entries.insert(Self::key(jd_text, cv_text), evaluation);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn key(jd_text: &str, cv_text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(jd_text.as_bytes());
        hasher.update([0u8]);
        hasher.update(cv_text.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluation(id: &str, score: f32) -> CandidateEvaluation {
        CandidateEvaluation {
            candidate_id: id.to_string(),
            score,
            skills_evaluation: vec![],
            experience_evaluation: vec![],
            additional_points: vec![],
            overall_assessment: String::new(),
        }
    }

    #[test]
    fn round_trips_by_document_content() {
        let cache = ComparisonCache::new(16);
        cache.set("jd text", "cv text", evaluation("cv-1", 6.0));

        let hit = cache.get("jd text", "cv text").unwrap();
        assert_eq!(hit.candidate_id, "cv-1");
        assert!(cache.get("jd text", "other cv").is_none());
    }

    #[test]
    fn distinguishes_which_side_text_belongs_to() {
        let cache = ComparisonCache::new(16);
        cache.set("aa", "b", evaluation("cv-1", 1.0));
        assert!(cache.get("a", "ab").is_none());
    }
}
