use serde::{Deserialize, Serialize};

/// Importance of a job-description chunk for the role it describes.
/// Candidate chunks never carry a weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weight {
    General,
    Desirable,
    Essential,
}

impl Weight {
    /// Parse a stored integer weight. Anything outside 1..=3 falls back
    /// to General, matching how ingestion defaults bad values.
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            2 => Weight::Desirable,
            3 => Weight::Essential,
            _ => Weight::General,
        }
    }

    pub fn factor(self) -> f32 {
        match self {
            Weight::General => 1.0,
            Weight::Desirable => 2.0,
            Weight::Essential => 3.0,
        }
    }
}

/// One immutable segment of a document. `seq` is the persisted position
/// used for reconstruction; insertion order is never relied on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    pub doc_id: String,
    pub seq: usize,
    /// Original text, shown to humans and used for reconstruction.
    pub text: String,
    /// Enrichment used only on the embedding side.
    pub enriched_text: String,
    pub embedding: Vec<f32>,
    /// Set for job-description chunks only.
    pub weight: Option<Weight>,
}

/// Transient result of one similarity lookup: which candidate document
/// owned the matched chunk, and the raw cosine similarity.
#[derive(Debug, Clone)]
pub struct ChunkMatch {
    pub doc_id: String,
    pub similarity: f32,
}

/// Rebuild a document's full text from its chunks. Chunks are ordered by
/// their persisted `seq`, blank chunks are dropped, and parts are joined
/// with a blank line. The result depends only on `seq`, never on the
/// order chunks arrive in.
pub fn reconstruct_text(mut chunks: Vec<StoredChunk>) -> String {
    chunks.sort_by_key(|c| c.seq);
    let parts: Vec<&str> = chunks
        .iter()
        .map(|c| c.text.trim())
        .filter(|t| !t.is_empty())
        .collect();
    parts.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(seq: usize, text: &str) -> StoredChunk {
        StoredChunk {
            doc_id: "doc-1".to_string(),
            seq,
            text: text.to_string(),
            enriched_text: String::new(),
            embedding: vec![],
            weight: None,
        }
    }

    #[test]
    fn weight_from_raw_defaults_out_of_range_to_general() {
        assert_eq!(Weight::from_raw(1), Weight::General);
        assert_eq!(Weight::from_raw(2), Weight::Desirable);
        assert_eq!(Weight::from_raw(3), Weight::Essential);
        assert_eq!(Weight::from_raw(0), Weight::General);
        assert_eq!(Weight::from_raw(7), Weight::General);
        assert_eq!(Weight::from_raw(-1), Weight::General);
    }

    #[test]
    fn weight_factors_are_ordered() {
        assert!(Weight::Essential.factor() > Weight::Desirable.factor());
        assert!(Weight::Desirable.factor() > Weight::General.factor());
    }

    #[test]
    fn reconstruct_orders_by_seq_not_insertion() {
        let shuffled = vec![chunk(2, "third"), chunk(0, "first"), chunk(1, "second")];
        let ordered = vec![chunk(0, "first"), chunk(1, "second"), chunk(2, "third")];
        assert_eq!(reconstruct_text(shuffled), reconstruct_text(ordered));
        assert_eq!(
            reconstruct_text(vec![chunk(1, "b"), chunk(0, "a")]),
            "a\n\nb"
        );
    }

    #[test]
    fn reconstruct_is_idempotent() {
        let chunks = vec![chunk(0, "intro"), chunk(1, "body"), chunk(2, "outro")];
        let first = reconstruct_text(chunks.clone());
        let second = reconstruct_text(chunks);
        assert_eq!(first, second);
    }

    #[test]
    fn reconstruct_skips_blank_chunks() {
        let chunks = vec![chunk(0, "kept"), chunk(1, "   "), chunk(2, "also kept")];
        assert_eq!(reconstruct_text(chunks), "kept\n\nalso kept");
    }
}
