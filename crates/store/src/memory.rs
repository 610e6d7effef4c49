use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::chunk::{reconstruct_text, ChunkMatch, StoredChunk};
use crate::{ChunkStore, SimilaritySearch};

/// In-memory backend with brute-force cosine search. Used by the test
/// suites and local demos; the production backend is [`crate::QdrantStore`].
#[derive(Default)]
pub struct InMemoryStore {
    docs: RwLock<HashMap<String, Vec<StoredChunk>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_chunk(&self, chunk: StoredChunk) {
        let mut docs = self.docs.write().expect("store lock poisoned");
        docs.entry(chunk.doc_id.clone()).or_default().push(chunk);
    }

    pub fn insert_document(&self, chunks: Vec<StoredChunk>) {
        for chunk in chunks {
            self.insert_chunk(chunk);
        }
    }

    fn chunks_of(&self, doc_id: &str) -> Result<Vec<StoredChunk>> {
        let docs = self.docs.read().expect("store lock poisoned");
        match docs.get(doc_id) {
            Some(chunks) if !chunks.is_empty() => Ok(chunks.clone()),
            _ => bail!("no chunks found for document '{doc_id}'"),
        }
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl ChunkStore for InMemoryStore {
    async fn job_chunks(&self, jd_id: &str) -> Result<Vec<StoredChunk>> {
        let mut chunks = self.chunks_of(jd_id)?;
        chunks.sort_by_key(|c| c.seq);
        Ok(chunks)
    }

    async fn job_text(&self, jd_id: &str) -> Result<String> {
        Ok(reconstruct_text(self.chunks_of(jd_id)?))
    }

    async fn candidate_text(&self, cv_id: &str) -> Result<String> {
        Ok(reconstruct_text(self.chunks_of(cv_id)?))
    }
}

#[async_trait]
impl SimilaritySearch for InMemoryStore {
    async fn search_candidates(
        &self,
        embedding: &[f32],
        top_k: usize,
        pool: &[String],
    ) -> Result<Vec<ChunkMatch>> {
        let docs = self.docs.read().expect("store lock poisoned");
        let mut matches: Vec<ChunkMatch> = Vec::new();
        for doc_id in pool {
            let Some(chunks) = docs.get(doc_id) else {
                continue;
            };
            for chunk in chunks {
                if chunk.embedding.is_empty() {
                    continue;
                }
                matches.push(ChunkMatch {
                    doc_id: doc_id.clone(),
                    similarity: cosine_similarity(embedding, &chunk.embedding),
                });
            }
        }
        matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        matches.truncate(top_k);
        Ok(matches)
    }
}
