pub mod chunk;
pub mod memory;
pub mod qdrant;

pub use chunk::{reconstruct_text, ChunkMatch, StoredChunk, Weight};
pub use memory::InMemoryStore;
pub use qdrant::QdrantStore;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

/// Read-only access to persisted documents and their chunks. Ranking
/// never writes; ingestion owns all mutation and is a separate system.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// All chunks of a job description, ordered by persisted sequence
    /// position, weights included.
    async fn job_chunks(&self, jd_id: &str) -> Result<Vec<StoredChunk>>;

    /// Full text of a job description, reconstructed from its chunks.
    async fn job_text(&self, jd_id: &str) -> Result<String>;

    /// Full text of a candidate document, reconstructed from its chunks.
    async fn candidate_text(&self, cv_id: &str) -> Result<String>;
}

/// Vector similarity lookup over candidate chunks, restricted to a set
/// of candidate documents. Returns up to `top_k` matches ordered by
/// similarity descending.
#[async_trait]
pub trait SimilaritySearch: Send + Sync {
    async fn search_candidates(
        &self,
        embedding: &[f32],
        top_k: usize,
        pool: &[String],
    ) -> Result<Vec<ChunkMatch>>;
}

#[async_trait]
impl<T: ChunkStore + ?Sized> ChunkStore for Arc<T> {
    async fn job_chunks(&self, jd_id: &str) -> Result<Vec<StoredChunk>> {
        (**self).job_chunks(jd_id).await
    }

    async fn job_text(&self, jd_id: &str) -> Result<String> {
        (**self).job_text(jd_id).await
    }

    async fn candidate_text(&self, cv_id: &str) -> Result<String> {
        (**self).candidate_text(cv_id).await
    }
}

#[async_trait]
impl<T: SimilaritySearch + ?Sized> SimilaritySearch for Arc<T> {
    async fn search_candidates(
        &self,
        embedding: &[f32],
        top_k: usize,
        pool: &[String],
    ) -> Result<Vec<ChunkMatch>> {
        (**self).search_candidates(embedding, top_k, pool).await
    }
}
