use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::warn;

use crate::chunk::{ChunkMatch, StoredChunk, Weight, reconstruct_text};
use crate::{ChunkStore, SimilaritySearch};

const SCROLL_PAGE_SIZE: usize = 100;

/// Qdrant-backed chunk store, talking to the REST API directly.
/// Job-description chunks live in one collection, candidate chunks in
/// another; both share the payload schema written by ingestion.
#[derive(Clone)]
pub struct QdrantStore {
    base_url: String,
    client: reqwest::Client,
    jd_collection: String,
    cv_collection: String,
}

impl QdrantStore {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
            jd_collection: "jd_chunks".to_string(),
            cv_collection: "cv_chunks".to_string(),
        }
    }

    pub fn with_collections(mut self, jd_collection: String, cv_collection: String) -> Self {
        self.jd_collection = jd_collection;
        self.cv_collection = cv_collection;
        self
    }

    /// Liveness probe used by the health endpoint.
    pub async fn ping(&self) -> Result<()> {
        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .context("Failed to reach Qdrant")?;
        if !response.status().is_success() {
            bail!("Qdrant returned status {}", response.status());
        }
        Ok(())
    }

    /// Fetch every chunk of one document via paginated scroll.
    async fn scroll_chunks(&self, collection: &str, doc_id: &str) -> Result<Vec<StoredChunk>> {
        let url = format!("{}/collections/{}/points/scroll", self.base_url, collection);

        let mut chunks = Vec::new();
        let mut offset: Option<Value> = None;

        loop {
            let mut body = json!({
                "filter": {
                    "must": [
                        {"key": "doc_id", "match": {"value": doc_id}}
                    ]
                },
                "limit": SCROLL_PAGE_SIZE,
                "with_payload": true,
                "with_vector": true,
            });
            if let Some(ref cursor) = offset {
                body["offset"] = cursor.clone();
            }

            let response = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .context("Failed to send scroll request to Qdrant")?;

            if !response.status().is_success() {
                let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
                bail!("Qdrant scroll failed: {}", error_text);
            }

            let result: Value = response
                .json()
                .await
                .context("Failed to parse Qdrant scroll response")?;

            let points = result["result"]["points"]
                .as_array()
                .context("Invalid Qdrant scroll response format")?;

            for point in points {
                match parse_chunk(point) {
                    Some(chunk) => chunks.push(chunk),
                    None => warn!(doc_id, collection, "Skipping malformed chunk payload"),
                }
            }

            match result["result"]["next_page_offset"].clone() {
                Value::Null => break,
                cursor => offset = Some(cursor),
            }
        }

        if chunks.is_empty() {
            bail!("no chunks found for document '{doc_id}' in '{collection}'");
        }

        Ok(chunks)
    }
}

fn parse_chunk(point: &Value) -> Option<StoredChunk> {
    let payload = point["payload"].as_object()?;

    let doc_id = payload.get("doc_id")?.as_str()?.to_string();
    let seq = payload.get("seq")?.as_u64()? as usize;
    let text = payload
        .get("text")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    let enriched_text = payload
        .get("enriched_text")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    let weight = payload
        .get("weight")
        .and_then(|v| v.as_i64())
        .map(Weight::from_raw);

    let embedding = point["vector"]
        .as_array()
        .map(|values| {
            values
                .iter()
                .filter_map(|v| v.as_f64().map(|f| f as f32))
                .collect()
        })
        .unwrap_or_default();

    Some(StoredChunk {
        doc_id,
        seq,
        text,
        enriched_text,
        embedding,
        weight,
    })
}

#[async_trait]
impl ChunkStore for QdrantStore {
    async fn job_chunks(&self, jd_id: &str) -> Result<Vec<StoredChunk>> {
        let mut chunks = self.scroll_chunks(&self.jd_collection, jd_id).await?;
        chunks.sort_by_key(|c| c.seq);
        Ok(chunks)
    }

    async fn job_text(&self, jd_id: &str) -> Result<String> {
        let chunks = self.scroll_chunks(&self.jd_collection, jd_id).await?;
        Ok(reconstruct_text(chunks))
    }

    async fn candidate_text(&self, cv_id: &str) -> Result<String> {
        let chunks = self.scroll_chunks(&self.cv_collection, cv_id).await?;
        Ok(reconstruct_text(chunks))
    }
}

#[async_trait]
impl SimilaritySearch for QdrantStore {
    async fn search_candidates(
        &self,
        embedding: &[f32],
        top_k: usize,
        pool: &[String],
    ) -> Result<Vec<ChunkMatch>> {
        let url = format!(
            "{}/collections/{}/points/search",
            self.base_url, self.cv_collection
        );

        let body = json!({
            "vector": embedding,
            "limit": top_k,
            "with_payload": true,
            "filter": {
                "must": [
                    {"key": "doc_id", "match": {"any": pool}}
                ]
            }
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to send search request to Qdrant")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            bail!("Qdrant search failed: {}", error_text);
        }

        let result: Value = response
            .json()
            .await
            .context("Failed to parse Qdrant search response")?;

        let points = result["result"]
            .as_array()
            .context("Invalid Qdrant search response format")?;

        let mut matches = Vec::new();
        for point in points {
            let similarity = point["score"].as_f64().unwrap_or(0.0) as f32;
            let doc_id = point["payload"]["doc_id"]
                .as_str()
                .unwrap_or("")
                .to_string();
            if doc_id.is_empty() {
                warn!("Search hit without doc_id payload, skipping");
                continue;
            }
            matches.push(ChunkMatch { doc_id, similarity });
        }

        Ok(matches)
    }
}
