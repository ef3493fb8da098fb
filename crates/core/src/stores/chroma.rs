use crate::embeddings::{Embedder, HashedNgramEmbedder};
use crate::error::SimilarityError;
use crate::models::IndexableChunk;
use crate::traits::{ScoredMatch, SimilaritySearch};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use url::Url;

/// HTTP client bound to one Chroma collection.
///
/// Embeddings are computed locally so queries and writes carry their
/// own vectors; the server never embeds.
#[derive(Clone)]
pub struct ChromaStore {
    client: Client,
    endpoint: String,
    collection_id: String,
    embedder: HashedNgramEmbedder,
}

impl ChromaStore {
    /// Resolves (or creates) `collection` on the Chroma server at
    /// `endpoint` and returns a client bound to its id.
    pub async fn connect(endpoint: &str, collection: &str) -> Result<Self, SimilarityError> {
        let endpoint = Url::parse(endpoint)?
            .to_string()
            .trim_end_matches('/')
            .to_string();
        let client = Client::new();

        let response = client
            .post(format!("{endpoint}/api/v1/collections"))
            .json(&json!({ "name": collection, "get_or_create": true }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SimilarityError::BackendResponse {
                backend: "chroma".to_string(),
                details: response.status().to_string(),
            });
        }

        let parsed: Value = response.json().await?;
        let collection_id = parsed
            .pointer("/id")
            .and_then(Value::as_str)
            .ok_or_else(|| SimilarityError::BackendResponse {
                backend: "chroma".to_string(),
                details: "collection response missing id".to_string(),
            })?
            .to_string();

        Ok(Self {
            client,
            endpoint,
            collection_id,
            embedder: HashedNgramEmbedder::default(),
        })
    }

    /// Writes chunks into the collection. Ids are digests of content
    /// plus metadata, so re-adding the same chunk upserts rather than
    /// duplicates.
    pub async fn add_chunks(&self, chunks: &[IndexableChunk]) -> Result<(), SimilarityError> {
        if chunks.is_empty() {
            return Ok(());
        }

        let mut ids = Vec::with_capacity(chunks.len());
        let mut documents = Vec::with_capacity(chunks.len());
        let mut metadatas = Vec::with_capacity(chunks.len());
        let mut embeddings = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            ids.push(chunk_id(chunk)?);
            documents.push(chunk.content.clone());
            metadatas.push(serde_json::to_value(&chunk.metadata)?);
            embeddings.push(self.embedder.embed(&chunk.content));
        }

        let response = self
            .client
            .post(format!(
                "{}/api/v1/collections/{}/upsert",
                self.endpoint, self.collection_id
            ))
            .json(&json!({
                "ids": ids,
                "documents": documents,
                "metadatas": metadatas,
                "embeddings": embeddings,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SimilarityError::BackendResponse {
                backend: "chroma".to_string(),
                details: response.status().to_string(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl SimilaritySearch for ChromaStore {
    async fn similarity_search(
        &self,
        content: &str,
        k: usize,
    ) -> Result<Vec<ScoredMatch>, SimilarityError> {
        let response = self
            .client
            .post(format!(
                "{}/api/v1/collections/{}/query",
                self.endpoint, self.collection_id
            ))
            .json(&json!({
                "query_embeddings": [self.embedder.embed(content)],
                "n_results": k,
                "include": ["documents", "distances"],
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SimilarityError::BackendResponse {
                backend: "chroma".to_string(),
                details: response.status().to_string(),
            });
        }

        let parsed: Value = response.json().await?;
        // Result arrays are nested per query; a single query was sent.
        let documents = parsed
            .pointer("/documents/0")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let distances = parsed
            .pointer("/distances/0")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut matches = Vec::new();
        for (document, distance) in documents.iter().zip(distances.iter()) {
            matches.push(ScoredMatch {
                content: document.as_str().unwrap_or_default().to_string(),
                score: distance.as_f64().unwrap_or(f64::MAX),
            });
        }

        // The trait contract is ascending distance, nearest first.
        matches.sort_by(|left, right| left.score.total_cmp(&right.score));
        Ok(matches)
    }
}

fn chunk_id(chunk: &IndexableChunk) -> Result<String, SimilarityError> {
    let mut hasher = Sha256::new();
    hasher.update(chunk.content.as_bytes());
    hasher.update(serde_json::to_vec(&chunk.metadata)?);
    Ok(format!("{:x}", hasher.finalize()))
}
