use crate::error::SimilarityError;
use async_trait::async_trait;

/// One nearest-neighbor hit from the external index.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch {
    pub content: String,
    /// Distance between the query content and the indexed entry; lower
    /// means more similar.
    pub score: f64,
}

/// Read-only similarity lookup against the external retrieval index.
///
/// Implementations return at most `k` matches ordered by ascending
/// score. The ingestion pipeline only ever asks for `k = 1`, issues no
/// writes through this seam, and performs no locking of its own; the
/// implementation defines what concurrent callers may do.
#[async_trait]
pub trait SimilaritySearch: Send + Sync {
    async fn similarity_search(
        &self,
        content: &str,
        k: usize,
    ) -> Result<Vec<ScoredMatch>, SimilarityError>;
}
