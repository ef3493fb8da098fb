use crate::error::IngestError;
use crate::models::DuplicateDecision;
use crate::traits::SimilaritySearch;
use tracing::info;

/// Distance at or below which content is judged to already exist in
/// the index.
pub const SIMILARITY_THRESHOLD: f64 = 0.3;

/// Decides whether content is novel enough to index by asking the
/// external index for its single nearest neighbor.
pub struct DuplicateFilter<S> {
    index: S,
    threshold: f64,
}

impl<S> DuplicateFilter<S>
where
    S: SimilaritySearch,
{
    pub fn new(index: S) -> Self {
        Self::with_threshold(index, SIMILARITY_THRESHOLD)
    }

    /// The pipeline threshold is fixed; callers needing a different
    /// rejection policy construct their own filter instance.
    pub fn with_threshold(index: S, threshold: f64) -> Self {
        Self { index, threshold }
    }

    /// Accepts or rejects `content`. With `force` the lookup is
    /// bypassed entirely and the content accepted unconditionally.
    /// Otherwise one `k = 1` query is issued: no match accepts, a match
    /// accepts only when its distance is strictly greater than the
    /// threshold. Rejection is an expected filtering outcome, logged
    /// and never raised as an error.
    pub async fn should_accept(
        &self,
        content: &str,
        force: bool,
    ) -> Result<DuplicateDecision, IngestError> {
        if force {
            return Ok(DuplicateDecision {
                accept: true,
                matched_score: None,
            });
        }

        let matches = self.index.similarity_search(content, 1).await?;

        match matches.first() {
            Some(nearest) if nearest.score <= self.threshold => {
                info!(
                    score = nearest.score,
                    threshold = self.threshold,
                    "near-duplicate of an indexed entry, not added"
                );
                Ok(DuplicateDecision {
                    accept: false,
                    matched_score: Some(nearest.score),
                })
            }
            Some(nearest) => Ok(DuplicateDecision {
                accept: true,
                matched_score: Some(nearest.score),
            }),
            None => Ok(DuplicateDecision {
                accept: true,
                matched_score: None,
            }),
        }
    }
}
