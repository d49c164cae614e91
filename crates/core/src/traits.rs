use crate::error::{SearchError, StoreError};
use crate::models::{JobListing, RetrievedChunk, StructuredQuery, VectorRecord};
use async_trait::async_trait;

/// Keyed nearest-neighbor store partitioned by namespace. Upserts are
/// idempotent on record id, last write wins.
#[async_trait]
pub trait VectorIndex {
    async fn upsert(&self, namespace: &str, records: &[VectorRecord]) -> Result<(), StoreError>;

    /// Top-k neighbors for the vector, highest similarity first, metadata
    /// attached. An unknown or empty namespace yields an empty result.
    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>, StoreError>;
}

/// External job-listing search keyed off a structured query.
#[async_trait]
pub trait JobSearch {
    async fn search(&self, query: &StructuredQuery) -> Result<Vec<JobListing>, SearchError>;
}
