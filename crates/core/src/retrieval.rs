use crate::embeddings::{Embedder, EmbeddingInputType};
use crate::error::{EmbeddingError, RetrievalError};
use crate::models::RetrievedChunk;
use crate::traits::VectorIndex;
use tracing::debug;

pub const DEFAULT_TOP_K: usize = 5;

/// Embeds the query with the same model used at storage time and fetches
/// the top-k nearest chunks from the namespace. No retries; the first
/// failure propagates.
pub async fn retrieve_chunks<E, V>(
    embedder: &E,
    store: &V,
    namespace: &str,
    query: &str,
    top_k: usize,
) -> Result<Vec<RetrievedChunk>, RetrievalError>
where
    E: Embedder + Sync,
    V: VectorIndex + Sync,
{
    let texts = [query.to_string()];
    let vector = embedder
        .embed(&texts, EmbeddingInputType::SearchQuery)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            EmbeddingError::Malformed("query embedding response was empty".to_string())
        })?;

    let chunks = store.query(namespace, &vector, top_k).await?;
    debug!(query, chunk_count = chunks.len(), "retrieved resume context");

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::{retrieve_chunks, DEFAULT_TOP_K};
    use crate::embeddings::{Embedder, EmbeddingInputType};
    use crate::error::{EmbeddingError, StoreError};
    use crate::models::{RetrievedChunk, VectorRecord};
    use crate::traits::VectorIndex;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct UnitEmbedder;

    #[async_trait]
    impl Embedder for UnitEmbedder {
        fn dimensions(&self) -> usize {
            2
        }

        async fn embed(
            &self,
            texts: &[String],
            input_type: EmbeddingInputType,
        ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            assert_eq!(input_type, EmbeddingInputType::SearchQuery);
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        hits: Vec<RetrievedChunk>,
        queries: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl VectorIndex for RecordingStore {
        async fn upsert(
            &self,
            _namespace: &str,
            _records: &[VectorRecord],
        ) -> Result<(), StoreError> {
            Ok(())
        }

        async fn query(
            &self,
            namespace: &str,
            _vector: &[f32],
            top_k: usize,
        ) -> Result<Vec<RetrievedChunk>, StoreError> {
            self.queries
                .lock()
                .expect("lock")
                .push((namespace.to_string(), top_k));
            Ok(self.hits.clone())
        }
    }

    #[tokio::test]
    async fn retrieval_queries_the_namespace_with_a_query_embedding() {
        let store = RecordingStore {
            hits: vec![RetrievedChunk {
                text: "Experienced Python developer".to_string(),
                score: 0.9,
            }],
            ..Default::default()
        };

        let chunks = retrieve_chunks(
            &UnitEmbedder,
            &store,
            "resumes",
            "software development skills",
            DEFAULT_TOP_K,
        )
        .await
        .expect("retrieval should succeed");

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Experienced Python developer");
        assert_eq!(
            store.queries.lock().expect("lock").as_slice(),
            &[("resumes".to_string(), DEFAULT_TOP_K)]
        );
    }

    #[tokio::test]
    async fn empty_store_yields_an_empty_result() {
        let store = RecordingStore::default();
        let chunks = retrieve_chunks(&UnitEmbedder, &store, "resumes", "anything", 5)
            .await
            .expect("retrieval should succeed");
        assert!(chunks.is_empty());
    }
}
