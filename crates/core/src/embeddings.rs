use crate::error::EmbeddingError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Dimensionality of `embed-english-v3.0` vectors. The store index is
/// created with this size; storage and querying must use the same model
/// or relevance silently degrades with no way to detect it.
pub const EMBEDDING_DIMENSIONS: usize = 1024;

pub const DEFAULT_EMBEDDING_MODEL: &str = "embed-english-v3.0";

const DEFAULT_EMBED_ENDPOINT: &str = "https://api.cohere.com/v1/embed";

/// Hint the embedding service uses to shape vectors for storage vs lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingInputType {
    SearchDocument,
    SearchQuery,
}

#[async_trait]
pub trait Embedder {
    fn dimensions(&self) -> usize;

    /// Embeds all texts in one batch call; the result is index-aligned
    /// with the input.
    async fn embed(
        &self,
        texts: &[String],
        input_type: EmbeddingInputType,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

#[derive(Debug, Clone, Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
    model: &'a str,
    input_type: EmbeddingInputType,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

pub struct CohereEmbedder {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl CohereEmbedder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(DEFAULT_EMBED_ENDPOINT, api_key)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }
}

#[async_trait]
impl Embedder for CohereEmbedder {
    fn dimensions(&self) -> usize {
        EMBEDDING_DIMENSIONS
    }

    async fn embed(
        &self,
        texts: &[String],
        input_type: EmbeddingInputType,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&EmbedRequest {
                texts,
                model: &self.model,
                input_type,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(EmbeddingError::Backend {
                status: status.as_u16(),
                details: response.text().await.unwrap_or_default(),
            });
        }

        let payload: EmbedResponse = response.json().await?;
        if payload.embeddings.len() != texts.len() {
            return Err(EmbeddingError::Malformed(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                payload.embeddings.len()
            )));
        }

        Ok(payload.embeddings)
    }
}
