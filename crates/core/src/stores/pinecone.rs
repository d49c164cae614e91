use crate::error::StoreError;
use crate::models::{RetrievedChunk, VectorRecord};
use crate::traits::VectorIndex;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

const DEFAULT_CONTROL_ENDPOINT: &str = "https://api.pinecone.io";

/// Pinecone data-plane client bound to one index host.
pub struct PineconeStore {
    client: Client,
    index_host: String,
    api_key: String,
}

impl PineconeStore {
    pub fn new(index_host: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            index_host: index_host.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl VectorIndex for PineconeStore {
    async fn upsert(&self, namespace: &str, records: &[VectorRecord]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .post(format!("{}/vectors/upsert", self.index_host))
            .header("Api-Key", &self.api_key)
            .json(&json!({
                "vectors": records,
                "namespace": namespace,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Backend {
                status: response.status().as_u16(),
                details: response.text().await.unwrap_or_default(),
            });
        }

        Ok(())
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>, StoreError> {
        let response = self
            .client
            .post(format!("{}/query", self.index_host))
            .header("Api-Key", &self.api_key)
            .json(&json!({
                "vector": vector,
                "topK": top_k,
                "includeMetadata": true,
                "namespace": namespace,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Backend {
                status: response.status().as_u16(),
                details: response.text().await.unwrap_or_default(),
            });
        }

        let parsed: Value = response.json().await?;
        let matches = parsed
            .pointer("/matches")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut result = Vec::new();
        for hit in matches {
            let text = hit
                .pointer("/metadata/text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let score = hit.pointer("/score").and_then(Value::as_f64).unwrap_or(0.0);

            result.push(RetrievedChunk { text, score });
        }

        Ok(result)
    }
}

/// Pinecone control-plane client: resolves an index host, creating the
/// index when it does not exist yet (1024-dim cosine, serverless
/// aws/us-east-1).
pub struct PineconeAdmin {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl PineconeAdmin {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(DEFAULT_CONTROL_ENDPOINT, api_key)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    /// Returns the index host, creating the index first if the control
    /// plane does not know it.
    pub async fn ensure_index(&self, name: &str, dimensions: usize) -> Result<String, StoreError> {
        let response = self
            .client
            .get(format!("{}/indexes/{}", self.endpoint, name))
            .header("Api-Key", &self.api_key)
            .send()
            .await?;

        if response.status().is_success() {
            let parsed: Value = response.json().await?;
            return index_host(&parsed, name);
        }

        if response.status() != StatusCode::NOT_FOUND {
            return Err(StoreError::Backend {
                status: response.status().as_u16(),
                details: response.text().await.unwrap_or_default(),
            });
        }

        let response = self
            .client
            .post(format!("{}/indexes", self.endpoint))
            .header("Api-Key", &self.api_key)
            .json(&json!({
                "name": name,
                "dimension": dimensions,
                "metric": "cosine",
                "spec": {
                    "serverless": {
                        "cloud": "aws",
                        "region": "us-east-1",
                    }
                }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Backend {
                status: response.status().as_u16(),
                details: response.text().await.unwrap_or_default(),
            });
        }

        let parsed: Value = response.json().await?;
        index_host(&parsed, name)
    }
}

fn index_host(parsed: &Value, name: &str) -> Result<String, StoreError> {
    parsed
        .pointer("/host")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| StoreError::Backend {
            status: 0,
            details: format!("index description for {name} has no host"),
        })
}
