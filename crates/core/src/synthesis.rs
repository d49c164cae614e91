use crate::error::QuerySynthesisError;
use crate::models::{RetrievedChunk, StructuredQuery};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

pub const DEFAULT_GENERATIVE_MODEL: &str = "gemini-1.5-pro";

const DEFAULT_GENERATION_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Text-in, text-out generative model seam.
#[async_trait]
pub trait GenerativeModel {
    async fn generate(&self, prompt: &str) -> Result<String, QuerySynthesisError>;
}

pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(DEFAULT_GENERATION_ENDPOINT, api_key)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: DEFAULT_GENERATIVE_MODEL.to_string(),
        }
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, QuerySynthesisError> {
        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.endpoint, self.model
            ))
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "contents": [{ "parts": [{ "text": prompt }] }],
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuerySynthesisError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let parsed: Value = response.json().await?;
        let text = parsed
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or(QuerySynthesisError::EmptyContent)?;

        Ok(text.to_string())
    }
}

/// Instruction asking the model for a role/skills/location JSON object,
/// with the retrieved resume chunks as context.
pub fn build_query_prompt(
    chunks: &[RetrievedChunk],
    role: &str,
    fallback_location: &str,
) -> String {
    let context = chunks
        .iter()
        .map(|chunk| chunk.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an AI job search assistant. Based on the resume chunks below, craft a job search query for the role "{role}". Identify:

- **Role**: Use the provided role: "{role}".
- **Skills**: Select 2-3 key technical skills (e.g., ["Python", "Django"]).
- **Location**: Preferred job location (e.g., "{fallback_location}" or "remote").

Resume Chunks:
{context}

Output a JSON object with keys 'role', 'skills', 'location'. If location is unclear, use "{fallback_location}". Ensure skills are concise.
Example: {{"role": "{role}", "skills": ["Python", "Django"], "location": "{fallback_location}"}}"#
    )
}

/// Strips an optional Markdown code fence (``` or ```json) wrapping the
/// model output.
pub fn strip_json_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// One generation round trip: prompt the model with the retrieved context,
/// strip fencing, parse the remainder as a structured query. Any deviation
/// from the requested JSON shape fails; nothing is repaired or retried.
pub async fn synthesize_query<G>(
    model: &G,
    chunks: &[RetrievedChunk],
    role: &str,
    fallback_location: &str,
) -> Result<StructuredQuery, QuerySynthesisError>
where
    G: GenerativeModel + Sync,
{
    let prompt = build_query_prompt(chunks, role, fallback_location);
    let raw = model.generate(&prompt).await?;
    debug!(raw_len = raw.len(), "generative model replied");

    let query: StructuredQuery = serde_json::from_str(strip_json_fences(&raw))?;
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::{
        build_query_prompt, strip_json_fences, synthesize_query, GeminiClient, GenerativeModel,
    };
    use crate::error::QuerySynthesisError;
    use crate::models::RetrievedChunk;
    use async_trait::async_trait;
    use httpmock::prelude::*;
    use serde_json::json;

    struct CannedModel {
        reply: String,
    }

    #[async_trait]
    impl GenerativeModel for CannedModel {
        async fn generate(&self, _prompt: &str) -> Result<String, QuerySynthesisError> {
            Ok(self.reply.clone())
        }
    }

    fn chunks() -> Vec<RetrievedChunk> {
        vec![
            RetrievedChunk {
                text: "Experienced Python developer".to_string(),
                score: 0.9,
            },
            RetrievedChunk {
                text: "Skilled in Django and REST APIs".to_string(),
                score: 0.8,
            },
        ]
    }

    #[test]
    fn prompt_contains_role_context_and_fallback() {
        let prompt = build_query_prompt(&chunks(), "Python Developer", "Pune, India");
        assert!(prompt.contains(r#"for the role "Python Developer""#));
        assert!(prompt.contains("Experienced Python developer\nSkilled in Django and REST APIs"));
        assert!(prompt.contains(r#"If location is unclear, use "Pune, India""#));
    }

    #[test]
    fn fences_are_stripped_with_and_without_language_tag() {
        assert_eq!(
            strip_json_fences("```json\n{\"role\": \"x\"}\n```"),
            "{\"role\": \"x\"}"
        );
        assert_eq!(
            strip_json_fences("```\n{\"role\": \"x\"}\n```"),
            "{\"role\": \"x\"}"
        );
        assert_eq!(strip_json_fences("{\"role\": \"x\"}"), "{\"role\": \"x\"}");
    }

    #[tokio::test]
    async fn fenced_model_output_parses_into_a_query() {
        let model = CannedModel {
            reply: "```json\n{\"role\": \"Python Developer\", \"skills\": [\"Python\", \"Django\"], \"location\": \"Pune, India\"}\n```"
                .to_string(),
        };

        let query = synthesize_query(&model, &chunks(), "Python Developer", "Pune, India")
            .await
            .expect("synthesis should succeed");

        assert_eq!(query.role, "Python Developer");
        assert_eq!(query.skills, vec!["Python", "Django"]);
        assert_eq!(query.location, "Pune, India");
    }

    #[tokio::test]
    async fn prose_around_the_json_is_a_hard_failure() {
        let model = CannedModel {
            reply: "Sure! Here is the query: {\"role\": \"x\", \"skills\": [], \"location\": \"y\"}"
                .to_string(),
        };

        let error = synthesize_query(&model, &chunks(), "Python Developer", "Pune, India")
            .await
            .expect_err("synthesis should fail");
        assert!(matches!(error, QuerySynthesisError::MalformedJson(_)));
    }

    #[tokio::test]
    async fn missing_keys_fail_the_parse() {
        let model = CannedModel {
            reply: "{\"role\": \"Python Developer\", \"skills\": [\"Python\"]}".to_string(),
        };

        let error = synthesize_query(&model, &chunks(), "Python Developer", "Pune, India")
            .await
            .expect_err("synthesis should fail");
        assert!(matches!(error, QuerySynthesisError::MalformedJson(_)));
    }

    #[tokio::test]
    async fn unexpected_keys_fail_the_parse() {
        let model = CannedModel {
            reply: "{\"role\": \"x\", \"skills\": [], \"location\": \"y\", \"seniority\": \"senior\"}"
                .to_string(),
        };

        let error = synthesize_query(&model, &chunks(), "Python Developer", "Pune, India")
            .await
            .expect_err("synthesis should fail");
        assert!(matches!(error, QuerySynthesisError::MalformedJson(_)));
    }

    #[tokio::test]
    async fn gemini_client_extracts_candidate_text() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/models/gemini-1.5-pro:generateContent")
                    .query_param("key", "api-key");
                then.status(200).json_body(json!({
                    "candidates": [{
                        "content": { "parts": [{ "text": "  {\"role\": \"x\"}  " }] }
                    }]
                }));
            })
            .await;

        let client = GeminiClient::with_endpoint(server.base_url(), "api-key");
        let text = client.generate("prompt").await.expect("should succeed");
        assert_eq!(text, "{\"role\": \"x\"}");
    }

    #[tokio::test]
    async fn gemini_client_treats_missing_candidates_as_empty_content() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/models/gemini-1.5-pro:generateContent");
                then.status(200).json_body(json!({ "candidates": [] }));
            })
            .await;

        let client = GeminiClient::with_endpoint(server.base_url(), "api-key");
        let error = client.generate("prompt").await.expect_err("should fail");
        assert!(matches!(error, QuerySynthesisError::EmptyContent));
    }
}
