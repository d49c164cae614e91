use crate::error::SearchError;
use crate::models::{JobListing, StructuredQuery};
use crate::traits::JobSearch;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

pub const DESCRIPTION_PREVIEW_CHARS: usize = 200;

const DEFAULT_SEARCH_ENDPOINT: &str = "https://jsearch.p.rapidapi.com";
const RAPIDAPI_HOST: &str = "jsearch.p.rapidapi.com";
const COUNTRY_FILTER: &str = "in";

/// JSearch (RapidAPI) client. One GET per search, results passed through
/// in API order.
pub struct JSearchClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl JSearchClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(DEFAULT_SEARCH_ENDPOINT, api_key)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }
}

/// Search term the API expects: `"{role} in {location}"` with spaces
/// joined by `+`.
pub fn build_search_term(query: &StructuredQuery) -> String {
    format!("{} in {}", query.role, query.location).replace(' ', "+")
}

/// First 200 characters of the description plus an ellipsis, regardless of
/// word boundaries or original length.
pub fn truncate_description(description: &str) -> String {
    let preview: String = description.chars().take(DESCRIPTION_PREVIEW_CHARS).collect();
    format!("{preview}...")
}

fn text_field(value: &Value, pointer: &str) -> String {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl JobSearch for JSearchClient {
    async fn search(&self, query: &StructuredQuery) -> Result<Vec<JobListing>, SearchError> {
        let term = build_search_term(query);
        debug!(term, country = COUNTRY_FILTER, "querying job search api");

        let response = self
            .client
            .get(format!("{}/search", self.endpoint))
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", RAPIDAPI_HOST)
            .query(&[("query", term.as_str()), ("country", COUNTRY_FILTER)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                details: response.text().await.unwrap_or_default(),
            });
        }

        let parsed: Value = response.json().await?;
        let api_status = parsed.pointer("/status").and_then(Value::as_str);
        if api_status != Some("OK") {
            let message = parsed
                .pointer("/message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(SearchError::Api(message));
        }

        let items = parsed
            .pointer("/data")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let listings = items
            .iter()
            .map(|job| JobListing {
                job_title: text_field(job, "/job_title"),
                employer_name: text_field(job, "/employer_name"),
                job_description: truncate_description(&text_field(job, "/job_description")),
                job_apply_link: text_field(job, "/job_apply_link"),
                location: format!(
                    "{}, {}",
                    text_field(job, "/job_city"),
                    text_field(job, "/job_country")
                ),
            })
            .collect();

        Ok(listings)
    }
}

#[cfg(test)]
mod tests {
    use super::{build_search_term, truncate_description, JSearchClient};
    use crate::error::SearchError;
    use crate::models::StructuredQuery;
    use crate::traits::JobSearch;
    use httpmock::prelude::*;
    use serde_json::json;

    fn query() -> StructuredQuery {
        StructuredQuery {
            role: "Python Developer".to_string(),
            skills: vec!["Python".to_string(), "Django".to_string()],
            location: "Pune, India".to_string(),
        }
    }

    #[test]
    fn search_term_joins_role_and_location_with_plus() {
        assert_eq!(build_search_term(&query()), "Python+Developer+in+Pune,+India");
    }

    #[test]
    fn long_descriptions_truncate_to_exactly_two_hundred_chars() {
        let long = "d".repeat(500);
        let preview = truncate_description(&long);
        assert_eq!(preview.len(), 203);
        assert_eq!(&preview[..200], "d".repeat(200).as_str());
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn short_descriptions_still_get_the_ellipsis() {
        assert_eq!(truncate_description("short"), "short...");
    }

    #[tokio::test]
    async fn listings_are_shaped_from_the_api_payload() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/search")
                    .query_param("country", "in")
                    .query_param("query", "Python+Developer+in+Pune,+India")
                    .header("X-RapidAPI-Key", "key");
                then.status(200).json_body(json!({
                    "status": "OK",
                    "data": [{
                        "job_title": "Backend Engineer",
                        "employer_name": "Acme",
                        "job_description": "Build APIs",
                        "job_apply_link": "https://example.com/apply",
                        "job_city": "Pune",
                        "job_country": "IN",
                    }, {
                        "job_title": "Remote Engineer",
                        "employer_name": "Globex",
                        "job_description": "Ship features",
                        "job_apply_link": "https://example.com/remote",
                        "job_city": "",
                        "job_country": "IN",
                    }]
                }));
            })
            .await;

        let client = JSearchClient::with_endpoint(server.base_url(), "key");
        let listings = client.search(&query()).await.expect("search should succeed");

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].job_title, "Backend Engineer");
        assert_eq!(listings[0].job_description, "Build APIs...");
        assert_eq!(listings[0].location, "Pune, IN");
        // The separator is kept even when the city is missing.
        assert_eq!(listings[1].location, ", IN");
    }

    #[tokio::test]
    async fn application_level_error_status_fails_with_the_api_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(200).json_body(json!({
                    "status": "ERROR",
                    "message": "quota exceeded",
                }));
            })
            .await;

        let client = JSearchClient::with_endpoint(server.base_url(), "key");
        let error = client.search(&query()).await.expect_err("search should fail");

        match error {
            SearchError::Api(message) => assert_eq!(message, "quota exceeded"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_level_failure_carries_the_http_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/search");
                then.status(403).body("forbidden");
            })
            .await;

        let client = JSearchClient::with_endpoint(server.base_url(), "key");
        let error = client.search(&query()).await.expect_err("search should fail");

        assert!(matches!(error, SearchError::Status { status: 403, .. }));
    }
}
