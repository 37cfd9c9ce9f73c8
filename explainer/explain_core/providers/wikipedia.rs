use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::USER_AGENT, Client, RequestBuilder};
use serde_json::Value;

use super::{Encyclopedia, ExtractScope};
use crate::{config::ExplainConfig, error::ExplainError};

const SERVICE: &str = "wikipedia";

/// MediaWiki action API client.
#[derive(Debug, Clone)]
pub struct WikipediaClient {
    client: Client,
    endpoint: String,
    user_agent: String,
}

impl WikipediaClient {
    /// Builds a client for the configured endpoint and `User-Agent`.
    pub fn new(config: &ExplainConfig) -> Result<Self, ExplainError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|source| ExplainError::Http {
                service: SERVICE,
                source,
            })?;
        Ok(Self {
            client,
            endpoint: config.encyclopedia_endpoint.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    fn request(&self, query: &[(&'static str, String)]) -> RequestBuilder {
        self.client
            .get(&self.endpoint)
            .header(USER_AGENT, &self.user_agent)
            .query(query)
    }

    async fn get_json(&self, query: &[(&'static str, String)]) -> Result<Value, ExplainError> {
        let response = self
            .request(query)
            .send()
            .await
            .map_err(|source| ExplainError::Http {
                service: SERVICE,
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExplainError::Status {
                service: SERVICE,
                status: status.as_u16(),
            });
        }
        let body = response.text().await.map_err(|source| ExplainError::Http {
            service: SERVICE,
            source,
        })?;
        serde_json::from_str(&body).map_err(|err| ExplainError::malformed(SERVICE, err.to_string()))
    }
}

/// Query for an `opensearch` title search.
fn search_query(subject: &str, limit: usize) -> Vec<(&'static str, String)> {
    vec![
        ("action", "opensearch".into()),
        ("limit", limit.to_string()),
        ("search", subject.into()),
        ("profile", "fuzzy".into()),
        ("format", "json".into()),
    ]
}

/// Query for a plain-text extract; `Intro` stops at the first section.
fn extract_query(title: &str, scope: ExtractScope) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("format", "json".into()),
        ("action", "query".into()),
        ("prop", "extracts".into()),
        ("explaintext", String::new()),
        ("redirects", "1".into()),
        ("titles", title.into()),
    ];
    if scope == ExtractScope::Intro {
        query.push(("exintro", String::new()));
    }
    query
}

#[async_trait]
impl Encyclopedia for WikipediaClient {
    async fn search(&self, subject: &str, limit: usize) -> Result<Vec<String>, ExplainError> {
        let payload = self.get_json(&search_query(subject, limit)).await?;
        parse_search_titles(&payload)
    }

    async fn extract(
        &self,
        title: &str,
        scope: ExtractScope,
    ) -> Result<Option<String>, ExplainError> {
        let payload = self.get_json(&extract_query(title, scope)).await?;
        parse_extract(&payload)
    }
}

/// Titles from an `opensearch` response: `[query, [titles...], ...]`.
pub fn parse_search_titles(payload: &Value) -> Result<Vec<String>, ExplainError> {
    let titles = payload
        .get(1)
        .and_then(Value::as_array)
        .ok_or_else(|| ExplainError::malformed(SERVICE, "opensearch result has no title list"))?;
    titles
        .iter()
        .map(|title| {
            title
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| ExplainError::malformed(SERVICE, "non-string title"))
        })
        .collect()
}

/// Extract of the first page in a `query` response; empty extracts count as
/// missing.
pub fn parse_extract(payload: &Value) -> Result<Option<String>, ExplainError> {
    let pages = payload
        .get("query")
        .and_then(|query| query.get("pages"))
        .and_then(Value::as_object)
        .ok_or_else(|| ExplainError::malformed(SERVICE, "query result has no pages"))?;
    Ok(pages
        .values()
        .next()
        .and_then(|page| page.get("extract"))
        .and_then(Value::as_str)
        .filter(|extract| !extract.is_empty())
        .map(str::to_string))
}
