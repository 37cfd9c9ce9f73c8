use std::{sync::OnceLock, time::Duration};

use async_trait::async_trait;
use regex::Regex;
use reqwest::{header::USER_AGENT, Client, RequestBuilder, StatusCode, Url};
use serde_json::Value;

use super::DictionaryProvider;
use crate::{
    config::ExplainConfig,
    error::ExplainError,
    model::{DefinitionPayload, LookupOptions},
};

const SERVICE: &str = "wiktionary";

fn markup() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("markup pattern is valid"))
}

/// Dictionary backed by the Wiktionary REST definition endpoint.
#[derive(Debug, Clone)]
pub struct WiktionaryClient {
    client: Client,
    endpoint: Url,
    user_agent: String,
}

impl WiktionaryClient {
    /// Builds a client for the configured endpoint and `User-Agent`.
    pub fn new(config: &ExplainConfig) -> Result<Self, ExplainError> {
        let endpoint = Url::parse(&config.dictionary_endpoint)
            .map_err(|err| ExplainError::malformed(SERVICE, format!("endpoint: {err}")))?;
        if endpoint.cannot_be_a_base() {
            return Err(ExplainError::malformed(SERVICE, "endpoint cannot be a base url"));
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|source| ExplainError::Http {
                service: SERVICE,
                source,
            })?;
        Ok(Self {
            client,
            endpoint,
            user_agent: config.user_agent.clone(),
        })
    }

    fn definition_url(&self, term: &str) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["page", "definition", term]);
        }
        url
    }

    fn request(&self, term: &str) -> RequestBuilder {
        self.client
            .get(self.definition_url(term))
            .header(USER_AGENT, &self.user_agent)
    }

    async fn fetch(&self, term: &str) -> Result<Option<Value>, ExplainError> {
        let response = self
            .request(term)
            .send()
            .await
            .map_err(|source| ExplainError::Http {
                service: SERVICE,
                source,
            })?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
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
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|err| ExplainError::malformed(SERVICE, err.to_string()))
    }
}

#[async_trait]
impl DictionaryProvider for WiktionaryClient {
    async fn lookup(
        &self,
        term: &str,
        language: &str,
        options: &LookupOptions,
    ) -> Result<DefinitionPayload, ExplainError> {
        let mut payload = self.fetch(term).await?;
        let lowered = term.to_lowercase();
        if payload.is_none() && !options.exact && lowered != term {
            payload = self.fetch(&lowered).await?;
        }
        Ok(payload.map_or_else(
            || DefinitionPayload::not_found(term),
            |value| parse_definition(term, &value, language, options.formatted),
        ))
    }
}

/// First non-empty definition for `language` in a REST definition response.
pub fn parse_definition(
    term: &str,
    payload: &Value,
    language: &str,
    formatted: bool,
) -> DefinitionPayload {
    let sections = payload.get(language).and_then(Value::as_array);
    for section in sections.into_iter().flatten() {
        let definitions = section.get("definitions").and_then(Value::as_array);
        for entry in definitions.into_iter().flatten() {
            let Some(raw) = entry.get("definition").and_then(Value::as_str) else {
                continue;
            };
            let text = if formatted {
                raw.trim().to_string()
            } else {
                markup().replace_all(raw, "").trim().to_string()
            };
            if text.is_empty() {
                continue;
            }
            return DefinitionPayload {
                word: term.to_string(),
                category: section
                    .get("partOfSpeech")
                    .and_then(Value::as_str)
                    .map(str::to_lowercase),
                definition: Some(text),
                err: None,
            };
        }
    }
    DefinitionPayload::not_found(term)
}
