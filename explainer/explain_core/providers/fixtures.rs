use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::sleep;

use super::{DictionaryProvider, Encyclopedia, ExtractScope};
use crate::{
    error::ExplainError,
    model::{DefinitionPayload, LookupOptions},
};

/// Dictionary answering from a fixed table, optionally after a delay.
#[derive(Debug, Clone, Default)]
pub struct StaticDictionary {
    definitions: HashMap<String, String>,
    delay: Duration,
    unavailable: bool,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl StaticDictionary {
    /// Empty dictionary: every term comes back without a definition.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dictionary whose every lookup fails.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Adds a definition.
    #[must_use]
    pub fn with_definition(mut self, term: impl Into<String>, definition: impl Into<String>) -> Self {
        self.definitions.insert(term.into(), definition.into());
        self
    }

    /// Delays every answer.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Terms looked up so far, in call order.
    #[must_use]
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().clone()
    }
}

#[async_trait]
impl DictionaryProvider for StaticDictionary {
    async fn lookup(
        &self,
        term: &str,
        _language: &str,
        _options: &LookupOptions,
    ) -> Result<DefinitionPayload, ExplainError> {
        self.lookups.lock().push(term.to_string());
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        if self.unavailable {
            return Err(ExplainError::Dictionary("dictionary offline".into()));
        }
        Ok(match self.definitions.get(term) {
            Some(text) => DefinitionPayload {
                word: term.to_string(),
                category: Some("noun".into()),
                definition: Some(text.clone()),
                err: None,
            },
            None => DefinitionPayload::not_found(term),
        })
    }
}

#[derive(Debug, Clone, Default)]
struct StaticPage {
    content: Option<String>,
    blurb: Option<String>,
}

/// Encyclopedia answering from fixed search results and pages.
#[derive(Debug, Clone, Default)]
pub struct StaticEncyclopedia {
    searches: HashMap<String, Vec<String>>,
    pages: HashMap<String, StaticPage>,
    unavailable: bool,
    extracts: Arc<Mutex<Vec<(String, ExtractScope)>>>,
}

impl StaticEncyclopedia {
    /// Encyclopedia that finds nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Encyclopedia whose every request fails with a 503.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Registers the titles returned when searching `subject`.
    #[must_use]
    pub fn with_search<I, S>(mut self, subject: impl Into<String>, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.searches
            .insert(subject.into(), titles.into_iter().map(Into::into).collect());
        self
    }

    /// Registers an article with both extracts.
    #[must_use]
    pub fn with_page(
        mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        blurb: impl Into<String>,
    ) -> Self {
        self.pages.insert(
            title.into(),
            StaticPage {
                content: Some(content.into()),
                blurb: Some(blurb.into()),
            },
        );
        self
    }

    /// Registers an article with only the full text.
    #[must_use]
    pub fn with_content_only(mut self, title: impl Into<String>, content: impl Into<String>) -> Self {
        self.pages.insert(
            title.into(),
            StaticPage {
                content: Some(content.into()),
                blurb: None,
            },
        );
        self
    }

    /// Extract requests served so far, in call order.
    #[must_use]
    pub fn extracts(&self) -> Vec<(String, ExtractScope)> {
        self.extracts.lock().clone()
    }

    fn check_available(&self) -> Result<(), ExplainError> {
        if self.unavailable {
            return Err(ExplainError::Status {
                service: "encyclopedia",
                status: 503,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Encyclopedia for StaticEncyclopedia {
    async fn search(&self, subject: &str, limit: usize) -> Result<Vec<String>, ExplainError> {
        self.check_available()?;
        Ok(self
            .searches
            .get(subject)
            .map(|titles| titles.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn extract(
        &self,
        title: &str,
        scope: ExtractScope,
    ) -> Result<Option<String>, ExplainError> {
        self.check_available()?;
        self.extracts.lock().push((title.to_string(), scope));
        let page = self.pages.get(title);
        Ok(match scope {
            ExtractScope::Full => page.and_then(|p| p.content.clone()),
            ExtractScope::Intro => page.and_then(|p| p.blurb.clone()),
        })
    }
}
