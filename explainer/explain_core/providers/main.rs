//! External knowledge sources.

use async_trait::async_trait;

use crate::{
    error::ExplainError,
    model::{DefinitionPayload, LookupOptions},
};

/// In-memory providers for tests and offline use.
pub mod fixtures;
/// Wikipedia-backed encyclopedia.
pub mod wikipedia;
/// Wiktionary-backed dictionary.
pub mod wiktionary;

pub use fixtures::{StaticDictionary, StaticEncyclopedia};
pub use wikipedia::WikipediaClient;
pub use wiktionary::WiktionaryClient;

/// Looks up short definitions of terms.
#[async_trait]
pub trait DictionaryProvider: Send + Sync {
    /// Looks `term` up in `language`. A term without a definition is a
    /// payload with `definition: None`, not an error.
    async fn lookup(
        &self,
        term: &str,
        language: &str,
        options: &LookupOptions,
    ) -> Result<DefinitionPayload, ExplainError>;
}

/// Which part of an article to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractScope {
    /// Whole article as plain text.
    Full,
    /// Introduction only.
    Intro,
}

/// Encyclopedia search and article extraction.
#[async_trait]
pub trait Encyclopedia: Send + Sync {
    /// Titles matching `subject`, best first, at most `limit`.
    async fn search(&self, subject: &str, limit: usize) -> Result<Vec<String>, ExplainError>;

    /// Plain-text extract of the article at `title`, following redirects.
    /// `None` when no page matches.
    async fn extract(
        &self,
        title: &str,
        scope: ExtractScope,
    ) -> Result<Option<String>, ExplainError>;
}
