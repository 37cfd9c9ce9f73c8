#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Explain: turns a word or phrase into a short explanation.
//!
//! A dictionary lookup races a deadline; when the dictionary has nothing (or is
//! too slow) the subject is searched in an encyclopedia, candidate articles are
//! scored against a list of context words, and the first sentence of the best
//! article becomes the explanation.

/// Result and candidate types.
#[path = "../model.rs"]
pub mod model;

/// Library error type.
#[path = "../error.rs"]
pub mod error;

/// Substring occurrence counting.
#[path = "../occurrences.rs"]
pub mod occurrences;

/// First-sentence heuristic over article blurbs.
#[path = "../sentence.rs"]
pub mod sentence;

/// Dictionary and encyclopedia capabilities with their HTTP backends.
#[path = "../providers/main.rs"]
pub mod providers;

/// Fetching article text and blurb for a title.
#[path = "../explorer.rs"]
pub mod explorer;

/// Context scoring and winner selection.
#[path = "../ranker.rs"]
pub mod ranker;

/// TOML configuration.
#[path = "../config.rs"]
pub mod config;

/// Structured logging for resolutions.
#[path = "../telemetry.rs"]
pub mod telemetry;

/// Resolution coordinator racing the dictionary against the deadline.
#[path = "../main.rs"]
pub mod runtime;

/// Sequential batch resolution.
#[path = "../batch.rs"]
pub mod batch;

pub use config::ExplainConfig;
pub use error::ExplainError;
pub use explorer::{explore_page, Page};
pub use model::{
    Candidate, DefinitionPayload, Expanded, ExplainResult, LookupOptions, Ranking, ResultKind,
    UNIDENTIFIED_MESSAGE,
};
pub use occurrences::occurrences;
pub use providers::{
    DictionaryProvider, Encyclopedia, ExtractScope, StaticDictionary, StaticEncyclopedia,
    WikipediaClient, WiktionaryClient,
};
pub use ranker::{rank_candidates, select_winner, RankedCandidates};
pub use runtime::Explainer;
pub use sentence::extract_sentence;
pub use telemetry::{ExplainTelemetry, ExplainTelemetryBuilder};
