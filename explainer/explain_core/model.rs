use serde::{Deserialize, Serialize};

/// Message carried by results for subjects nothing could be found for.
pub const UNIDENTIFIED_MESSAGE: &str = "Could not identify this subject.";

/// Confidence reported for every successful explanation.
pub const SUCCESS_CONFIDENCE: f64 = 0.5;

/// Which source produced an explanation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    /// Dictionary definition.
    Definition,
    /// First sentence of an encyclopedia article.
    Wikipedia,
    /// Nothing matched the subject.
    Error,
}

/// Payload returned by a dictionary provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DefinitionPayload {
    /// Term that was looked up.
    pub word: String,
    /// Part of speech, when the provider reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Definition text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    /// Provider-side failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<String>,
}

impl DefinitionPayload {
    /// Payload for a term the provider knows nothing about.
    #[must_use]
    pub fn not_found(word: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            err: Some("not found".into()),
            ..Self::default()
        }
    }

    /// The definition text, if present and non-blank.
    #[must_use]
    pub fn usable_definition(&self) -> Option<&str> {
        self.definition
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

/// Options forwarded to the dictionary provider.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LookupOptions {
    /// Only accept the term exactly as written (no lowercase retry).
    #[serde(default)]
    pub exact: bool,
    /// Keep the provider's markup instead of returning plain text.
    #[serde(default)]
    pub formatted: bool,
}

/// An encyclopedia article considered for an explanation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    /// Article title as returned by search.
    pub title: String,
    /// Full plain-text article.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Introductory extract.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blurb: Option<String>,
    /// Explanatory snippet taken from the blurb.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentence: Option<String>,
    /// Context-word density, in percent of content length.
    #[serde(default)]
    pub related: f64,
}

/// Title and score of a ranked candidate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ranking {
    /// Article title.
    pub title: String,
    /// Relevance score.
    pub related: f64,
}

impl From<&Candidate> for Ranking {
    fn from(candidate: &Candidate) -> Self {
        Self {
            title: candidate.title.clone(),
            related: candidate.related,
        }
    }
}

/// Detail payload attached to a result; its shape follows the result kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Expanded {
    /// Encyclopedia fallback details.
    Wikipedia {
        /// Selected article.
        #[serde(rename = "topResult")]
        top_result: Candidate,
        /// Every explored article, best first.
        #[serde(rename = "allResults")]
        all_results: Vec<Candidate>,
        /// Subject that was searched.
        search: String,
        /// Title and score per article, best first.
        rankings: Vec<Ranking>,
    },
    /// Raw dictionary payload.
    Definition(DefinitionPayload),
    /// Error message.
    Error {
        /// Same text as the result value.
        value: String,
    },
}

/// Normalized answer for one subject.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExplainResult {
    /// Source of the explanation.
    #[serde(rename = "type")]
    pub kind: ResultKind,
    /// The explanation itself.
    pub value: String,
    /// 0.5 for explanations, 0 for errors.
    pub confidence: f64,
    /// Subject as given by the caller.
    pub input: String,
    /// Source-specific details.
    pub expanded: Expanded,
}

impl ExplainResult {
    /// Result built from a dictionary payload carrying `definition`.
    #[must_use]
    pub fn definition(input: &str, definition: &str, payload: DefinitionPayload) -> Self {
        Self {
            kind: ResultKind::Definition,
            value: definition.to_string(),
            confidence: SUCCESS_CONFIDENCE,
            input: input.to_string(),
            expanded: Expanded::Definition(payload),
        }
    }

    /// Result built from the chosen encyclopedia article.
    #[must_use]
    pub fn wikipedia(
        input: &str,
        sentence: String,
        top_result: Candidate,
        all_results: Vec<Candidate>,
    ) -> Self {
        let rankings = all_results.iter().map(Ranking::from).collect();
        Self {
            kind: ResultKind::Wikipedia,
            value: sentence,
            confidence: SUCCESS_CONFIDENCE,
            input: input.to_string(),
            expanded: Expanded::Wikipedia {
                top_result,
                all_results,
                search: input.to_string(),
                rankings,
            },
        }
    }

    /// Result for a subject that could not be identified.
    #[must_use]
    pub fn unidentified(input: &str) -> Self {
        Self {
            kind: ResultKind::Error,
            value: UNIDENTIFIED_MESSAGE.to_string(),
            confidence: 0.0,
            input: input.to_string(),
            expanded: Expanded::Error {
                value: UNIDENTIFIED_MESSAGE.to_string(),
            },
        }
    }

    /// Rankings of the fallback pipeline, empty for other kinds.
    #[must_use]
    pub fn rankings(&self) -> &[Ranking] {
        match &self.expanded {
            Expanded::Wikipedia { rankings, .. } => rankings,
            _ => &[],
        }
    }
}
