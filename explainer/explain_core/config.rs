use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::ranker::DEFAULT_TIE_BREAK_MARGIN;

/// `User-Agent` sent to both knowledge services unless configured otherwise.
pub const DEFAULT_USER_AGENT: &str =
    "Explain-This/0.0 (https://yodacode.xyz/; yoda@yodacode.xyz) explain-this/0.0";

/// Settings for resolutions and the HTTP providers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExplainConfig {
    /// How long the dictionary may take before the encyclopedia is used.
    pub deadline_ms: u64,
    /// Maximum number of encyclopedia titles considered.
    pub search_limit: usize,
    /// Leader/runner-up score ratio below which the first search title wins.
    pub tie_break_margin: f64,
    /// Dictionary language code.
    pub language: String,
    /// `User-Agent` header for every request.
    pub user_agent: String,
    /// MediaWiki action API endpoint.
    pub encyclopedia_endpoint: String,
    /// Wiktionary REST base URL.
    pub dictionary_endpoint: String,
    /// Per-request HTTP timeout.
    pub request_timeout_ms: u64,
    /// JSON-lines log destination; logging is off when unset.
    pub log_path: Option<PathBuf>,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            deadline_ms: 5000,
            search_limit: 3,
            tie_break_margin: DEFAULT_TIE_BREAK_MARGIN,
            language: "en".into(),
            user_agent: DEFAULT_USER_AGENT.into(),
            encyclopedia_endpoint: "https://en.wikipedia.org/w/api.php".into(),
            dictionary_endpoint: "https://en.wiktionary.org/api/rest_v1".into(),
            request_timeout_ms: 10_000,
            log_path: None,
        }
    }
}

impl ExplainConfig {
    /// Loads and validates a TOML file. Missing keys take their defaults and
    /// a relative `log_path` is resolved against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading explain config {}", path.display()))?;
        let mut config = Self::from_toml(&raw).with_context(|| format!("parsing {}", path.display()))?;
        if let Some(log_path) = config.log_path.as_mut() {
            if log_path.is_relative() {
                let base = path.parent().unwrap_or_else(|| Path::new("."));
                *log_path = base.join(&*log_path);
            }
        }
        Ok(config)
    }

    /// Parses and validates TOML text.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings a resolution cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.deadline_ms == 0 {
            bail!("deadline_ms must be positive");
        }
        if self.search_limit == 0 {
            bail!("search_limit must be positive");
        }
        if self.tie_break_margin.is_nan() || self.tie_break_margin < 1.0 {
            bail!("tie_break_margin must be at least 1.0");
        }
        if self.language.trim().is_empty() {
            bail!("language must not be empty");
        }
        if self.user_agent.trim().is_empty() {
            bail!("user_agent must not be empty");
        }
        Ok(())
    }

    /// Dictionary deadline as a duration.
    #[must_use]
    pub const fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}
