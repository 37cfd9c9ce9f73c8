use serde::{Deserialize, Serialize};

use crate::{
    error::ExplainError,
    providers::{Encyclopedia, ExtractScope},
};

/// Article text fetched for one title.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page {
    /// Title the page was requested under.
    pub title: String,
    /// Full plain-text article.
    pub content: Option<String>,
    /// Introductory extract.
    pub blurb: Option<String>,
}

/// Fetches the full text and the intro of `title` concurrently.
///
/// A title with no matching article yields a page with both fields empty;
/// only transport failures are errors.
pub async fn explore_page(
    encyclopedia: &dyn Encyclopedia,
    title: &str,
) -> Result<Page, ExplainError> {
    let (content, blurb) = tokio::try_join!(
        encyclopedia.extract(title, ExtractScope::Full),
        encyclopedia.extract(title, ExtractScope::Intro),
    )?;
    Ok(Page {
        title: title.to_string(),
        content,
        blurb,
    })
}
