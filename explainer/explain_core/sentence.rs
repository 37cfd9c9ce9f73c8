use std::sync::OnceLock;

use regex::Regex;

fn sentence_end() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:.|\n)*?[A-Za-z0-9][A-Za-z0-9]\. [A-Za-z0-9]")
            .expect("sentence pattern is valid")
    })
}

/// Pulls the first sentence out of an article blurb.
///
/// The sentence ends at the first `". "` that follows two alphanumerics and is
/// followed by an alphanumeric. The match is cut two characters short, which
/// keeps the period and drops the space and the next sentence's first letter.
/// Without such a boundary the text before the first `". "` is used, and a
/// blurb without any `". "` is returned whole.
#[must_use]
pub fn extract_sentence(blurb: &str) -> String {
    if let Some(found) = sentence_end().find(blurb) {
        let matched = found.as_str();
        // The last two characters are ASCII by construction of the pattern.
        return matched[..matched.len() - 2].to_string();
    }
    blurb
        .find(". ")
        .map_or_else(|| blurb.to_string(), |end| blurb[..end].to_string())
}
