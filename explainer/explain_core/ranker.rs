use crate::{
    error::ExplainError,
    explorer::{explore_page, Page},
    model::Candidate,
    occurrences::occurrences,
    providers::Encyclopedia,
    sentence::extract_sentence,
};

/// Tie-break margin used when none is configured.
pub const DEFAULT_TIE_BREAK_MARGIN: f64 = 1.5;

/// Scored candidates, best first, plus the index of the chosen one.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidates {
    /// Candidates sorted by descending relevance.
    pub candidates: Vec<Candidate>,
    /// Index of the selected candidate, `None` when there are none.
    pub winner: Option<usize>,
}

impl RankedCandidates {
    /// The selected candidate.
    #[must_use]
    pub fn top(&self) -> Option<&Candidate> {
        self.winner.and_then(|index| self.candidates.get(index))
    }

    /// The candidate to explain with: the selected one when it has a
    /// sentence, otherwise the best-ranked candidate that has one.
    #[must_use]
    pub fn explainable(&self) -> Option<&Candidate> {
        let has_sentence =
            |candidate: &&Candidate| candidate.sentence.as_deref().is_some_and(|s| !s.trim().is_empty());
        self.top()
            .filter(has_sentence)
            .or_else(|| self.candidates.iter().find(has_sentence))
    }
}

/// Density of whole-word context matches in `content`, in percent of its
/// character length.
///
/// Each word is trimmed, lowercased, and padded with one space on each side,
/// so it only counts where it stands alone between spaces.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn relatedness(content: &str, context: &[String]) -> f64 {
    let length = content.chars().count();
    if length == 0 {
        return 0.0;
    }
    let lowered = content.to_lowercase();
    let hits: usize = context
        .iter()
        .map(|word| {
            let padded = format!(" {} ", word.trim().to_lowercase());
            occurrences(&lowered, &padded, false)
        })
        .sum();
    hits as f64 / length as f64 * 100.0
}

/// Turns an explored page into a candidate.
///
/// Pages lacking either extract keep a zero score and use the blurb (if any)
/// as their sentence.
#[must_use]
pub fn score_page(page: Page, context: &[String]) -> Candidate {
    let Page {
        title,
        content,
        blurb,
    } = page;
    let (sentence, related) = match (content.as_deref(), blurb.as_deref()) {
        (Some(text), Some(intro)) if !text.is_empty() && !intro.is_empty() => {
            (Some(extract_sentence(intro)), relatedness(text, context))
        }
        _ => (blurb.clone(), 0.0),
    };
    Candidate {
        title,
        content,
        blurb,
        sentence,
        related,
    }
}

/// Picks the candidate to explain with from a list sorted best first.
///
/// When the runner-up scores within `margin` of the leader (leader below
/// `margin` times the runner-up), the candidate titled `first_title` wins
/// instead. With fewer than two candidates no tie-break happens.
#[must_use]
pub fn select_winner(candidates: &[Candidate], first_title: Option<&str>, margin: f64) -> Option<usize> {
    match candidates {
        [] => None,
        [top, second, ..] if top.related < second.related * margin => first_title
            .and_then(|title| candidates.iter().position(|c| c.title == title))
            .or(Some(0)),
        _ => Some(0),
    }
}

/// Explores each title in order, scores it against `context`, sorts the
/// results by descending score, and selects a winner.
pub async fn rank_candidates(
    encyclopedia: &dyn Encyclopedia,
    titles: &[String],
    context: &[String],
    margin: f64,
) -> Result<RankedCandidates, ExplainError> {
    let mut candidates = Vec::with_capacity(titles.len());
    for title in titles {
        let page = explore_page(encyclopedia, title).await?;
        candidates.push(score_page(page, context));
    }
    candidates.sort_by(|a, b| b.related.total_cmp(&a.related));
    let winner = select_winner(&candidates, titles.first().map(String::as_str), margin);
    Ok(RankedCandidates { candidates, winner })
}
