//! Resolution coordinator.
//!
//! A resolution races the dictionary against a deadline. A usable definition
//! that arrives first settles the result. An empty answer, a failed lookup, or
//! the deadline hands the subject to the encyclopedia fallback, and a lookup
//! still in flight at that point is dropped.

use std::sync::Arc;

use serde_json::json;
use shared_logging::LogLevel;
use tokio::time::sleep;
use uuid::Uuid;

use crate::{
    config::ExplainConfig,
    error::ExplainError,
    model::{DefinitionPayload, ExplainResult, LookupOptions},
    providers::{DictionaryProvider, Encyclopedia, WikipediaClient, WiktionaryClient},
    ranker::rank_candidates,
    telemetry::ExplainTelemetry,
};

/// How the dictionary side of the race ended.
#[derive(Debug)]
enum RaceOutcome {
    Definition(DefinitionPayload),
    NoDefinition,
    DeadlineElapsed,
}

/// Explains subjects using a dictionary and an encyclopedia.
#[derive(Clone)]
pub struct Explainer {
    dictionary: Arc<dyn DictionaryProvider>,
    encyclopedia: Arc<dyn Encyclopedia>,
    config: ExplainConfig,
    options: LookupOptions,
    telemetry: ExplainTelemetry,
}

impl std::fmt::Debug for Explainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Explainer")
            .field("config", &self.config)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Explainer {
    /// Creates an explainer over the given providers.
    #[must_use]
    pub fn new(
        dictionary: Arc<dyn DictionaryProvider>,
        encyclopedia: Arc<dyn Encyclopedia>,
        config: ExplainConfig,
    ) -> Self {
        Self {
            dictionary,
            encyclopedia,
            config,
            options: LookupOptions::default(),
            telemetry: ExplainTelemetry::disabled(),
        }
    }

    /// Creates an explainer backed by Wiktionary and Wikipedia.
    pub fn from_config(config: ExplainConfig) -> Result<Self, ExplainError> {
        let dictionary = Arc::new(WiktionaryClient::new(&config)?);
        let encyclopedia = Arc::new(WikipediaClient::new(&config)?);
        Ok(Self::new(dictionary, encyclopedia, config))
    }

    /// Attaches telemetry.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: ExplainTelemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Overrides the options passed to the dictionary.
    #[must_use]
    pub fn with_lookup_options(mut self, options: LookupOptions) -> Self {
        self.options = options;
        self
    }

    pub(crate) const fn telemetry(&self) -> &ExplainTelemetry {
        &self.telemetry
    }

    /// Explains `subject`, scoring encyclopedia candidates against `context`.
    ///
    /// Subjects nobody recognises come back as an `error` result. Encyclopedia
    /// transport failures are returned as `Err`.
    pub async fn explain(
        &self,
        subject: &str,
        context: &[String],
    ) -> Result<ExplainResult, ExplainError> {
        let resolution = Uuid::new_v4();
        self.telemetry.log(
            LogLevel::Info,
            "explain.resolve.start",
            json!({ "resolution": resolution, "subject": subject, "context": context }),
        );

        match self.race_dictionary(subject, resolution).await {
            RaceOutcome::Definition(payload) => {
                let text = payload.usable_definition().unwrap_or_default().to_string();
                self.telemetry.log(
                    LogLevel::Info,
                    "explain.dictionary.won",
                    json!({ "resolution": resolution, "subject": subject }),
                );
                Ok(ExplainResult::definition(subject, &text, payload))
            }
            RaceOutcome::NoDefinition => self.fallback(subject, context, resolution).await,
            RaceOutcome::DeadlineElapsed => {
                self.telemetry.log(
                    LogLevel::Info,
                    "explain.deadline.elapsed",
                    json!({ "resolution": resolution, "deadline_ms": self.config.deadline_ms }),
                );
                self.fallback(subject, context, resolution).await
            }
        }
    }

    async fn race_dictionary(&self, subject: &str, resolution: Uuid) -> RaceOutcome {
        let lookup = self
            .dictionary
            .lookup(subject, &self.config.language, &self.options);
        tokio::select! {
            biased;
            answer = lookup => match answer {
                Ok(payload) if payload.usable_definition().is_some() => {
                    RaceOutcome::Definition(payload)
                }
                Ok(_) => {
                    self.telemetry.log(
                        LogLevel::Debug,
                        "explain.dictionary.empty",
                        json!({ "resolution": resolution, "subject": subject }),
                    );
                    RaceOutcome::NoDefinition
                }
                Err(err) => {
                    self.telemetry.log(
                        LogLevel::Warn,
                        "explain.dictionary.failed",
                        json!({ "resolution": resolution, "error": err.to_string() }),
                    );
                    RaceOutcome::NoDefinition
                }
            },
            () = sleep(self.config.deadline()) => RaceOutcome::DeadlineElapsed,
        }
    }

    async fn fallback(
        &self,
        subject: &str,
        context: &[String],
        resolution: Uuid,
    ) -> Result<ExplainResult, ExplainError> {
        let mut titles = self
            .encyclopedia
            .search(subject, self.config.search_limit)
            .await?;
        titles.truncate(self.config.search_limit);
        if titles.is_empty() {
            return Ok(self.unidentified(subject, resolution));
        }

        let ranked = rank_candidates(
            self.encyclopedia.as_ref(),
            &titles,
            context,
            self.config.tie_break_margin,
        )
        .await?;
        let Some(top) = ranked.explainable().cloned() else {
            return Ok(self.unidentified(subject, resolution));
        };
        let sentence = top.sentence.clone().unwrap_or_default();

        self.telemetry.log(
            LogLevel::Info,
            "explain.fallback.ranked",
            json!({
                "resolution": resolution,
                "subject": subject,
                "winner": top.title,
                "rankings": ranked
                    .candidates
                    .iter()
                    .map(|c| json!({ "title": c.title, "related": c.related }))
                    .collect::<Vec<_>>(),
            }),
        );
        Ok(ExplainResult::wikipedia(subject, sentence, top, ranked.candidates))
    }

    fn unidentified(&self, subject: &str, resolution: Uuid) -> ExplainResult {
        self.telemetry.log(
            LogLevel::Info,
            "explain.fallback.unidentified",
            json!({ "resolution": resolution, "subject": subject }),
        );
        ExplainResult::unidentified(subject)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        model::{Expanded, ResultKind, UNIDENTIFIED_MESSAGE},
        providers::{StaticDictionary, StaticEncyclopedia},
    };
    use shared_logging::MemorySink;
    use tokio::time::Instant;

    fn photosynthesis_encyclopedia() -> StaticEncyclopedia {
        StaticEncyclopedia::new()
            .with_search("photosynthesis", ["Photosynthesis", "Chlorophyll", "Plant"])
            .with_page(
                "Photosynthesis",
                "Photosynthesis turns light into energy in a plant using chlorophyll and light . ",
                "Photosynthesis is a biological process. It converts light.",
            )
            .with_page(
                "Chlorophyll",
                "Chlorophyll is a green pigment that absorbs light in every leaf. ",
                "Chlorophyll is a green pigment. It absorbs light.",
            )
            .with_page(
                "Plant",
                "Plants are living organisms of the kingdom Plantae. ",
                "Plants are eukaryotes. They photosynthesize.",
            )
    }

    fn explainer(dictionary: StaticDictionary, encyclopedia: StaticEncyclopedia) -> Explainer {
        Explainer::new(
            Arc::new(dictionary),
            Arc::new(encyclopedia),
            ExplainConfig::default(),
        )
    }

    fn context(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn definition_before_deadline_wins() {
        let encyclopedia = photosynthesis_encyclopedia();
        let explainer = explainer(
            StaticDictionary::new()
                .with_definition("cat", "A small domesticated feline.")
                .with_delay(Duration::from_millis(200)),
            encyclopedia.clone(),
        );
        let result = explainer.explain("cat", &[]).await.unwrap();
        assert_eq!(result.kind, ResultKind::Definition);
        assert_eq!(result.value, "A small domesticated feline.");
        assert_eq!(result.confidence, 0.5);
        assert_eq!(result.input, "cat");
        assert!(matches!(result.expanded, Expanded::Definition(ref p) if p.word == "cat"));
        assert!(encyclopedia.extracts().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_definition_falls_back_without_waiting() {
        let started = Instant::now();
        let explainer = explainer(StaticDictionary::new(), photosynthesis_encyclopedia());
        let result = explainer.explain("photosynthesis", &[]).await.unwrap();
        assert_eq!(result.kind, ResultKind::Wikipedia);
        assert!(started.elapsed() < Duration::from_millis(5000));
    }

    #[tokio::test(start_paused = true)]
    async fn late_definition_is_discarded() {
        let started = Instant::now();
        let sink = MemorySink::new();
        let dictionary = StaticDictionary::new()
            .with_definition("photosynthesis", "A process used by plants.")
            .with_delay(Duration::from_secs(6));
        let explainer = explainer(dictionary.clone(), photosynthesis_encyclopedia())
            .with_telemetry(
                ExplainTelemetry::builder("explain")
                    .sink(Arc::new(sink.clone()))
                    .build()
                    .unwrap(),
            );
        let result = explainer.explain("photosynthesis", &[]).await.unwrap();
        assert_eq!(result.kind, ResultKind::Wikipedia);
        assert_eq!(result.value, "Photosynthesis is a biological process.");
        assert_eq!(dictionary.lookups(), vec!["photosynthesis"]);
        let waited = started.elapsed();
        assert!(waited >= Duration::from_millis(5000));
        assert!(waited < Duration::from_secs(6));

        tokio::time::advance(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;
        assert!(!sink.events().iter().any(|e| e == "explain.dictionary.won"));
        assert_eq!(sink.events().last().map(String::as_str), Some("explain.fallback.ranked"));
    }

    #[tokio::test(start_paused = true)]
    async fn tie_break_winner_without_sentence_yields_to_ranked_sentence() {
        let encyclopedia = StaticEncyclopedia::new()
            .with_search("mars", ["Mars", "Mars (planet)", "Mars (god)"])
            .with_content_only("Mars", "Mars may refer to a planet or a god . ")
            .with_page(
                "Mars (planet)",
                "Mars is the fourth planet from the sun . ",
                "Mars is the fourth planet from the Sun. It is red.",
            )
            .with_page(
                "Mars (god)",
                "Mars was the Roman god of war and a guardian god of farms . ",
                "Mars was the Roman god of war. He guarded farms.",
            );
        let explainer = explainer(StaticDictionary::new(), encyclopedia);
        let result = explainer
            .explain("mars", &context(&["planet", "god"]))
            .await
            .unwrap();
        assert_eq!(result.kind, ResultKind::Wikipedia);
        assert_eq!(result.value, "Mars was the Roman god of war.");
        let titles: Vec<_> = result.rankings().iter().map(|r| r.title.clone()).collect();
        assert_eq!(titles, vec!["Mars (god)", "Mars (planet)", "Mars"]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_lookup_falls_back() {
        let explainer = explainer(StaticDictionary::unavailable(), photosynthesis_encyclopedia());
        let result = explainer.explain("photosynthesis", &[]).await.unwrap();
        assert_eq!(result.kind, ResultKind::Wikipedia);
    }

    #[tokio::test(start_paused = true)]
    async fn photosynthesis_rankings_are_sorted() {
        let explainer = explainer(StaticDictionary::new(), photosynthesis_encyclopedia());
        let result = explainer
            .explain("photosynthesis", &context(&["light", "plant"]))
            .await
            .unwrap();
        assert_eq!(result.kind, ResultKind::Wikipedia);
        assert_eq!(result.confidence, 0.5);
        let rankings = result.rankings();
        assert_eq!(rankings.len(), 3);
        assert!(rankings.windows(2).all(|pair| pair[0].related >= pair[1].related));
        assert_eq!(rankings[0].title, "Photosynthesis");
        match &result.expanded {
            Expanded::Wikipedia {
                top_result,
                all_results,
                search,
                ..
            } => {
                assert_eq!(top_result.title, "Photosynthesis");
                assert_eq!(all_results.len(), 3);
                assert_eq!(search, "photosynthesis");
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn close_scores_prefer_first_search_title() {
        let encyclopedia = StaticEncyclopedia::new()
            .with_search("jaguar", ["Jaguar", "Jaguar Cars"])
            .with_page(
                "Jaguar",
                "The jaguar is a big cat . ",
                "The jaguar is a large cat. It lives in the Americas.",
            )
            .with_page(
                "Jaguar Cars",
                "Jaguar makes a car and a cat logo . ",
                "Jaguar Cars is a brand. It makes cars.",
            );
        let explainer = explainer(StaticDictionary::new(), encyclopedia);
        let result = explainer.explain("jaguar", &context(&["cat", "car"])).await.unwrap();
        // "Jaguar Cars" scores higher by density but not by 1.5x.
        assert_eq!(result.rankings()[0].title, "Jaguar Cars");
        assert_eq!(result.value, "The jaguar is a large cat.");
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_subject_is_an_error_result() {
        let explainer = explainer(StaticDictionary::new(), StaticEncyclopedia::new());
        let result = explainer.explain("qwzx", &[]).await.unwrap();
        assert_eq!(result.kind, ResultKind::Error);
        assert_eq!(result.value, UNIDENTIFIED_MESSAGE);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(
            result.expanded,
            Expanded::Error {
                value: UNIDENTIFIED_MESSAGE.into()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn encyclopedia_outage_is_returned_as_err() {
        let explainer = explainer(StaticDictionary::new(), StaticEncyclopedia::unavailable());
        let err = explainer.explain("anything", &[]).await.unwrap_err();
        assert!(matches!(err, ExplainError::Status { status: 503, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn resolution_events_are_logged() {
        let sink = MemorySink::new();
        let telemetry = ExplainTelemetry::builder("explain")
            .sink(Arc::new(sink.clone()))
            .build()
            .unwrap();
        let dictionary = StaticDictionary::new()
            .with_definition("photosynthesis", "late")
            .with_delay(Duration::from_secs(10));
        let explainer =
            explainer(dictionary, photosynthesis_encyclopedia()).with_telemetry(telemetry);
        explainer.explain("photosynthesis", &[]).await.unwrap();
        assert_eq!(
            sink.events(),
            vec![
                "explain.resolve.start",
                "explain.deadline.elapsed",
                "explain.fallback.ranked"
            ]
        );
        let start = &sink.records()[0];
        assert_eq!(start.fields["subject"], "photosynthesis");
    }
}
