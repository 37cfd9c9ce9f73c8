use indexmap::IndexMap;
use serde_json::json;
use shared_logging::LogLevel;

use crate::{error::ExplainError, model::ExplainResult, runtime::Explainer};

impl Explainer {
    /// Explains every subject in turn, using the whole list as context.
    ///
    /// Subjects are resolved one at a time and `on_each` runs after each
    /// resolution, in list order. The returned map keeps the position of a
    /// subject's first occurrence; a repeated subject replaces the earlier
    /// result. The first transport failure aborts the batch.
    pub async fn explain_many_related<F>(
        &self,
        subjects: &[String],
        mut on_each: F,
    ) -> Result<IndexMap<String, ExplainResult>, ExplainError>
    where
        F: FnMut(&ExplainResult),
    {
        let mut results = IndexMap::with_capacity(subjects.len());
        for subject in subjects {
            let result = self.explain(subject, subjects).await?;
            on_each(&result);
            results.insert(subject.clone(), result);
        }
        self.telemetry().log(
            LogLevel::Info,
            "explain.batch.complete",
            json!({ "subjects": subjects.len(), "distinct": results.len() }),
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::ExplainConfig,
        model::ResultKind,
        providers::{StaticDictionary, StaticEncyclopedia},
        telemetry::ExplainTelemetry,
    };
    use shared_logging::MemorySink;

    fn subjects(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| (*w).to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn callback_runs_once_per_subject_in_order() {
        let sink = MemorySink::new();
        let explainer = Explainer::new(
            Arc::new(StaticDictionary::new().with_definition("a", "First letter.")),
            Arc::new(StaticEncyclopedia::new()),
            ExplainConfig::default(),
        )
        .with_telemetry(
            ExplainTelemetry::builder("explain")
                .sink(Arc::new(sink.clone()))
                .build()
                .unwrap(),
        );

        let list = subjects(&["a", "b"]);
        let mut seen = Vec::new();
        let results = explainer
            .explain_many_related(&list, |result| seen.push(result.input.clone()))
            .await
            .unwrap();

        assert_eq!(seen, list);
        assert_eq!(results.keys().cloned().collect::<Vec<_>>(), list);
        assert_eq!(results["a"].kind, ResultKind::Definition);
        assert_eq!(results["b"].kind, ResultKind::Error);

        let contexts: Vec<_> = sink
            .records()
            .into_iter()
            .filter(|r| r.event == "explain.resolve.start")
            .map(|r| r.fields["context"].clone())
            .collect();
        assert_eq!(contexts, vec![json!(["a", "b"]), json!(["a", "b"])]);
    }

    #[tokio::test(start_paused = true)]
    async fn later_subjects_steer_earlier_ones() {
        let encyclopedia = StaticEncyclopedia::new()
            .with_search("mercury", ["Mercury (element)", "Mercury (planet)"])
            .with_page(
                "Mercury (element)",
                "Mercury is a liquid metal . ",
                "Mercury is a chemical element. Its symbol is Hg.",
            )
            .with_page(
                "Mercury (planet)",
                "Mercury is the closest planet to the sun in the solar system . ",
                "Mercury is the smallest planet. It orbits the Sun.",
            );
        let explainer = Explainer::new(
            Arc::new(StaticDictionary::new()),
            Arc::new(encyclopedia),
            ExplainConfig::default(),
        );
        let results = explainer
            .explain_many_related(&subjects(&["mercury", "sun", "planet"]), |_| {})
            .await
            .unwrap();
        assert_eq!(results["mercury"].value, "Mercury is the smallest planet.");
    }

    #[tokio::test(start_paused = true)]
    async fn duplicates_keep_first_position() {
        let explainer = Explainer::new(
            Arc::new(
                StaticDictionary::new()
                    .with_definition("x", "Ex.")
                    .with_definition("y", "Why."),
            ),
            Arc::new(StaticEncyclopedia::new()),
            ExplainConfig::default(),
        );
        let mut calls = 0;
        let results = explainer
            .explain_many_related(&subjects(&["x", "y", "x"]), |_| calls += 1)
            .await
            .unwrap();
        assert_eq!(calls, 3);
        assert_eq!(results.len(), 2);
        assert_eq!(results.get_index(0).unwrap().0, "x");
        assert_eq!(results.get_index(1).unwrap().0, "y");
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failure_aborts_batch() {
        let explainer = Explainer::new(
            Arc::new(StaticDictionary::new()),
            Arc::new(StaticEncyclopedia::unavailable()),
            ExplainConfig::default(),
        );
        let mut calls = 0;
        let outcome = explainer
            .explain_many_related(&subjects(&["a", "b"]), |_| calls += 1)
            .await;
        assert!(outcome.is_err());
        assert_eq!(calls, 0);
    }
}
