use std::{fmt, path::PathBuf, sync::Arc};

use anyhow::Result;
use serde_json::Value;
use shared_logging::{JsonFileSink, LogLevel, LogSink, Logger};

/// Builder configuring telemetry for resolutions.
pub struct ExplainTelemetryBuilder {
    target: String,
    min_level: LogLevel,
    log_path: Option<PathBuf>,
    sink: Option<Arc<dyn LogSink>>,
}

impl ExplainTelemetryBuilder {
    /// Creates a builder logging under `target` at `INFO` and above.
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            min_level: LogLevel::Info,
            log_path: None,
            sink: None,
        }
    }

    /// Lowest level that gets written.
    #[must_use]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Writes JSON lines to `path`.
    #[must_use]
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Writes to a custom sink; takes precedence over `log_path`.
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Finalizes the builder, opening the log file if one was configured.
    pub fn build(self) -> Result<ExplainTelemetry> {
        let sink = match (self.sink, self.log_path) {
            (Some(sink), _) => Some(sink),
            (None, Some(path)) => Some(Arc::new(JsonFileSink::open(path)?) as Arc<dyn LogSink>),
            (None, None) => None,
        };
        Ok(ExplainTelemetry {
            logger: sink.map(|sink| Logger::new(self.target, self.min_level, sink)),
        })
    }
}

/// Logging handle shared by a resolver; a no-op without a sink.
#[derive(Clone, Default)]
pub struct ExplainTelemetry {
    logger: Option<Logger>,
}

impl fmt::Debug for ExplainTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExplainTelemetry")
            .field("logger", &self.logger)
            .finish()
    }
}

impl ExplainTelemetry {
    /// Returns a builder.
    #[must_use]
    pub fn builder(target: impl Into<String>) -> ExplainTelemetryBuilder {
        ExplainTelemetryBuilder::new(target)
    }

    /// Telemetry that drops everything.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { logger: None }
    }

    /// Writes a structured record. Sink failures are reported on stderr and
    /// never reach the caller.
    pub fn log(&self, level: LogLevel, event: &str, fields: Value) {
        if let Some(logger) = &self.logger {
            if let Err(err) = logger.log(level, event, fields) {
                eprintln!("explain telemetry write failed: {err:#}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared_logging::MemorySink;
    use tempfile::tempdir;

    #[test]
    fn writes_to_file_sink() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("explain.log");
        let telemetry = ExplainTelemetry::builder("explain")
            .log_path(&path)
            .build()
            .unwrap();
        telemetry.log(LogLevel::Info, "explain.test", json!({ "subject": "cat" }));
        telemetry.log(LogLevel::Debug, "explain.hidden", json!({}));
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("explain.test"));
        assert!(!content.contains("explain.hidden"));
    }

    #[test]
    fn custom_sink_and_level() {
        let sink = MemorySink::new();
        let telemetry = ExplainTelemetry::builder("explain")
            .min_level(LogLevel::Debug)
            .sink(Arc::new(sink.clone()))
            .build()
            .unwrap();
        telemetry.log(LogLevel::Debug, "explain.debug", json!({}));
        assert_eq!(sink.events(), vec!["explain.debug".to_string()]);
    }

    #[test]
    fn disabled_telemetry_is_silent() {
        ExplainTelemetry::disabled().log(LogLevel::Error, "explain.none", json!({}));
    }
}
