#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! JSON-lines logging shared by the explain crates.
//!
//! Records are written through a [`LogSink`]. [`JsonFileSink`] appends one JSON
//! object per line to a file; [`MemorySink`] keeps records around for tests and
//! for callers that want to inspect what a resolution did.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Log severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Step-by-step detail.
    Debug,
    /// Normal lifecycle events.
    Info,
    /// Recoverable trouble.
    Warn,
    /// Failures surfaced to the caller.
    Error,
}

impl LogLevel {
    /// Parses a level name, case-insensitively.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// A single structured log line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// When the record was created.
    pub timestamp: DateTime<Utc>,
    /// Component that emitted the record.
    pub target: String,
    /// Severity.
    pub level: LogLevel,
    /// Dotted event name, e.g. `explain.resolve.start`.
    pub event: String,
    /// Event fields.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl LogRecord {
    /// Creates a record without fields.
    #[must_use]
    pub fn new(target: impl Into<String>, level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            target: target.into(),
            level,
            event: event.into(),
            fields: serde_json::Map::new(),
        }
    }

    /// Copies the entries of a JSON object into the record's fields.
    /// Non-object values are stored under `value`.
    #[must_use]
    pub fn with_fields(mut self, fields: serde_json::Value) -> Self {
        match fields {
            serde_json::Value::Object(map) => self.fields.extend(map),
            serde_json::Value::Null => {}
            other => {
                self.fields.insert("value".into(), other);
            }
        }
        self
    }
}

/// Destination for log records.
pub trait LogSink: Send + Sync {
    /// Persists one record.
    fn write(&self, record: &LogRecord) -> Result<()>;
}

/// Appends records as JSON lines to a file.
#[derive(Debug)]
pub struct JsonFileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonFileSink {
    /// Opens (or creates) the file, creating parent directories as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    /// Location of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for JsonFileSink {
    fn write(&self, record: &LogRecord) -> Result<()> {
        let line = serde_json::to_vec(record)?;
        let mut file = self.file.lock();
        file.write_all(&line)?;
        file.write_all(b"\n")?;
        file.flush()?;
        Ok(())
    }
}

/// Keeps records in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every record written so far.
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Event names in write order.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.records.lock().iter().map(|r| r.event.clone()).collect()
    }
}

impl LogSink for MemorySink {
    fn write(&self, record: &LogRecord) -> Result<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

/// Level-filtering front end over a sink.
#[derive(Clone)]
pub struct Logger {
    target: String,
    min_level: LogLevel,
    sink: Arc<dyn LogSink>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("target", &self.target)
            .field("min_level", &self.min_level)
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Creates a logger for `target` writing to `sink`.
    #[must_use]
    pub fn new(target: impl Into<String>, min_level: LogLevel, sink: Arc<dyn LogSink>) -> Self {
        Self {
            target: target.into(),
            min_level,
            sink,
        }
    }

    /// Whether records at `level` pass the filter.
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Writes an event with fields when the level passes the filter.
    pub fn log(&self, level: LogLevel, event: &str, fields: serde_json::Value) -> Result<()> {
        if !self.enabled(level) {
            return Ok(());
        }
        let record = LogRecord::new(&self.target, level, event).with_fields(fields);
        self.sink.write(&record)
    }
}
