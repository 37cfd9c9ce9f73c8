use thiserror::Error;

/// Failures talking to the dictionary or the encyclopedia.
///
/// Subjects that simply cannot be identified are not errors; they come back
/// as [`crate::ExplainResult`]s of kind `error`.
#[derive(Debug, Error)]
pub enum ExplainError {
    /// Request could not be sent or its body could not be read.
    #[error("http request to {service} failed: {source}")]
    Http {
        /// Service that was called.
        service: &'static str,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// Service answered with a non-success status.
    #[error("{service} answered with status {status}")]
    Status {
        /// Service that was called.
        service: &'static str,
        /// HTTP status code.
        status: u16,
    },
    /// Response body did not have the expected shape.
    #[error("malformed {service} response: {detail}")]
    Malformed {
        /// Service that was called.
        service: &'static str,
        /// What was wrong with it.
        detail: String,
    },
    /// Dictionary provider reported a failure.
    #[error("dictionary lookup failed: {0}")]
    Dictionary(String),
}

impl ExplainError {
    pub(crate) fn malformed(service: &'static str, detail: impl Into<String>) -> Self {
        Self::Malformed {
            service,
            detail: detail.into(),
        }
    }
}
