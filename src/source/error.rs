use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureCause {
    #[error("network error: {0}")]
    Network(String),

    #[error("non-success status {0}")]
    Status(u16),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// A single source call that did not succeed, tagged with the offending source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("source '{source_id}' failed: {cause}")]
pub struct SourceFailure {
    pub source_id: String,
    pub cause: FailureCause,
}

impl SourceFailure {
    pub fn new(source_id: &str, cause: FailureCause) -> Self {
        Self {
            source_id: source_id.to_string(),
            cause,
        }
    }
}
