//! Error kinds surfaced by the interaction flows.

use thiserror::Error;

/// Client-detected precondition failure. Never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("input text is empty")]
    EmptyText,
    #[error("annotation requires text, a main category and at least one sub-category")]
    IncompleteAnnotation,
    #[error("suggestion text is empty")]
    SuggestionTextEmpty,
    #[error("suggestion text must be at least {min} characters")]
    SuggestionTextTooShort { min: usize },
    #[error("import item {index} is incomplete")]
    IncompleteImportItem { index: usize },
}

/// Network failure, non-success HTTP status, or a response that failed typed decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("server responded with status {status}")]
    Status { status: u16, detail: Option<String> },
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("request rejected by server: {0}")]
    Rejected(String),
}

impl RequestError {
    pub fn is_status(&self) -> bool {
        matches!(self, RequestError::Status { .. })
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(status) => RequestError::Status {
                status: status.as_u16(),
                detail: None,
            },
            None if value.is_decode() => RequestError::Decode(value.to_string()),
            None => RequestError::Transport(value.to_string()),
        }
    }
}

impl From<serde_json::Error> for RequestError {
    fn from(value: serde_json::Error) -> Self {
        RequestError::Decode(value.to_string())
    }
}

/// Why a flow aborted. User-facing notifications have already been emitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Request(#[from] RequestError),
}
