use thiserror::Error;

use crate::domain::content_signature::ContentErrorKind;

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("{}", .0.message())]
    ContentSignature(ContentErrorKind),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("{0}")]
    Unclassified(String),
}

impl ReaderError {
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ReaderError::ContentSignature(_) | ReaderError::Transport(_)
        )
    }
}

impl From<reqwest::Error> for ReaderError {
    fn from(err: reqwest::Error) -> Self {
        ReaderError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ReaderError {
    fn from(err: serde_json::Error) -> Self {
        ReaderError::Unclassified(err.to_string())
    }
}
