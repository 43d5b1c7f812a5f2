//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{ImageRefError, ParseLabelError, QuestionError};
use quiz_core::session::SessionError;

/// Errors emitted while fetching and decoding the question bank.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionSourceError {
    #[error("failed to read question file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("question fetch failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("question data failed to decode")]
    Decode(#[from] serde_json::Error),

    #[error("question {index} is invalid")]
    InvalidQuestion {
        index: usize,
        #[source]
        source: QuestionError,
    },

    #[error("question {index} has an unusable answer label")]
    InvalidLabel {
        index: usize,
        #[source]
        source: ParseLabelError,
    },

    #[error("question {index} has an unusable image reference")]
    InvalidImage {
        index: usize,
        #[source]
        source: ImageRefError,
    },
}

/// Errors emitted by `QuizController`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ControllerError {
    #[error(transparent)]
    Load(#[from] QuestionSourceError),

    #[error(transparent)]
    Session(#[from] SessionError),
}
