#![forbid(unsafe_code)]

pub mod error;
pub mod question_source;
pub mod quiz_controller;

pub use quiz_core::Clock;

pub use error::{ControllerError, QuestionSourceError};
pub use question_source::{HttpSource, JsonFileSource, QuestionRecord, QuestionSource};
pub use quiz_controller::{EventOutcome, QuizController};
