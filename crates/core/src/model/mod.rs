mod image;
mod question;

pub use image::{ImageRef, ImageRefError};
pub use question::{
    AnswerKey, MAX_IMAGES, OptionLabel, ParseLabelError, Question, QuestionDraft, QuestionError,
    Selection,
};
