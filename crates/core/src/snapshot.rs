use thiserror::Error;

use crate::model::{OptionLabel, Question, Selection};

/// The persisted subset of session state used to resume a session.
///
/// Mode and feedback are deliberately absent; both reset on reload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub current_index: usize,
    pub selections: Vec<Selection>,
    pub score: usize,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("snapshot has {actual} selection slots for {expected} questions")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("snapshot index {index} out of range for {len} questions")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("snapshot score {score} exceeds {len} questions")]
    ScoreOutOfRange { score: usize, len: usize },

    #[error("snapshot selects {label}, which question {index} does not offer")]
    LabelNotOffered { index: usize, label: OptionLabel },

    #[error("snapshot holds multiple labels for single-answer question {index}")]
    MultipleForSingle { index: usize },
}

impl Snapshot {
    /// Structural validation against the question list a restore would use.
    ///
    /// A snapshot that fails here is stale or corrupt; callers fail safe by
    /// discarding it and starting fresh.
    ///
    /// # Errors
    ///
    /// Returns the first `SnapshotError` encountered.
    pub fn validate_for(&self, questions: &[Question]) -> Result<(), SnapshotError> {
        let len = questions.len();
        if self.selections.len() != len {
            return Err(SnapshotError::LengthMismatch {
                expected: len,
                actual: self.selections.len(),
            });
        }
        if self.current_index >= len {
            return Err(SnapshotError::IndexOutOfRange {
                index: self.current_index,
                len,
            });
        }
        if self.score > len {
            return Err(SnapshotError::ScoreOutOfRange {
                score: self.score,
                len,
            });
        }
        for (index, (selection, question)) in
            self.selections.iter().zip(questions).enumerate()
        {
            for label in selection.labels() {
                if !question.offers(label) {
                    return Err(SnapshotError::LabelNotOffered { index, label });
                }
            }
            if !question.answer().is_multiple() && selection.len() > 1 {
                return Err(SnapshotError::MultipleForSingle { index });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerKey, QuestionDraft};

    fn question(answer: AnswerKey) -> Question {
        QuestionDraft {
            prompt: "Q".to_string(),
            images: Vec::new(),
            options: OptionLabel::REQUIRED
                .into_iter()
                .map(|label| (label, format!("option {label}")))
                .collect(),
            answer,
        }
        .validate()
        .unwrap()
    }

    fn questions() -> Vec<Question> {
        vec![
            question(AnswerKey::Single(OptionLabel::A)),
            question(AnswerKey::multiple([OptionLabel::B, OptionLabel::C])),
        ]
    }

    #[test]
    fn well_formed_snapshot_validates() {
        let snapshot = Snapshot {
            current_index: 1,
            selections: vec![
                Selection::from_labels([OptionLabel::A]),
                Selection::from_labels([OptionLabel::B, OptionLabel::C]),
            ],
            score: 2,
        };
        assert!(snapshot.validate_for(&questions()).is_ok());
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let snapshot = Snapshot {
            current_index: 0,
            selections: vec![Selection::new()],
            score: 0,
        };
        assert_eq!(
            snapshot.validate_for(&questions()).unwrap_err(),
            SnapshotError::LengthMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn unknown_label_is_rejected() {
        let snapshot = Snapshot {
            current_index: 0,
            selections: vec![
                Selection::from_labels([OptionLabel::E]),
                Selection::new(),
            ],
            score: 0,
        };
        assert_eq!(
            snapshot.validate_for(&questions()).unwrap_err(),
            SnapshotError::LabelNotOffered {
                index: 0,
                label: OptionLabel::E
            }
        );
    }

    #[test]
    fn multiple_labels_on_single_answer_slot_are_rejected() {
        let snapshot = Snapshot {
            current_index: 0,
            selections: vec![
                Selection::from_labels([OptionLabel::A, OptionLabel::B]),
                Selection::new(),
            ],
            score: 0,
        };
        assert_eq!(
            snapshot.validate_for(&questions()).unwrap_err(),
            SnapshotError::MultipleForSingle { index: 0 }
        );
    }

    #[test]
    fn inflated_score_is_rejected() {
        let snapshot = Snapshot {
            current_index: 0,
            selections: vec![Selection::new(), Selection::new()],
            score: 3,
        };
        assert_eq!(
            snapshot.validate_for(&questions()).unwrap_err(),
            SnapshotError::ScoreOutOfRange { score: 3, len: 2 }
        );
    }
}
