use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::image::ImageRef;

/// Most images a single question may carry.
pub const MAX_IMAGES: usize = 2;

//
// ─── OPTION LABELS ─────────────────────────────────────────────────────────────
//

/// One of the five option slots a question may offer.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
    E,
}

impl OptionLabel {
    /// Labels every question must offer.
    pub const REQUIRED: [OptionLabel; 4] =
        [OptionLabel::A, OptionLabel::B, OptionLabel::C, OptionLabel::D];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OptionLabel::A => "a",
            OptionLabel::B => "b",
            OptionLabel::C => "c",
            OptionLabel::D => "d",
            OptionLabel::E => "e",
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("not an option label: {raw}")]
pub struct ParseLabelError {
    raw: String,
}

impl FromStr for OptionLabel {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "a" => Ok(OptionLabel::A),
            "b" => Ok(OptionLabel::B),
            "c" => Ok(OptionLabel::C),
            "d" => Ok(OptionLabel::D),
            "e" => Ok(OptionLabel::E),
            other => Err(ParseLabelError {
                raw: other.to_string(),
            }),
        }
    }
}

//
// ─── SELECTION ─────────────────────────────────────────────────────────────────
//

/// Labels the user has chosen on one question. Empty means unanswered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection(BTreeSet<OptionLabel>);

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_labels(labels: impl IntoIterator<Item = OptionLabel>) -> Self {
        Self(labels.into_iter().collect())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn contains(&self, label: OptionLabel) -> bool {
        self.0.contains(&label)
    }

    /// The chosen label when exactly one is chosen.
    #[must_use]
    pub fn single(&self) -> Option<OptionLabel> {
        if self.0.len() == 1 {
            self.0.iter().next().copied()
        } else {
            None
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = OptionLabel> + '_ {
        self.0.iter().copied()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

//
// ─── ANSWER KEY ────────────────────────────────────────────────────────────────
//

/// The canonical answer for a question, in its single- or multi-select shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerKey {
    Single(OptionLabel),
    Multiple(BTreeSet<OptionLabel>),
}

impl AnswerKey {
    #[must_use]
    pub fn multiple(labels: impl IntoIterator<Item = OptionLabel>) -> Self {
        AnswerKey::Multiple(labels.into_iter().collect())
    }

    #[must_use]
    pub fn is_multiple(&self) -> bool {
        matches!(self, AnswerKey::Multiple(_))
    }

    pub fn labels(&self) -> impl Iterator<Item = OptionLabel> + '_ {
        match self {
            AnswerKey::Single(label) => Labels::Single(Some(*label)),
            AnswerKey::Multiple(set) => Labels::Multiple(set.iter()),
        }
    }

    /// The one correctness predicate for both variants: a single-answer
    /// question requires the one label, a multi-answer question requires set
    /// equality with the correct set.
    #[must_use]
    pub fn matches(&self, selection: &Selection) -> bool {
        match self {
            AnswerKey::Single(label) => selection.single() == Some(*label),
            AnswerKey::Multiple(set) => &selection.0 == set,
        }
    }

    /// Applies a pick: single-answer selections replace, multi-answer
    /// selections toggle membership.
    pub fn apply_pick(&self, selection: &mut Selection, label: OptionLabel) {
        match self {
            AnswerKey::Single(_) => {
                selection.0.clear();
                selection.0.insert(label);
            }
            AnswerKey::Multiple(_) => {
                if !selection.0.remove(&label) {
                    selection.0.insert(label);
                }
            }
        }
    }
}

enum Labels<'a> {
    Single(Option<OptionLabel>),
    Multiple(std::collections::btree_set::Iter<'a, OptionLabel>),
}

impl Iterator for Labels<'_> {
    type Item = OptionLabel;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Labels::Single(label) => label.take(),
            Labels::Multiple(iter) => iter.next().copied(),
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be blank")]
    BlankPrompt,

    #[error("required option {0} is missing")]
    MissingOption(OptionLabel),

    #[error("option {0} cannot be blank")]
    BlankOption(OptionLabel),

    #[error("multi-answer key cannot be empty")]
    EmptyAnswerSet,

    #[error("answer label {0} is not among the offered options")]
    AnswerNotOffered(OptionLabel),

    #[error("question carries {count} images, the limit is {MAX_IMAGES}")]
    TooManyImages { count: usize },
}

/// Unvalidated question as assembled from a data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub prompt: String,
    pub images: Vec<ImageRef>,
    pub options: BTreeMap<OptionLabel, String>,
    pub answer: AnswerKey,
}

impl QuestionDraft {
    /// # Errors
    ///
    /// Returns `QuestionError` when the prompt or an option is blank, a
    /// required option is missing, the answer references an option the
    /// question does not offer, the multi-answer set is empty, or more than
    /// [`MAX_IMAGES`] images are attached.
    pub fn validate(self) -> Result<Question, QuestionError> {
        if self.prompt.trim().is_empty() {
            return Err(QuestionError::BlankPrompt);
        }
        if self.images.len() > MAX_IMAGES {
            return Err(QuestionError::TooManyImages {
                count: self.images.len(),
            });
        }
        for label in OptionLabel::REQUIRED {
            if !self.options.contains_key(&label) {
                return Err(QuestionError::MissingOption(label));
            }
        }
        for (label, text) in &self.options {
            if text.trim().is_empty() {
                return Err(QuestionError::BlankOption(*label));
            }
        }
        if let AnswerKey::Multiple(set) = &self.answer {
            if set.is_empty() {
                return Err(QuestionError::EmptyAnswerSet);
            }
        }
        for label in self.answer.labels() {
            if !self.options.contains_key(&label) {
                return Err(QuestionError::AnswerNotOffered(label));
            }
        }

        Ok(Question {
            prompt: self.prompt,
            images: self.images,
            options: self.options,
            answer: self.answer,
        })
    }
}

/// One validated, immutable quiz item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    images: Vec<ImageRef>,
    options: BTreeMap<OptionLabel, String>,
    answer: AnswerKey,
}

impl Question {
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    /// Offered labels with their texts, in label order.
    pub fn options(&self) -> impl Iterator<Item = (OptionLabel, &str)> + '_ {
        self.options.iter().map(|(label, text)| (*label, text.as_str()))
    }

    #[must_use]
    pub fn option_text(&self, label: OptionLabel) -> Option<&str> {
        self.options.get(&label).map(String::as_str)
    }

    #[must_use]
    pub fn offers(&self, label: OptionLabel) -> bool {
        self.options.contains_key(&label)
    }

    #[must_use]
    pub fn answer(&self) -> &AnswerKey {
        &self.answer
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
