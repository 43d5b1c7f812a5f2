use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use quiz_core::model::{AnswerKey, ImageRef, OptionLabel, Question, QuestionDraft};

use crate::error::QuestionSourceError;

//
// ─── RECORDS ───────────────────────────────────────────────────────────────────
//

/// Raw answer field: a bare label for single-answer questions, a list for
/// multi-answer questions.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AnswerRecord {
    One(String),
    Many(Vec<String>),
}

/// Option texts as stored in the data file; `a`..`d` are required.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionsRecord {
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
    #[serde(default)]
    pub e: Option<String>,
}

/// One question as stored in the data file.
///
/// The historical format marks missing images with an empty string rather
/// than omitting the field, so blank references are treated as absent.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub image2: Option<String>,
    pub options: OptionsRecord,
    pub answer: AnswerRecord,
}

impl QuestionRecord {
    /// Validate into a domain question. `index` is carried into errors so a
    /// bad record can be found in the data file.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError` when an image reference, answer label,
    /// or the question itself fails validation.
    pub fn into_question(self, index: usize) -> Result<Question, QuestionSourceError> {
        let mut images = Vec::new();
        for raw in [self.image, self.image2].into_iter().flatten() {
            if raw.trim().is_empty() {
                continue;
            }
            let image = ImageRef::parse(&raw)
                .map_err(|source| QuestionSourceError::InvalidImage { index, source })?;
            images.push(image);
        }

        let mut options = BTreeMap::new();
        options.insert(OptionLabel::A, self.options.a);
        options.insert(OptionLabel::B, self.options.b);
        options.insert(OptionLabel::C, self.options.c);
        options.insert(OptionLabel::D, self.options.d);
        if let Some(e) = self.options.e {
            if !e.trim().is_empty() {
                options.insert(OptionLabel::E, e);
            }
        }

        let answer = match self.answer {
            AnswerRecord::One(raw) => AnswerKey::Single(parse_label(&raw, index)?),
            AnswerRecord::Many(raw) => {
                let labels = raw
                    .iter()
                    .map(|label| parse_label(label, index))
                    .collect::<Result<Vec<_>, _>>()?;
                AnswerKey::multiple(labels)
            }
        };

        QuestionDraft {
            prompt: self.question,
            images,
            options,
            answer,
        }
        .validate()
        .map_err(|source| QuestionSourceError::InvalidQuestion { index, source })
    }
}

fn parse_label(raw: &str, index: usize) -> Result<OptionLabel, QuestionSourceError> {
    raw.parse()
        .map_err(|source| QuestionSourceError::InvalidLabel { index, source })
}

/// Decode a full question bank from JSON text.
///
/// # Errors
///
/// Returns `QuestionSourceError::Decode` for malformed JSON and the
/// record-level errors from [`QuestionRecord::into_question`] otherwise.
pub fn decode_questions(data: &str) -> Result<Vec<Question>, QuestionSourceError> {
    let records: Vec<QuestionRecord> = serde_json::from_str(data)?;
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.into_question(index))
        .collect()
}

//
// ─── SOURCES ───────────────────────────────────────────────────────────────────
//

/// A one-shot supplier of the immutable, ordered question list.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch the full question bank.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError` when the bank cannot be read or decoded.
    async fn fetch(&self) -> Result<Vec<Question>, QuestionSourceError>;
}

/// Reads the question bank from a JSON file on disk.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl QuestionSource for JsonFileSource {
    async fn fetch(&self) -> Result<Vec<Question>, QuestionSourceError> {
        let data =
            std::fs::read_to_string(&self.path).map_err(|source| QuestionSourceError::Io {
                path: self.path.display().to_string(),
                source,
            })?;
        decode_questions(&data)
    }
}

/// Fetches the question bank over HTTP.
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl QuestionSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<Question>, QuestionSourceError> {
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(QuestionSourceError::HttpStatus(response.status()));
        }
        let records: Vec<QuestionRecord> = response.json().await?;
        records
            .into_iter()
            .enumerate()
            .map(|(index, record)| record.into_question(index))
            .collect()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
