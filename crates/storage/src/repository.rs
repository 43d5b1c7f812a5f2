use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use quiz_core::Snapshot;
use quiz_core::model::{OptionLabel, Selection};

/// Storage key under which the single session snapshot lives.
pub const SNAPSHOT_KEY: &str = "quizState";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Wire shape of one selection slot: `null` or a bare label for empty and
/// single-label slots, an array of labels otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectionRecord {
    One(Option<OptionLabel>),
    Many(Vec<OptionLabel>),
}

impl SelectionRecord {
    #[must_use]
    pub fn from_selection(selection: &Selection) -> Self {
        match selection.len() {
            0 => SelectionRecord::One(None),
            1 => SelectionRecord::One(selection.single()),
            _ => SelectionRecord::Many(selection.labels().collect()),
        }
    }

    #[must_use]
    pub fn into_selection(self) -> Selection {
        match self {
            SelectionRecord::One(None) => Selection::new(),
            SelectionRecord::One(Some(label)) => Selection::from_labels([label]),
            SelectionRecord::Many(labels) => Selection::from_labels(labels),
        }
    }
}

/// Persisted shape for a session snapshot.
///
/// Field names follow the legacy on-disk format. This mirrors the domain
/// `Snapshot` so repositories can serialize/deserialize without leaking
/// storage concerns into the domain layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    pub current_question_index: usize,
    pub selected_options: Vec<SelectionRecord>,
    pub score: usize,
}

impl SnapshotRecord {
    #[must_use]
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            current_question_index: snapshot.current_index,
            selected_options: snapshot
                .selections
                .iter()
                .map(SelectionRecord::from_selection)
                .collect(),
            score: snapshot.score,
        }
    }

    /// Convert the record back into a domain `Snapshot`.
    ///
    /// Structural fit against the loaded questions is the domain's concern;
    /// see `Snapshot::validate_for`.
    #[must_use]
    pub fn into_snapshot(self) -> Snapshot {
        Snapshot {
            current_index: self.current_question_index,
            selections: self
                .selected_options
                .into_iter()
                .map(SelectionRecord::into_selection)
                .collect(),
            score: self.score,
        }
    }
}

/// Repository contract for the persisted session snapshot.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Fetch the stored snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be read or the stored value
    /// cannot be decoded.
    async fn load(&self) -> Result<Option<SnapshotRecord>, StorageError>;

    /// Overwrite the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save(
        &self,
        record: &SnapshotRecord,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Delete the stored snapshot. Succeeds when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    async fn clear(&self) -> Result<(), StorageError>;
}

/// Simple in-memory snapshot store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemorySnapshotStore {
    slot: Arc<Mutex<Option<SnapshotRecord>>>,
}

impl InMemorySnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn load(&self) -> Result<Option<SnapshotRecord>, StorageError> {
        let guard = self
            .slot
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn save(
        &self,
        record: &SnapshotRecord,
        _saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(record.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let mut guard = self
            .slot
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}

/// Aggregates the snapshot store behind a trait object for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub snapshots: Arc<dyn SnapshotStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            snapshots: Arc::new(InMemorySnapshotStore::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    fn sample_record() -> SnapshotRecord {
        SnapshotRecord {
            current_question_index: 1,
            selected_options: vec![
                SelectionRecord::One(Some(OptionLabel::A)),
                SelectionRecord::Many(vec![OptionLabel::B, OptionLabel::C]),
                SelectionRecord::One(None),
            ],
            score: 1,
        }
    }

    #[test]
    fn record_uses_legacy_key_names() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(json["currentQuestionIndex"], 1);
        assert_eq!(json["selectedOptions"][0], "a");
        assert_eq!(json["selectedOptions"][1][1], "c");
        assert!(json["selectedOptions"][2].is_null());
        assert_eq!(json["score"], 1);
    }

    #[test]
    fn record_round_trips_through_the_domain_snapshot() {
        let record = sample_record();
        let snapshot = record.clone().into_snapshot();
        assert_eq!(snapshot.current_index, 1);
        assert_eq!(snapshot.selections[1].len(), 2);
        assert!(snapshot.selections[2].is_empty());
        assert_eq!(SnapshotRecord::from_snapshot(&snapshot), record);
    }

    #[test]
    fn legacy_null_and_string_slots_decode() {
        let record: SnapshotRecord = serde_json::from_str(
            r#"{"currentQuestionIndex":0,"selectedOptions":[null,"b",["a","d"]],"score":0}"#,
        )
        .unwrap();
        let snapshot = record.into_snapshot();
        assert!(snapshot.selections[0].is_empty());
        assert_eq!(snapshot.selections[1].single(), Some(OptionLabel::B));
        assert_eq!(snapshot.selections[2].len(), 2);
    }

    #[test]
    fn unknown_labels_fail_to_decode() {
        let result: Result<SnapshotRecord, _> = serde_json::from_str(
            r#"{"currentQuestionIndex":0,"selectedOptions":["z"],"score":0}"#,
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn in_memory_store_round_trips() {
        let store = InMemorySnapshotStore::new();
        assert!(store.load().await.unwrap().is_none());

        store.save(&sample_record(), fixed_now()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(sample_record()));

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }
}
