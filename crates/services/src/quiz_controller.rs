use std::sync::Arc;

use quiz_core::session::{Persistence, QuizSession, SessionEvent};
use quiz_core::{Clock, Snapshot};
use storage::repository::{SnapshotRecord, SnapshotStore, StorageError};

use crate::error::ControllerError;
use crate::question_source::QuestionSource;

/// Result of applying one session event through the controller.
#[derive(Debug)]
pub struct EventOutcome {
    pub finished: bool,
    /// Persistence is best-effort: the session transition always applies, and
    /// a failed snapshot write is reported here instead of undoing it.
    pub persist_error: Option<StorageError>,
}

/// Orchestrates session startup and persisted transitions.
///
/// The session itself stays with the caller; the controller runs the
/// persistence effect each transition reports.
#[derive(Clone)]
pub struct QuizController {
    clock: Clock,
    source: Arc<dyn QuestionSource>,
    snapshots: Arc<dyn SnapshotStore>,
}

impl QuizController {
    #[must_use]
    pub fn new(
        clock: Clock,
        source: Arc<dyn QuestionSource>,
        snapshots: Arc<dyn SnapshotStore>,
    ) -> Self {
        Self {
            clock,
            source,
            snapshots,
        }
    }

    /// Fetch the question bank and resume from the stored snapshot when one
    /// fits the fetched questions; otherwise start fresh.
    ///
    /// A malformed or stale snapshot is discarded silently, as is a snapshot
    /// the store fails to produce.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Load` when the fetch fails (the caller may
    /// retry) and `ControllerError::Session` when the bank is empty.
    pub async fn start(&self) -> Result<QuizSession, ControllerError> {
        let questions = self.source.fetch().await?;

        if let Ok(Some(record)) = self.snapshots.load().await {
            let snapshot: Snapshot = record.into_snapshot();
            if let Ok(session) = QuizSession::restore(questions.clone(), &snapshot) {
                return Ok(session);
            }
        }

        QuizSession::new(questions).map_err(ControllerError::from)
    }

    /// Apply one event to the session and run its persistence effect.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Session` when the event is not permitted in
    /// the current state; the session and the stored snapshot are untouched
    /// in that case.
    pub async fn apply(
        &self,
        session: &mut QuizSession,
        event: SessionEvent,
    ) -> Result<EventOutcome, ControllerError> {
        let effect = session.apply(event)?;

        let persist_error = match effect {
            Persistence::Save => {
                let record = SnapshotRecord::from_snapshot(&session.snapshot());
                self.snapshots
                    .save(&record, self.clock.now())
                    .await
                    .err()
            }
            Persistence::Clear => self.snapshots.clear().await.err(),
            Persistence::Skip => None,
        };

        Ok(EventOutcome {
            finished: session.is_finished(),
            persist_error,
        })
    }
}
