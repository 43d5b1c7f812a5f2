use thiserror::Error;

use crate::model::QuestionError;
use crate::session::SessionError;
use crate::snapshot::SnapshotError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
