#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod session;
pub mod snapshot;
pub mod time;

pub use error::Error;
pub use session::{Feedback, Mode, Persistence, QuizSession, SessionError, SessionEvent};
pub use snapshot::{Snapshot, SnapshotError};
pub use time::Clock;
