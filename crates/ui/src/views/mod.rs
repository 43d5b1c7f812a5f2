mod quiz;
mod state;

pub use quiz::QuizView;
pub use state::{view_state_from_resource, ViewError, ViewState};
