use std::sync::Arc;

use services::QuizController;

/// Shared services the views resolve from Dioxus context.
///
/// Provided by the application composition root (see `crates/app`).
#[derive(Clone)]
pub struct AppContext {
    controller: Arc<QuizController>,
}

impl AppContext {
    #[must_use]
    pub fn new(controller: Arc<QuizController>) -> Self {
        Self { controller }
    }

    #[must_use]
    pub fn controller(&self) -> Arc<QuizController> {
        Arc::clone(&self.controller)
    }
}
