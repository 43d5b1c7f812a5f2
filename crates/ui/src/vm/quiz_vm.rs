use quiz_core::model::OptionLabel;
use quiz_core::session::{Feedback, Mode, QuizSession, SessionEvent};
use services::error::ControllerError;
use services::QuizController;

use crate::views::ViewError;

/// A user intent raised by the quiz view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizIntent {
    Select(OptionLabel),
    Advance,
    Retreat,
    JumpTo(usize),
    SetMode(Mode),
    FinishNow,
    Reset,
    Back,
}

/// One renderable option row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionRow {
    pub label: OptionLabel,
    pub text: String,
    pub selected: bool,
    pub multi: bool,
    pub disabled: bool,
}

/// One cell of the question picker grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PickerCell {
    pub index: usize,
    pub answered: bool,
    pub current: bool,
}

/// View-model over the quiz session: maps session state to plain renderable
/// data and routes intents through the controller.
#[derive(Clone, Debug, PartialEq)]
pub struct QuizVm {
    session: QuizSession,
}

impl QuizVm {
    #[must_use]
    pub fn new(session: QuizSession) -> Self {
        Self { session }
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.session.mode()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.session.is_finished()
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.session.score()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.session.len()
    }

    #[must_use]
    pub fn counter(&self) -> String {
        format!(
            "Question {} / {}",
            self.session.current_index() + 1,
            self.session.len()
        )
    }

    #[must_use]
    pub fn prompt(&self) -> String {
        format!(
            "{}. {}",
            self.session.current_index() + 1,
            self.session.current_question().prompt()
        )
    }

    /// Display strings for the current question's images.
    #[must_use]
    pub fn images(&self) -> Vec<String> {
        self.session
            .current_question()
            .images()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[must_use]
    pub fn feedback_text(&self) -> Option<&'static str> {
        self.session.feedback().map(|feedback| match feedback {
            Feedback::Correct => "Correct!",
            Feedback::Incorrect => "Incorrect!",
        })
    }

    /// The canonical answer texts, shown while the answer is revealed.
    #[must_use]
    pub fn reveal_text(&self) -> Option<String> {
        if self.session.mode() != Mode::ShowAnswer {
            return None;
        }
        let question = self.session.current_question();
        let texts: Vec<&str> = question
            .answer()
            .labels()
            .filter_map(|label| question.option_text(label))
            .collect();
        Some(texts.join(", "))
    }

    #[must_use]
    pub fn option_rows(&self) -> Vec<OptionRow> {
        let question = self.session.current_question();
        let selection = self.session.current_selection();
        let multi = question.answer().is_multiple();
        let disabled = self.session.mode() == Mode::ShowAnswer;
        question
            .options()
            .map(|(label, text)| OptionRow {
                label,
                text: text.to_string(),
                selected: selection.contains(label),
                multi,
                disabled,
            })
            .collect()
    }

    #[must_use]
    pub fn picker_cells(&self) -> Vec<PickerCell> {
        (0..self.session.len())
            .map(|index| PickerCell {
                index,
                answered: self
                    .session
                    .selection(index)
                    .is_some_and(|selection| !selection.is_empty()),
                current: index == self.session.current_index(),
            })
            .collect()
    }

    #[must_use]
    pub fn at_first(&self) -> bool {
        self.session.current_index() == 0
    }

    /// Whether the results screen may offer a way back into the quiz.
    #[must_use]
    pub fn can_leave_results(&self) -> bool {
        self.session.mode() != Mode::InstantFeedback
    }

    /// Apply one intent through the controller.
    ///
    /// Transitions the session rejects (locked selection, back at the first
    /// question, and the like) are no-ops here; the view disables those
    /// controls and nothing should change if one slips through.
    ///
    /// # Errors
    ///
    /// Returns `ViewError::Unknown` for controller failures.
    pub async fn dispatch(
        &mut self,
        controller: &QuizController,
        intent: QuizIntent,
    ) -> Result<(), ViewError> {
        let event = match intent {
            QuizIntent::Select(label) => SessionEvent::Select {
                index: self.session.current_index(),
                label,
            },
            QuizIntent::Advance => SessionEvent::Advance,
            QuizIntent::Retreat => SessionEvent::Retreat,
            QuizIntent::JumpTo(index) => SessionEvent::JumpTo { index },
            QuizIntent::SetMode(mode) => SessionEvent::SetMode(mode),
            QuizIntent::FinishNow => SessionEvent::FinishNow,
            QuizIntent::Reset => SessionEvent::Reset,
            QuizIntent::Back => SessionEvent::Back,
        };

        match controller.apply(&mut self.session, event).await {
            Ok(_) | Err(ControllerError::Session(_)) => Ok(()),
            Err(_) => Err(ViewError::Unknown),
        }
    }
}

/// Start the session through the controller.
///
/// # Errors
///
/// Returns `ViewError::LoadFailed` when the question fetch fails (the view
/// offers a retry) and `ViewError::Unknown` otherwise.
pub async fn start_quiz(controller: &QuizController) -> Result<QuizVm, ViewError> {
    match controller.start().await {
        Ok(session) => Ok(QuizVm::new(session)),
        Err(ControllerError::Load(_)) => Err(ViewError::LoadFailed),
        Err(_) => Err(ViewError::Unknown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use quiz_core::model::{AnswerKey, Question, QuestionDraft};
    use quiz_core::time::fixed_now;
    use quiz_core::Clock;
    use services::error::QuestionSourceError;
    use services::question_source::QuestionSource;
    use storage::repository::InMemorySnapshotStore;

    struct StaticSource {
        questions: Vec<Question>,
    }

    #[async_trait]
    impl QuestionSource for StaticSource {
        async fn fetch(&self) -> Result<Vec<Question>, QuestionSourceError> {
            Ok(self.questions.clone())
        }
    }

    fn question(answer: AnswerKey) -> Question {
        QuestionDraft {
            prompt: "Pick".to_string(),
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

    fn build_controller(questions: Vec<Question>) -> QuizController {
        QuizController::new(
            Clock::fixed(fixed_now()),
            Arc::new(StaticSource { questions }),
            Arc::new(InMemorySnapshotStore::new()),
        )
    }

    #[tokio::test]
    async fn option_rows_track_selection_and_mode() {
        let controller = build_controller(vec![
            question(AnswerKey::Single(OptionLabel::B)),
            question(AnswerKey::Single(OptionLabel::A)),
        ]);
        let mut vm = QuizVm::new(controller.start().await.unwrap());

        vm.dispatch(&controller, QuizIntent::Select(OptionLabel::B))
            .await
            .unwrap();
        let rows = vm.option_rows();
        assert!(rows[1].selected);
        assert!(!rows[0].selected);
        assert!(rows.iter().all(|row| !row.disabled && !row.multi));

        vm.dispatch(&controller, QuizIntent::SetMode(Mode::ShowAnswer))
            .await
            .unwrap();
        assert!(vm.option_rows().iter().all(|row| row.disabled));
        assert_eq!(vm.reveal_text().as_deref(), Some("option b"));

        // Locked selection is a silent no-op.
        vm.dispatch(&controller, QuizIntent::Select(OptionLabel::A))
            .await
            .unwrap();
        assert!(vm.option_rows()[1].selected);
    }

    #[tokio::test]
    async fn picker_marks_answered_and_current_cells() {
        let controller = build_controller(vec![
            question(AnswerKey::Single(OptionLabel::A)),
            question(AnswerKey::Single(OptionLabel::B)),
            question(AnswerKey::Single(OptionLabel::C)),
        ]);
        let mut vm = QuizVm::new(controller.start().await.unwrap());

        vm.dispatch(&controller, QuizIntent::Select(OptionLabel::A))
            .await
            .unwrap();
        vm.dispatch(&controller, QuizIntent::JumpTo(2))
            .await
            .unwrap();

        let cells = vm.picker_cells();
        assert!(cells[0].answered);
        assert!(!cells[1].answered);
        assert!(cells[2].current);
        assert_eq!(vm.counter(), "Question 3 / 3");
    }

    #[tokio::test]
    async fn finishing_reports_score_and_back_rule() {
        let controller = build_controller(vec![question(AnswerKey::Single(OptionLabel::A))]);
        let mut vm = QuizVm::new(controller.start().await.unwrap());

        vm.dispatch(&controller, QuizIntent::Select(OptionLabel::A))
            .await
            .unwrap();
        vm.dispatch(&controller, QuizIntent::Advance).await.unwrap();

        assert!(vm.is_finished());
        assert_eq!(vm.score(), 1);
        assert!(vm.can_leave_results());

        vm.dispatch(&controller, QuizIntent::Back).await.unwrap();
        assert!(!vm.is_finished());
    }
}
