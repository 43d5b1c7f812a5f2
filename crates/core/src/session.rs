use thiserror::Error;

use crate::error::Error;
use crate::model::{OptionLabel, Question, Selection};
use crate::snapshot::Snapshot;

//
// ─── MODES & FEEDBACK ──────────────────────────────────────────────────────────
//

/// Governs whether the canonical answer is revealed, whether selection
/// feedback is immediate, and which operations are permitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    ShowAnswer,
    InstantFeedback,
}

/// Transient correctness indicator set right after a pick in
/// [`Mode::InstantFeedback`]. Cleared on any navigation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    Incorrect,
}

//
// ─── EVENTS ────────────────────────────────────────────────────────────────────
//

/// A user-triggered transition on the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Select { index: usize, label: OptionLabel },
    Advance,
    Retreat,
    JumpTo { index: usize },
    SetMode(Mode),
    FinishNow,
    Reset,
    Back,
}

/// What the caller should do with the persisted snapshot after a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Persistence {
    Save,
    Clear,
    Skip,
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,

    #[error("session is finished")]
    Finished,

    #[error("session is not finished")]
    NotFinished,

    #[error("index {index} out of range for {len} questions")]
    OutOfRange { index: usize, len: usize },

    #[error("already at the first question")]
    AtStart,

    #[error("selection aimed at question {given} while question {expected} is current")]
    NotCurrent { expected: usize, given: usize },

    #[error("option {label} is not offered by the current question")]
    NotOffered { label: OptionLabel },

    #[error("selection is locked while the answer is shown")]
    SelectionLocked,

    #[error("finishing early is locked while the answer is shown")]
    FinishLocked,

    #[error("returning from the results is locked in instant-feedback mode")]
    BackLocked,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory quiz session over a fixed, ordered question list.
///
/// Every mutation flows through [`QuizSession::apply`], a pure transition that
/// returns the persistence effect the caller should run against its snapshot
/// store. Score is derived from a per-question credited mask: a question is
/// credited when it settles with a matching selection (on advance, or at
/// selection time in instant-feedback mode) and stays credited until reset,
/// so revisiting a question can never double-count it.
#[derive(Clone, Debug, PartialEq)]
pub struct QuizSession {
    questions: Vec<Question>,
    current: usize,
    selections: Vec<Selection>,
    credited: Vec<bool>,
    mode: Mode,
    finished: bool,
    feedback: Option<Feedback>,
}

impl QuizSession {
    /// Start a fresh session at the first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if `questions` is empty.
    pub fn new(questions: Vec<Question>) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }
        let len = questions.len();
        Ok(Self {
            questions,
            current: 0,
            selections: vec![Selection::new(); len],
            credited: vec![false; len],
            mode: Mode::default(),
            finished: false,
            feedback: None,
        })
    }

    /// Rehydrate a session from a persisted snapshot.
    ///
    /// Selections are the source of truth: the credited mask is rebuilt from
    /// currently matching selections and the score recomputed from it. Mode
    /// and feedback are not persisted and start at their defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Session` if `questions` is empty and `Error::Snapshot`
    /// if the snapshot does not fit the questions structurally.
    pub fn restore(questions: Vec<Question>, snapshot: &Snapshot) -> Result<Self, Error> {
        let mut session = Self::new(questions)?;
        snapshot.validate_for(&session.questions)?;
        session.current = snapshot.current_index;
        session.selections = snapshot.selections.clone();
        session.credited = session
            .selections
            .iter()
            .zip(&session.questions)
            .map(|(selection, question)| question.answer().matches(selection))
            .collect();
        Ok(session)
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    #[must_use]
    pub fn selection(&self, index: usize) -> Option<&Selection> {
        self.selections.get(index)
    }

    #[must_use]
    pub fn current_selection(&self) -> &Selection {
        &self.selections[self.current]
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    #[must_use]
    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    /// Count of credited questions.
    #[must_use]
    pub fn score(&self) -> usize {
        self.credited.iter().filter(|credited| **credited).count()
    }

    /// The persisted subset of this session's state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            current_index: self.current,
            selections: self.selections.clone(),
            score: self.score(),
        }
    }

    /// Apply one event and report the persistence effect for it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` when the event is not permitted in the current
    /// state; the session is left untouched in that case.
    pub fn apply(&mut self, event: SessionEvent) -> Result<Persistence, SessionError> {
        match event {
            SessionEvent::Select { index, label } => self.select(index, label),
            SessionEvent::Advance => self.advance(),
            SessionEvent::Retreat => self.retreat(),
            SessionEvent::JumpTo { index } => self.jump_to(index),
            SessionEvent::SetMode(mode) => self.set_mode(mode),
            SessionEvent::FinishNow => self.finish_now(),
            SessionEvent::Reset => self.reset(),
            SessionEvent::Back => self.back(),
        }
    }

    fn select(&mut self, index: usize, label: OptionLabel) -> Result<Persistence, SessionError> {
        if self.finished {
            return Err(SessionError::Finished);
        }
        if self.mode == Mode::ShowAnswer {
            return Err(SessionError::SelectionLocked);
        }
        if index != self.current {
            return Err(SessionError::NotCurrent {
                expected: self.current,
                given: index,
            });
        }
        let question = &self.questions[self.current];
        if !question.offers(label) {
            return Err(SessionError::NotOffered { label });
        }

        question
            .answer()
            .apply_pick(&mut self.selections[self.current], label);

        if self.mode == Mode::InstantFeedback {
            let correct = question.answer().matches(&self.selections[self.current]);
            self.feedback = Some(if correct {
                Feedback::Correct
            } else {
                Feedback::Incorrect
            });
            if correct {
                self.credited[self.current] = true;
            }
        }

        Ok(Persistence::Save)
    }

    fn advance(&mut self) -> Result<Persistence, SessionError> {
        if self.finished {
            return Err(SessionError::Finished);
        }
        self.settle_current();
        self.feedback = None;
        if self.current + 1 == self.questions.len() {
            self.finished = true;
            Ok(Persistence::Clear)
        } else {
            self.current += 1;
            Ok(Persistence::Save)
        }
    }

    fn retreat(&mut self) -> Result<Persistence, SessionError> {
        if self.finished {
            return Err(SessionError::Finished);
        }
        if self.current == 0 {
            return Err(SessionError::AtStart);
        }
        self.current -= 1;
        self.feedback = None;
        Ok(Persistence::Save)
    }

    fn jump_to(&mut self, index: usize) -> Result<Persistence, SessionError> {
        if self.finished {
            return Err(SessionError::Finished);
        }
        if index >= self.questions.len() {
            return Err(SessionError::OutOfRange {
                index,
                len: self.questions.len(),
            });
        }
        self.current = index;
        self.feedback = None;
        Ok(Persistence::Save)
    }

    fn set_mode(&mut self, mode: Mode) -> Result<Persistence, SessionError> {
        self.mode = mode;
        Ok(Persistence::Skip)
    }

    fn finish_now(&mut self) -> Result<Persistence, SessionError> {
        if self.finished {
            return Err(SessionError::Finished);
        }
        if self.mode == Mode::ShowAnswer {
            return Err(SessionError::FinishLocked);
        }
        self.finished = true;
        self.feedback = None;
        Ok(Persistence::Clear)
    }

    fn reset(&mut self) -> Result<Persistence, SessionError> {
        self.current = 0;
        for selection in &mut self.selections {
            selection.clear();
        }
        self.credited.fill(false);
        self.mode = Mode::Normal;
        self.finished = false;
        self.feedback = None;
        Ok(Persistence::Clear)
    }

    fn back(&mut self) -> Result<Persistence, SessionError> {
        if !self.finished {
            return Err(SessionError::NotFinished);
        }
        if self.mode == Mode::InstantFeedback {
            return Err(SessionError::BackLocked);
        }
        self.finished = false;
        Ok(Persistence::Save)
    }

    fn settle_current(&mut self) {
        let question = &self.questions[self.current];
        if question.answer().matches(&self.selections[self.current]) {
            self.credited[self.current] = true;
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerKey, QuestionDraft};

    fn single_question(answer: OptionLabel) -> Question {
        QuestionDraft {
            prompt: format!("Pick {answer}"),
            images: Vec::new(),
            options: OptionLabel::REQUIRED
                .into_iter()
                .map(|label| (label, format!("option {label}")))
                .collect(),
            answer: AnswerKey::Single(answer),
        }
        .validate()
        .unwrap()
    }

    fn multi_question(answer: impl IntoIterator<Item = OptionLabel>) -> Question {
        QuestionDraft {
            prompt: "Pick all that apply".to_string(),
            images: Vec::new(),
            options: OptionLabel::REQUIRED
                .into_iter()
                .map(|label| (label, format!("option {label}")))
                .collect(),
            answer: AnswerKey::multiple(answer),
        }
        .validate()
        .unwrap()
    }

    fn three_singles() -> Vec<Question> {
        vec![
            single_question(OptionLabel::A),
            single_question(OptionLabel::B),
            single_question(OptionLabel::C),
        ]
    }

    fn select(session: &mut QuizSession, label: OptionLabel) {
        let index = session.current_index();
        session
            .apply(SessionEvent::Select { index, label })
            .unwrap();
    }

    #[test]
    fn empty_question_list_is_rejected() {
        assert_eq!(QuizSession::new(Vec::new()).unwrap_err(), SessionError::Empty);
    }

    #[test]
    fn pass_through_scores_matching_selections() {
        let mut session = QuizSession::new(three_singles()).unwrap();

        select(&mut session, OptionLabel::A);
        assert_eq!(session.apply(SessionEvent::Advance).unwrap(), Persistence::Save);
        select(&mut session, OptionLabel::D); // wrong
        session.apply(SessionEvent::Advance).unwrap();
        select(&mut session, OptionLabel::C);
        assert_eq!(session.apply(SessionEvent::Advance).unwrap(), Persistence::Clear);

        assert!(session.is_finished());
        assert_eq!(session.score(), 2);
    }

    #[test]
    fn revisiting_cannot_double_count() {
        let mut session = QuizSession::new(three_singles()).unwrap();

        select(&mut session, OptionLabel::A);
        session.apply(SessionEvent::Advance).unwrap();
        assert_eq!(session.score(), 1);

        session.apply(SessionEvent::Retreat).unwrap();
        session.apply(SessionEvent::Advance).unwrap();
        session.apply(SessionEvent::JumpTo { index: 0 }).unwrap();
        session.apply(SessionEvent::Advance).unwrap();
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn multi_answer_settles_on_final_set() {
        let mut session =
            QuizSession::new(vec![multi_question([OptionLabel::A, OptionLabel::C])]).unwrap();

        select(&mut session, OptionLabel::A);
        select(&mut session, OptionLabel::C);
        session.apply(SessionEvent::Advance).unwrap();

        assert!(session.is_finished());
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn instant_feedback_reports_and_credits_immediately() {
        let mut session = QuizSession::new(three_singles()).unwrap();
        session
            .apply(SessionEvent::SetMode(Mode::InstantFeedback))
            .unwrap();

        select(&mut session, OptionLabel::D);
        assert_eq!(session.feedback(), Some(Feedback::Incorrect));
        assert_eq!(session.score(), 0);

        select(&mut session, OptionLabel::A);
        assert_eq!(session.feedback(), Some(Feedback::Correct));
        assert_eq!(session.score(), 1);

        // Advancing settles the same question once more without double-counting.
        session.apply(SessionEvent::Advance).unwrap();
        assert_eq!(session.score(), 1);
        assert_eq!(session.feedback(), None);
    }

    #[test]
    fn navigation_clears_feedback() {
        let mut session = QuizSession::new(three_singles()).unwrap();
        session
            .apply(SessionEvent::SetMode(Mode::InstantFeedback))
            .unwrap();
        select(&mut session, OptionLabel::A);
        assert!(session.feedback().is_some());

        session.apply(SessionEvent::JumpTo { index: 2 }).unwrap();
        assert_eq!(session.feedback(), None);
    }

    #[test]
    fn selection_is_locked_in_show_answer_mode() {
        let mut session = QuizSession::new(three_singles()).unwrap();
        session
            .apply(SessionEvent::SetMode(Mode::ShowAnswer))
            .unwrap();

        let err = session
            .apply(SessionEvent::Select {
                index: 0,
                label: OptionLabel::A,
            })
            .unwrap_err();
        assert_eq!(err, SessionError::SelectionLocked);
        assert!(session.current_selection().is_empty());
    }

    #[test]
    fn finish_now_is_locked_in_show_answer_mode() {
        let mut session = QuizSession::new(three_singles()).unwrap();
        session
            .apply(SessionEvent::SetMode(Mode::ShowAnswer))
            .unwrap();
        assert_eq!(
            session.apply(SessionEvent::FinishNow).unwrap_err(),
            SessionError::FinishLocked
        );

        session.apply(SessionEvent::SetMode(Mode::Normal)).unwrap();
        assert_eq!(
            session.apply(SessionEvent::FinishNow).unwrap(),
            Persistence::Clear
        );
        assert!(session.is_finished());
    }

    #[test]
    fn back_returns_to_last_question_with_state_intact() {
        let mut session = QuizSession::new(three_singles()).unwrap();
        select(&mut session, OptionLabel::A);
        session.apply(SessionEvent::Advance).unwrap();
        session.apply(SessionEvent::Advance).unwrap();
        session.apply(SessionEvent::Advance).unwrap();
        assert!(session.is_finished());

        assert_eq!(session.apply(SessionEvent::Back).unwrap(), Persistence::Save);
        assert!(!session.is_finished());
        assert_eq!(session.current_index(), 2);
        assert_eq!(session.score(), 1);
    }

    #[test]
    fn back_is_locked_in_instant_feedback_mode() {
        let mut session = QuizSession::new(three_singles()).unwrap();
        session
            .apply(SessionEvent::SetMode(Mode::InstantFeedback))
            .unwrap();
        session.apply(SessionEvent::FinishNow).unwrap();

        assert_eq!(
            session.apply(SessionEvent::Back).unwrap_err(),
            SessionError::BackLocked
        );
        assert!(session.is_finished());
    }

    #[test]
    fn navigation_never_leaves_bounds() {
        let mut session = QuizSession::new(three_singles()).unwrap();
        assert_eq!(
            session.apply(SessionEvent::Retreat).unwrap_err(),
            SessionError::AtStart
        );
        assert_eq!(
            session.apply(SessionEvent::JumpTo { index: 3 }).unwrap_err(),
            SessionError::OutOfRange { index: 3, len: 3 }
        );
        assert_eq!(session.current_index(), 0);

        session.apply(SessionEvent::Advance).unwrap();
        session.apply(SessionEvent::Advance).unwrap();
        session.apply(SessionEvent::Advance).unwrap();
        assert!(session.is_finished());
        assert_eq!(
            session.apply(SessionEvent::Advance).unwrap_err(),
            SessionError::Finished
        );
    }

    #[test]
    fn reset_returns_to_a_fresh_session() {
        let mut session = QuizSession::new(three_singles()).unwrap();
        session
            .apply(SessionEvent::SetMode(Mode::InstantFeedback))
            .unwrap();
        select(&mut session, OptionLabel::A);
        session.apply(SessionEvent::Advance).unwrap();

        assert_eq!(session.apply(SessionEvent::Reset).unwrap(), Persistence::Clear);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.score(), 0);
        assert_eq!(session.mode(), Mode::Normal);
        assert!(!session.is_finished());
        assert!(session.selection(0).unwrap().is_empty());
    }

    #[test]
    fn snapshot_round_trip_restores_position_and_score() {
        let questions = three_singles();
        let mut session = QuizSession::new(questions.clone()).unwrap();
        select(&mut session, OptionLabel::A);
        session.apply(SessionEvent::Advance).unwrap();
        select(&mut session, OptionLabel::D);

        let snapshot = session.snapshot();
        let restored = QuizSession::restore(questions, &snapshot).unwrap();

        assert_eq!(restored.current_index(), 1);
        assert_eq!(restored.score(), 1);
        assert_eq!(restored.selection(0), session.selection(0));
        assert_eq!(restored.selection(1), session.selection(1));
        assert_eq!(restored.snapshot(), snapshot);
    }

    #[test]
    fn restore_rejects_out_of_range_snapshot() {
        let questions = three_singles();
        let snapshot = Snapshot {
            current_index: 7,
            selections: vec![Selection::new(); 3],
            score: 0,
        };
        assert!(QuizSession::restore(questions, &snapshot).is_err());
    }
}
