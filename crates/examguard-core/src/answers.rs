//! Per-question selection state.

use crate::model::{Answer, Question};

/// Tracks one selection slot per question, in quiz order.
///
/// Pure state container: no side effects beyond its own slots. The session
/// state machine only touches it while the session is in progress.
#[derive(Debug, Clone, Default)]
pub struct AnswerSheet {
    answers: Vec<Answer>,
}

impl AnswerSheet {
    /// One empty slot per question, in quiz order.
    pub fn new(questions: &[Question]) -> Self {
        Self {
            answers: questions
                .iter()
                .map(|q| Answer {
                    question_id: q.id.clone(),
                    selected_option: None,
                })
                .collect(),
        }
    }

    /// Record a selection. Re-selecting the same option is a no-op; a
    /// different option overwrites. Unknown question ids are ignored,
    /// matching the upstream behavior.
    pub fn select(&mut self, question_id: &str, option: usize) -> bool {
        match self.answers.iter_mut().find(|a| a.question_id == question_id) {
            Some(slot) => {
                slot.selected_option = Some(option);
                true
            }
            None => {
                tracing::debug!(question_id, "ignoring selection for unknown question");
                false
            }
        }
    }

    /// The current selection for a question, if any.
    pub fn selected(&self, question_id: &str) -> Option<usize> {
        self.answers
            .iter()
            .find(|a| a.question_id == question_id)
            .and_then(|a| a.selected_option)
    }

    pub fn answered_count(&self) -> usize {
        self.answers
            .iter()
            .filter(|a| a.selected_option.is_some())
            .count()
    }

    pub fn unanswered_count(&self) -> usize {
        self.answers.len() - self.answered_count()
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// All slots in quiz order.
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }
}
