use std::collections::HashMap;

use serde::Serialize;

use crate::models::Question;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QuizPhase {
    Idle,
    InRound,
    Feedback,
    Results,
}

/// Result of feeding an option id into the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// The answer was recorded; `round` is the round id the caller must hand
    /// back to `advance` so a stale timer cannot touch a newer round.
    Recorded {
        option_id: String,
        correct: bool,
        round: u64,
    },
    /// Out-of-phase scan or unknown option id. Expected scanner noise.
    Ignored,
}

/// The active round's state. Purely synchronous; timing and I/O live in the
/// room orchestration layer.
#[derive(Debug, Default)]
pub struct QuizSession {
    questions: Vec<Question>,
    current_question_index: usize,
    score: usize,
    show_result: bool,
    last_answer: Option<String>,
    is_correct: Option<bool>,
    error: Option<String>,
    user_answers: HashMap<String, String>,
    round: u64,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> QuizPhase {
        if self.questions.is_empty() {
            QuizPhase::Idle
        } else if self.show_result {
            QuizPhase::Results
        } else if self.last_answer.is_some() {
            QuizPhase::Feedback
        } else {
            QuizPhase::InRound
        }
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_question_index)
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Begins a fresh round over the given questions. Bumps the round counter
    /// so any timer scheduled against the previous round becomes a no-op.
    pub fn start_round(&mut self, questions: Vec<Question>) {
        self.round += 1;
        self.questions = questions;
        self.current_question_index = 0;
        self.score = 0;
        self.show_result = false;
        self.last_answer = None;
        self.is_correct = None;
        self.error = None;
        self.user_answers.clear();
    }

    /// Records an answer for the current question. No-ops while not in a
    /// round or while the feedback window is open (double-scan de-bounce),
    /// and silently ignores option ids that don't belong to the current
    /// question.
    pub fn answer(&mut self, option_id: &str) -> AnswerOutcome {
        if self.phase() != QuizPhase::InRound {
            return AnswerOutcome::Ignored;
        }

        let Some(question) = self.current_question() else {
            return AnswerOutcome::Ignored;
        };
        let Some(option) = question.option(option_id) else {
            log::debug!("Scan token {} matched no current option", option_id);
            return AnswerOutcome::Ignored;
        };

        let correct = option.is_correct;
        let question_id = question.id.clone();
        self.user_answers.insert(question_id, option_id.to_string());
        self.score = self.recompute_score();
        self.last_answer = Some(option_id.to_string());
        self.is_correct = Some(correct);

        AnswerOutcome::Recorded {
            option_id: option_id.to_string(),
            correct,
            round: self.round,
        }
    }

    /// Closes the feedback window for `round`: advances to the next question
    /// or, past the last one, enters results. A stale round id (a timer that
    /// survived a restart) changes nothing.
    pub fn advance(&mut self, round: u64) -> bool {
        if round != self.round || self.last_answer.is_none() || self.show_result {
            return false;
        }

        self.last_answer = None;
        self.is_correct = None;
        self.current_question_index += 1;
        if self.current_question_index >= self.questions.len() {
            self.current_question_index = self.questions.len();
            self.show_result = true;
        }
        true
    }

    /// Score derived from the answer record, never incrementally drifted.
    fn recompute_score(&self) -> usize {
        self.user_answers
            .iter()
            .filter(|(question_id, option_id)| {
                self.questions
                    .iter()
                    .find(|q| &q.id == *question_id)
                    .and_then(|q| q.option(option_id))
                    .map(|o| o.is_correct)
                    .unwrap_or(false)
            })
            .count()
    }

    pub fn snapshot(&self) -> QuizSnapshot {
        QuizSnapshot {
            questions: self.questions.clone(),
            current_question_index: self.current_question_index,
            score: self.score,
            show_result: self.show_result,
            last_answer: self.last_answer.clone(),
            is_correct: self.is_correct,
            error: self.error.clone(),
            user_answers: self.user_answers.clone(),
            phase: self.phase(),
        }
    }
}

/// Serialized view of the session for UI observers.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSnapshot {
    pub questions: Vec<Question>,
    pub current_question_index: usize,
    pub score: usize,
    pub show_result: bool,
    pub last_answer: Option<String>,
    pub is_correct: Option<bool>,
    pub error: Option<String>,
    pub user_answers: HashMap<String, String>,
    pub phase: QuizPhase,
}
