//! The timed-attempt state machine.
//!
//! One [`AttemptSession`] owns a learner's in-progress attempt: answer
//! state, flags, the current-question cursor, and the countdown. All
//! mutation goes through it while `InProgress`; submission (explicit or by
//! timeout) grades the attempt and freezes it permanently.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::ContractError;
use crate::grading::{grade, GradeReport};
use crate::model::{AnswerValue, AttemptState, Question, Quiz};
use crate::traits::NewAttempt;

/// The frozen outcome of a finalized attempt.
#[derive(Debug, Clone)]
pub struct FinishedAttempt {
    pub state: AttemptState,
    pub report: GradeReport,
    /// Ready-to-submit record for the attempt store.
    pub submission: NewAttempt,
    /// Seconds left on the countdown at finalization; 0 when untimed or
    /// timed out.
    pub remaining_seconds: u32,
    pub flagged: BTreeSet<Uuid>,
}

/// One learner's active run through a quiz.
#[derive(Debug)]
pub struct AttemptSession {
    quiz: Arc<Quiz>,
    user_ref: Uuid,
    answers: BTreeMap<Uuid, AnswerValue>,
    flagged: BTreeSet<Uuid>,
    cursor: usize,
    /// `None` for untimed quizzes.
    remaining_seconds: Option<u32>,
    state: AttemptState,
    started_at: DateTime<Utc>,
    outcome: Option<FinishedAttempt>,
}

impl AttemptSession {
    /// Start an attempt. Fails only for a quiz with no questions.
    pub fn start(quiz: Arc<Quiz>, user_ref: Uuid) -> Result<Self, ContractError> {
        if !quiz.is_attemptable() {
            return Err(ContractError::QuizNotAttemptable);
        }
        let remaining_seconds = quiz.time_limit_seconds();
        Ok(Self {
            quiz,
            user_ref,
            answers: BTreeMap::new(),
            flagged: BTreeSet::new(),
            cursor: 0,
            remaining_seconds,
            state: AttemptState::InProgress,
            started_at: Utc::now(),
            outcome: None,
        })
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    pub fn remaining_seconds(&self) -> Option<u32> {
        self.remaining_seconds
    }

    /// The question the cursor currently points at.
    pub fn current(&self) -> &Question {
        &self.quiz.questions[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn answers(&self) -> &BTreeMap<Uuid, AnswerValue> {
        &self.answers
    }

    pub fn is_flagged(&self, question_id: Uuid) -> bool {
        self.flagged.contains(&question_id)
    }

    /// The frozen outcome, present once the attempt is terminal.
    pub fn outcome(&self) -> Option<&FinishedAttempt> {
        self.outcome.as_ref()
    }

    fn ensure_in_progress(&self) -> Result<(), ContractError> {
        if self.state.is_terminal() {
            return Err(ContractError::AttemptFinished);
        }
        Ok(())
    }

    /// Replace the stored answer for a question. The value's shape must
    /// match the question's variant.
    pub fn select_answer(
        &mut self,
        question_id: Uuid,
        value: AnswerValue,
    ) -> Result<(), ContractError> {
        self.ensure_in_progress()?;
        let question = self
            .quiz
            .question(question_id)
            .ok_or(ContractError::UnknownQuestion(question_id))?;
        if !value.matches(question.kind()) {
            return Err(ContractError::AnswerShape {
                expected: question.kind(),
                got: value.shape(),
            });
        }
        self.answers.insert(question_id, value);
        Ok(())
    }

    /// Flip a question's review flag. Purely advisory; no grading effect.
    pub fn toggle_flag(&mut self, question_id: Uuid) -> Result<bool, ContractError> {
        self.ensure_in_progress()?;
        if self.quiz.question(question_id).is_none() {
            return Err(ContractError::UnknownQuestion(question_id));
        }
        if self.flagged.remove(&question_id) {
            Ok(false)
        } else {
            self.flagged.insert(question_id);
            Ok(true)
        }
    }

    /// Move the current-question cursor.
    pub fn navigate(&mut self, index: usize) -> Result<(), ContractError> {
        self.ensure_in_progress()?;
        if index >= self.quiz.questions.len() {
            return Err(ContractError::IndexOutOfBounds {
                index,
                len: self.quiz.questions.len(),
            });
        }
        self.cursor = index;
        Ok(())
    }

    /// Advance the countdown by one second. At zero the attempt finalizes
    /// exactly as an explicit submit would, but as `TimedOut`. No-op for
    /// untimed quizzes and in terminal states.
    pub fn tick(&mut self) -> AttemptState {
        if self.state.is_terminal() {
            return self.state;
        }
        if let Some(remaining) = self.remaining_seconds {
            let remaining = remaining.saturating_sub(1);
            self.remaining_seconds = Some(remaining);
            if remaining == 0 {
                tracing::info!(quiz = %self.quiz.id, "attempt timed out");
                self.finalize(AttemptState::TimedOut);
            }
        }
        self.state
    }

    /// Finalize the attempt: grade it, store the score, freeze everything.
    pub fn submit(&mut self) -> Result<&FinishedAttempt, ContractError> {
        self.ensure_in_progress()?;
        self.finalize(AttemptState::Submitted);
        Ok(self.outcome.as_ref().expect("finalized"))
    }

    fn finalize(&mut self, terminal: AttemptState) {
        debug_assert!(terminal.is_terminal());
        let report = grade(&self.quiz, &self.answers);

        // For timed attempts the elapsed time falls out of the countdown;
        // untimed attempts use the wall clock.
        let remaining = self.remaining_seconds.unwrap_or(0);
        let duration_seconds = match self.quiz.time_limit_seconds() {
            Some(limit) => u64::from(limit - remaining),
            None => (Utc::now() - self.started_at).num_seconds().max(0) as u64,
        };

        self.state = terminal;
        self.outcome = Some(FinishedAttempt {
            state: terminal,
            submission: NewAttempt {
                user_ref: self.user_ref,
                quiz_ref: self.quiz.id,
                score: report.score,
                duration_seconds,
                answers: self.answers.clone(),
            },
            report,
            remaining_seconds: remaining,
            flagged: self.flagged.clone(),
        });
    }
}

/// Drive a session's countdown at one tick per second until the attempt
/// reaches a terminal state. This is the only autonomous transition source;
/// everything else is caller-initiated.
pub async fn run_countdown(session: Arc<Mutex<AttemptSession>>) -> AttemptState {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick of a tokio interval fires immediately; skip it so the
    // countdown starts a full second in.
    interval.tick().await;
    loop {
        interval.tick().await;
        let mut session = session.lock().await;
        if session.state().is_terminal() {
            return session.state();
        }
        if session.remaining_seconds().is_none() {
            // Untimed quiz; nothing to drive.
            return session.state();
        }
        let state = session.tick();
        if state.is_terminal() {
            return state;
        }
    }
}
