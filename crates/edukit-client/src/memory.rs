//! In-memory store for testing and offline use.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use edukit_core::error::StoreError;
use edukit_core::model::{Attempt, AttemptState, Quiz};
use edukit_core::traits::{AttemptStore, NewAttempt, QuizPatch, QuizStore};

/// A store backed by process memory, mirroring the server's behavior of
/// assigning attempt ids and timestamps.
#[derive(Default)]
pub struct MemoryStore {
    quizzes: Mutex<HashMap<Uuid, Quiz>>,
    attempts: Mutex<Vec<Attempt>>,
    /// Number of store calls made, for assertions in tests.
    call_count: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with quizzes.
    pub fn with_quizzes(quizzes: impl IntoIterator<Item = Quiz>) -> Self {
        let store = Self::new();
        {
            let mut map = store.quizzes.lock().unwrap();
            for quiz in quizzes {
                map.insert(quiz.id, quiz);
            }
        }
        store
    }

    /// Get the number of calls made to this store.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    fn tally(&self) {
        self.call_count.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn fetch_quiz(&self, id: Uuid) -> Result<Quiz, StoreError> {
        self.tally();
        self.quizzes
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("quiz {id}")))
    }

    async fn list_quizzes(&self) -> Result<Vec<Quiz>, StoreError> {
        self.tally();
        let mut quizzes: Vec<Quiz> = self.quizzes.lock().unwrap().values().cloned().collect();
        quizzes.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(quizzes)
    }

    async fn create_quiz(&self, quiz: &Quiz) -> Result<Quiz, StoreError> {
        self.tally();
        self.quizzes
            .lock()
            .unwrap()
            .insert(quiz.id, quiz.clone());
        Ok(quiz.clone())
    }

    async fn update_quiz(&self, id: Uuid, patch: &QuizPatch) -> Result<Quiz, StoreError> {
        self.tally();
        let mut quizzes = self.quizzes.lock().unwrap();
        let quiz = quizzes
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("quiz {id}")))?;

        if let Some(title) = &patch.title {
            quiz.title = title.clone();
        }
        if let Some(description) = &patch.description {
            quiz.description = Some(description.clone());
        }
        if let Some(difficulty) = patch.difficulty {
            quiz.difficulty = difficulty;
        }
        if let Some(minutes) = patch.time_limit_minutes {
            quiz.time_limit_minutes = NonZeroU32::new(minutes);
        }
        if let Some(assessment) = patch.assessment {
            quiz.assessment = assessment;
        }
        if let Some(questions) = &patch.questions {
            quiz.questions = questions.clone();
        }
        Ok(quiz.clone())
    }

    async fn delete_quiz(&self, id: Uuid) -> Result<(), StoreError> {
        self.tally();
        self.quizzes
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("quiz {id}")))
    }
}

#[async_trait]
impl AttemptStore for MemoryStore {
    async fn submit_attempt(&self, attempt: &NewAttempt) -> Result<Attempt, StoreError> {
        self.tally();
        let persisted = Attempt {
            id: Uuid::new_v4(),
            quiz_ref: attempt.quiz_ref,
            user_ref: attempt.user_ref,
            answers: attempt.answers.clone(),
            flagged: Default::default(),
            remaining_seconds: 0,
            state: AttemptState::Submitted,
            score: Some(attempt.score),
            duration_seconds: attempt.duration_seconds,
            submitted_at: Some(Utc::now()),
        };
        self.attempts.lock().unwrap().push(persisted.clone());
        Ok(persisted)
    }

    async fn attempts_for_quiz(&self, quiz_ref: Uuid) -> Result<Vec<Attempt>, StoreError> {
        self.tally();
        Ok(self
            .attempts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.quiz_ref == quiz_ref)
            .cloned()
            .collect())
    }

    async fn attempts_for_user(&self, user_ref: Uuid) -> Result<Vec<Attempt>, StoreError> {
        self.tally();
        Ok(self
            .attempts
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.user_ref == user_ref)
            .cloned()
            .collect())
    }
}
