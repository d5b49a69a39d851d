//! Store trait definitions for the remote persistence collaborator.
//!
//! These async traits are implemented by `edukit-client` (HTTP and
//! in-memory). The engine only ever sees record shapes; transport is the
//! client crate's concern.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{AnswerValue, AssessmentKind, Attempt, Difficulty, Quiz};

/// Quiz persistence: fetch plus the authoring CRUD surface.
#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn fetch_quiz(&self, id: Uuid) -> Result<Quiz, StoreError>;

    async fn list_quizzes(&self) -> Result<Vec<Quiz>, StoreError>;

    /// Persist a quiz produced by the normalizer; returns the stored record.
    async fn create_quiz(&self, quiz: &Quiz) -> Result<Quiz, StoreError>;

    /// Partial update; unset fields are left as stored.
    async fn update_quiz(&self, id: Uuid, patch: &QuizPatch) -> Result<Quiz, StoreError>;

    async fn delete_quiz(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Attempt persistence: submission and history listing.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Submit a finished attempt; the store assigns id and timestamp.
    async fn submit_attempt(&self, attempt: &NewAttempt) -> Result<Attempt, StoreError>;

    async fn attempts_for_quiz(&self, quiz_ref: Uuid) -> Result<Vec<Attempt>, StoreError>;

    async fn attempts_for_user(&self, user_ref: Uuid) -> Result<Vec<Attempt>, StoreError>;
}

/// The submission record for a finished attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAttempt {
    #[serde(rename = "userRef", alias = "user_ref")]
    pub user_ref: Uuid,
    #[serde(rename = "quizRef", alias = "quiz_ref")]
    pub quiz_ref: Uuid,
    /// Final score in 0..=100.
    pub score: u8,
    #[serde(rename = "durationSeconds", alias = "duration_seconds")]
    pub duration_seconds: u64,
    #[serde(default)]
    pub answers: BTreeMap<Uuid, AnswerValue>,
}

/// Partial quiz update. `None` means "leave unchanged"; `questions` replaces
/// the whole list when present.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct QuizPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(
        default,
        rename = "timeLimitMinutes",
        alias = "time_limit_minutes",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_limit_minutes: Option<u32>,
    #[serde(
        default,
        rename = "assessmentType",
        alias = "assessment_type",
        skip_serializing_if = "Option::is_none"
    )]
    pub assessment: Option<AssessmentKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<crate::model::Question>>,
}
