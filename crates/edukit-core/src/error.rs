//! Store and contract error types.
//!
//! `StoreError` is defined in `edukit-core` so callers can classify
//! persistence failures for retry decisions without string matching.

use thiserror::Error;

use crate::model::QuestionKind;

/// Errors from the remote persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (missing or invalid token).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),
}

impl StoreError {
    /// Returns `true` if this error is permanent and should not be retried.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            StoreError::AuthenticationFailed(_) | StoreError::NotFound(_)
        )
    }

    /// Returns the retry-after delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            StoreError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}

/// Caller-side programming errors: a value whose shape does not match the
/// question variant, or an operation on a finished attempt. These are never
/// user-facing conditions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContractError {
    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(uuid::Uuid),

    #[error("answer shape {got} does not match {expected} question")]
    AnswerShape {
        expected: QuestionKind,
        got: &'static str,
    },

    #[error("attempt is already finalized")]
    AttemptFinished,

    #[error("question index {index} out of bounds for {len} questions")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("quiz has no questions and cannot be attempted")]
    QuizNotAttemptable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanence_classification() {
        assert!(StoreError::NotFound("quiz".into()).is_permanent());
        assert!(StoreError::AuthenticationFailed("bad token".into()).is_permanent());
        assert!(!StoreError::Timeout(30).is_permanent());
        assert!(!StoreError::RateLimited { retry_after_ms: 500 }.is_permanent());
    }

    #[test]
    fn retry_after_hint() {
        let err = StoreError::RateLimited {
            retry_after_ms: 2000,
        };
        assert_eq!(err.retry_after_ms(), Some(2000));
        assert_eq!(StoreError::Network("reset".into()).retry_after_ms(), None);
    }
}
