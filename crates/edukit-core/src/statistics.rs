//! Attempt-history aggregation: per-quiz and global metrics.
//!
//! Pure reductions over finalized attempt records; empty input yields
//! zeroed metrics, never a division error. [`StatsEngine`] wraps the
//! reductions behind injected store handles.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{Attempt, Quiz};
use crate::traits::{AttemptStore, QuizStore};

/// Default pass threshold, in percent.
pub const DEFAULT_PASS_THRESHOLD: u8 = 70;

/// Reporting configuration. Grading itself is threshold-free; the threshold
/// only decides what counts as a pass in aggregates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GradingConfig {
    pub pass_threshold: u8,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            pass_threshold: DEFAULT_PASS_THRESHOLD,
        }
    }
}

/// Aggregates for one quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizStats {
    pub total_attempts: usize,
    /// Mean score, rounded to the nearest integer.
    pub average_score: u8,
    /// Percentage of attempts at or above the pass threshold, rounded.
    pub pass_rate: u8,
}

impl QuizStats {
    pub const ZERO: QuizStats = QuizStats {
        total_attempts: 0,
        average_score: 0,
        pass_rate: 0,
    };
}

/// Aggregates across every quiz and attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_quizzes: usize,
    pub total_attempts: usize,
    pub average_score: u8,
}

/// Only terminal attempts carry a score; in-progress records are ignored
/// entirely so the counts and the averages agree.
fn finalized(attempts: &[Attempt]) -> impl Iterator<Item = &Attempt> {
    attempts.iter().filter(|a| a.state.is_terminal())
}

fn rounded_mean(scores: &[u8]) -> u8 {
    if scores.is_empty() {
        return 0;
    }
    let sum: u64 = scores.iter().map(|s| u64::from(*s)).sum();
    ((sum as f64 / scores.len() as f64).round()) as u8
}

/// Reduce one quiz's attempt history. Non-terminal attempts are excluded
/// from every metric, including the attempt count.
pub fn quiz_stats(attempts: &[Attempt], config: GradingConfig) -> QuizStats {
    let terminal: Vec<&Attempt> = finalized(attempts).collect();
    let scores: Vec<u8> = terminal.iter().filter_map(|a| a.score).collect();
    let passed = scores
        .iter()
        .filter(|s| **s >= config.pass_threshold)
        .count();
    let pass_rate = if scores.is_empty() {
        0
    } else {
        ((100.0 * passed as f64 / scores.len() as f64).round()) as u8
    };
    QuizStats {
        total_attempts: terminal.len(),
        average_score: rounded_mean(&scores),
        pass_rate,
    }
}

/// Reduce the whole corpus.
pub fn global_stats(quizzes: &[Quiz], attempts: &[Attempt]) -> GlobalStats {
    let terminal: Vec<&Attempt> = finalized(attempts).collect();
    let scores: Vec<u8> = terminal.iter().filter_map(|a| a.score).collect();
    GlobalStats {
        total_quizzes: quizzes.len(),
        total_attempts: terminal.len(),
        average_score: rounded_mean(&scores),
    }
}

/// Statistics over stored attempt history. Store handles are injected;
/// there is no ambient quiz or attempt collection anywhere in the engine.
pub struct StatsEngine {
    quizzes: Arc<dyn QuizStore>,
    attempts: Arc<dyn AttemptStore>,
    config: GradingConfig,
}

impl StatsEngine {
    pub fn new(
        quizzes: Arc<dyn QuizStore>,
        attempts: Arc<dyn AttemptStore>,
        config: GradingConfig,
    ) -> Self {
        Self {
            quizzes,
            attempts,
            config,
        }
    }

    pub async fn quiz_stats(&self, quiz_id: Uuid) -> Result<QuizStats, StoreError> {
        let attempts = self.attempts.attempts_for_quiz(quiz_id).await?;
        Ok(quiz_stats(&attempts, self.config))
    }

    pub async fn global_stats(&self) -> Result<GlobalStats, StoreError> {
        let quizzes = self.quizzes.list_quizzes().await?;

        let mut futures: FuturesUnordered<_> = quizzes
            .iter()
            .map(|quiz| self.attempts.attempts_for_quiz(quiz.id))
            .collect();

        let mut attempts = Vec::new();
        while let Some(batch) = futures.next().await {
            attempts.extend(batch?);
        }
        Ok(global_stats(&quizzes, &attempts))
    }
}
