//! The `edukit stats` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use uuid::Uuid;

use edukit_client::{load_config_from, HttpStore};
use edukit_core::statistics::{GradingConfig, StatsEngine};
use edukit_core::traits::{AttemptStore, QuizStore};

pub async fn execute(quiz_id: Option<Uuid>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let store = Arc::new(HttpStore::with_timeout(
        &config.base_url,
        config.api_token.clone(),
        config.timeout_secs,
    ));
    let engine = StatsEngine::new(
        Arc::clone(&store) as Arc<dyn QuizStore>,
        Arc::clone(&store) as Arc<dyn AttemptStore>,
        GradingConfig {
            pass_threshold: config.pass_threshold,
        },
    );

    match quiz_id {
        Some(id) => {
            let quiz = store
                .fetch_quiz(id)
                .await
                .with_context(|| format!("failed to fetch quiz {id}"))?;
            let stats = engine
                .quiz_stats(id)
                .await
                .with_context(|| format!("failed to aggregate attempts for quiz {id}"))?;

            println!("Quiz: {}\n", quiz.title);
            let mut table = Table::new();
            table.set_header(vec!["Attempts", "Average score", "Pass rate"]);
            table.add_row(vec![
                Cell::new(stats.total_attempts),
                Cell::new(stats.average_score),
                Cell::new(format!("{}%", stats.pass_rate)),
            ]);
            println!("{table}");
        }
        None => {
            let stats = engine
                .global_stats()
                .await
                .context("failed to aggregate global statistics")?;

            let mut table = Table::new();
            table.set_header(vec!["Quizzes", "Attempts", "Average score"]);
            table.add_row(vec![
                Cell::new(stats.total_quizzes),
                Cell::new(stats.total_attempts),
                Cell::new(stats.average_score),
            ]);
            println!("{table}");
        }
    }

    Ok(())
}
