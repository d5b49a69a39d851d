//! The `edukit grade` command: offline grading of an answers file.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use uuid::Uuid;

use edukit_core::grading::grade;
use edukit_core::model::{AnswerValue, Quiz};
use edukit_core::statistics::DEFAULT_PASS_THRESHOLD;

pub fn execute(quiz_path: PathBuf, answers_path: PathBuf, threshold: Option<u8>) -> Result<()> {
    let draft = edukit_core::parser::parse_quiz_file(&quiz_path)?;
    let serialized = draft
        .serialize()
        .with_context(|| format!("quiz is not valid: {}", quiz_path.display()))?;
    for rejected in &serialized.rejected {
        tracing::warn!("excluded from grading: {rejected}");
    }
    let quiz = serialized.quiz;

    let answers = read_answers(&answers_path, &quiz)?;
    let report = grade(&quiz, &answers);

    let mut table = Table::new();
    table.set_header(vec!["#", "Question", "Answered", "Correct"]);
    for (i, verdict) in report.verdicts.iter().enumerate() {
        let question = quiz
            .question(verdict.question_id)
            .map(|q| q.text.as_str())
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(truncate(question, 60)),
            Cell::new(if verdict.answered { "yes" } else { "no" }),
            Cell::new(if verdict.correct { "✓" } else { "✗" }),
        ]);
    }
    println!("{table}");

    let threshold = threshold
        .or_else(|| {
            edukit_client::load_config()
                .ok()
                .map(|c| c.pass_threshold)
        })
        .unwrap_or(DEFAULT_PASS_THRESHOLD);

    println!(
        "\nScore: {} ({}/{} correct)",
        report.score, report.correct_count, report.total_questions
    );
    if report.passed(threshold) {
        println!("Result: PASS (threshold {threshold})");
    } else {
        println!("Result: FAIL (threshold {threshold})");
    }

    Ok(())
}

/// Answers files map a question (1-based number or id) to an answer value:
/// an option index, an index array, or a string.
fn read_answers(path: &PathBuf, quiz: &Quiz) -> Result<BTreeMap<Uuid, AnswerValue>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answers file: {}", path.display()))?;
    let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse answers JSON: {}", path.display()))?;

    let mut answers = BTreeMap::new();
    for (key, value) in raw {
        let question_id = if let Ok(id) = key.parse::<Uuid>() {
            id
        } else {
            let number: usize = key
                .parse()
                .with_context(|| format!("answer key is neither a question id nor a number: {key}"))?;
            quiz.questions
                .get(number.checked_sub(1).unwrap_or(usize::MAX))
                .map(|q| q.id)
                .with_context(|| format!("no question number {number} in this quiz"))?
        };
        let value: AnswerValue = serde_json::from_value(value)
            .with_context(|| format!("unrecognized answer shape for {key}"))?;
        answers.insert(question_id, value);
    }
    Ok(answers)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
