//! TOML quiz authoring parser.
//!
//! Loads quiz drafts from TOML files and directories, and reports advisory
//! validation warnings. Parsed files feed the normalizer; hard validation
//! happens at serialize time.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::normalize::{OptionDraft, QuestionDraft, QuizDraft};

/// Intermediate TOML structure for quiz files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    time_limit_minutes: Option<u32>,
    #[serde(default)]
    assessment_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    text: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    points: Option<u32>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    correct_index: Option<usize>,
    #[serde(default)]
    correct_indexes: Vec<usize>,
    #[serde(default)]
    accepted_answers: Vec<String>,
}

/// Parse a single TOML file into a `QuizDraft`.
pub fn parse_quiz_file(path: &Path) -> Result<QuizDraft> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;
    parse_quiz_str(&content, path)
}

/// Parse a TOML string into a `QuizDraft` (useful for testing).
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<QuizDraft> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let mut draft = QuizDraft::new(parsed.quiz.title);
    draft.description = parsed.quiz.description.filter(|d| !d.trim().is_empty());
    if let Some(difficulty) = parsed.quiz.difficulty.as_deref() {
        draft.difficulty = difficulty
            .parse()
            .map_err(|e: String| anyhow::anyhow!("{e}"))?;
    }
    draft.time_limit_minutes = parsed
        .quiz
        .time_limit_minutes
        .and_then(std::num::NonZeroU32::new);
    if let Some(assessment) = parsed.quiz.assessment_type.as_deref() {
        draft.assessment = assessment
            .parse()
            .map_err(|e: String| anyhow::anyhow!("{e}"))?;
    }

    draft.questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let kind = match q.kind.as_deref() {
                Some(k) => k.parse().map_err(|e: String| anyhow::anyhow!("{e}"))?,
                None => crate::model::QuestionKind::SingleChoice,
            };
            let mut question = QuestionDraft::new(kind);
            question.text = q.text;
            question.points = q.points.unwrap_or(1).max(1);
            question.explanation = q.explanation.filter(|e| !e.trim().is_empty());
            if !q.options.is_empty() {
                question.options = q
                    .options
                    .into_iter()
                    .enumerate()
                    .map(|(i, text)| {
                        let correct = match kind {
                            crate::model::QuestionKind::SingleChoice => {
                                Some(i) == q.correct_index
                            }
                            crate::model::QuestionKind::MultiSelect => {
                                q.correct_indexes.contains(&i)
                            }
                            crate::model::QuestionKind::FillBlank => false,
                        };
                        OptionDraft::new(text, correct)
                    })
                    .collect();
            }
            if !q.accepted_answers.is_empty() {
                question.accepted_answers = q.accepted_answers;
            }
            Ok(question)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(draft)
}

/// Recursively load all `.toml` quiz files from a directory. Files that
/// fail to parse are skipped with a warning.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<QuizDraft>> {
    let mut drafts = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            drafts.extend(load_quiz_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_quiz_file(&path) {
                Ok(draft) => drafts.push(draft),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(drafts)
}

/// A warning from quiz validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question's position in the quiz, if applicable.
    pub question: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Validate a quiz draft for common authoring issues. Advisory only; hard
/// failures surface from `QuizDraft::serialize`.
pub fn validate_quiz(draft: &QuizDraft) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if draft.questions.is_empty() {
        warnings.push(ValidationWarning {
            question: None,
            message: "quiz has no questions and cannot be attempted".into(),
        });
    }

    // Duplicate prompts usually mean a copy-paste slip.
    let mut seen = std::collections::HashSet::new();
    for (i, q) in draft.questions.iter().enumerate() {
        let prompt = q.text.trim().to_lowercase();
        if !prompt.is_empty() && !seen.insert(prompt) {
            warnings.push(ValidationWarning {
                question: Some(i),
                message: format!("duplicate question text: {}", q.text.trim()),
            });
        }
    }

    for (i, q) in draft.questions.iter().enumerate() {
        if q.text.trim().is_empty() {
            warnings.push(ValidationWarning {
                question: Some(i),
                message: "question text is empty".into(),
            });
        }
        if !draft.assessment.allows(q.kind) {
            warnings.push(ValidationWarning {
                question: Some(i),
                message: format!(
                    "{} question will be excluded from a {} quiz",
                    q.kind.label(),
                    draft.assessment.label()
                ),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssessmentKind, Difficulty, QuestionKind};
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[quiz]
title = "European Capitals"
description = "Warm-up geography quiz"
difficulty = "basic"
time_limit_minutes = 10
assessment_type = "mixed"

[[questions]]
text = "What is the capital of France?"
type = "single_choice"
options = ["Paris", "London", "Berlin"]
correct_index = 0
explanation = "Paris has been the capital since 987."

[[questions]]
text = "Which of these are in Germany?"
type = "multi_select"
options = ["Berlin", "Vienna", "Munich"]
correct_indexes = [0, 2]

[[questions]]
text = "Name the capital of Italy."
type = "fill_blank"
accepted_answers = ["Rome", "Roma"]
"#;

    #[test]
    fn parse_valid_quiz() {
        let draft = parse_quiz_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(draft.title, "European Capitals");
        assert_eq!(draft.difficulty, Difficulty::Basic);
        assert_eq!(draft.time_limit_minutes.unwrap().get(), 10);
        assert_eq!(draft.questions.len(), 3);
        assert_eq!(draft.questions[1].kind, QuestionKind::MultiSelect);
        assert!(draft.questions[1].options[2].correct);
        assert_eq!(
            draft.questions[2].accepted_answers,
            vec!["Rome".to_string(), "Roma".to_string()]
        );

        let serialized = draft.serialize().unwrap();
        assert_eq!(serialized.quiz.questions.len(), 3);
        assert!(serialized.rejected.is_empty());
    }

    #[test]
    fn parse_minimal_quiz_defaults() {
        let toml = r#"
[quiz]
title = "Minimal"

[[questions]]
text = "Pick one"
options = ["a", "b"]
"#;
        let draft = parse_quiz_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(draft.difficulty, Difficulty::Basic);
        assert_eq!(draft.assessment, AssessmentKind::Mixed);
        assert!(draft.time_limit_minutes.is_none());
        assert_eq!(draft.questions[0].kind, QuestionKind::SingleChoice);
        // No correct marker in the file; serialize falls back to index 0.
        let q = draft.questions[0].serialize().unwrap();
        match q.schema {
            crate::model::AnswerSchema::SingleChoice { correct_index, .. } => {
                assert_eq!(correct_index, 0)
            }
            other => panic!("unexpected schema: {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_unknown_difficulty() {
        let toml = r#"
[quiz]
title = "Bad"
difficulty = "impossible"
"#;
        assert!(parse_quiz_str(toml, &PathBuf::from("test.toml")).is_err());
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_quiz_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn validate_flags_duplicates_and_mismatches() {
        let toml = r#"
[quiz]
title = "Lint me"
assessment_type = "quiz"

[[questions]]
text = "Same prompt"
options = ["a", "b"]
correct_index = 0

[[questions]]
text = "same prompt"
options = ["a", "b"]
correct_index = 1

[[questions]]
text = "A blank"
type = "fill_blank"
accepted_answers = ["x"]
"#;
        let draft = parse_quiz_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_quiz(&draft);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("will be excluded")));
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("capitals.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not toml [").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let drafts = load_quiz_directory(dir.path()).unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, "European Capitals");
    }
}
