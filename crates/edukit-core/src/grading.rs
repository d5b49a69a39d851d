//! Grading: scores a finished attempt's answers against a quiz.
//!
//! Grading is a total function over well-formed input and is threshold-free;
//! the pass threshold belongs to reporting (see [`crate::statistics`]).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{AnswerSchema, AnswerValue, Quiz};

/// Per-question grading outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub question_id: Uuid,
    pub correct: bool,
    /// Whether the learner answered at all. Unanswered is always incorrect.
    pub answered: bool,
    /// Point weight of the question, for reporting.
    pub points: u32,
    /// Explanation to surface alongside the verdict, when authored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// The result of grading one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeReport {
    /// Integer score in 0..=100.
    pub score: u8,
    pub correct_count: usize,
    pub total_questions: usize,
    pub verdicts: Vec<Verdict>,
}

impl GradeReport {
    /// Whether the score clears the given pass threshold.
    pub fn passed(&self, threshold: u8) -> bool {
        self.score >= threshold
    }
}

/// Normalize free-text input for comparison: trim, casefold, and collapse
/// whitespace runs to a single space.
pub fn normalize_text(s: &str) -> String {
    s.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_correct(schema: &AnswerSchema, answer: &AnswerValue) -> bool {
    match (schema, answer) {
        (
            AnswerSchema::SingleChoice { correct_index, .. },
            AnswerValue::Choice(chosen),
        ) => chosen == correct_index,
        (
            AnswerSchema::MultiSelect {
                correct_indexes, ..
            },
            AnswerValue::Selection(chosen),
        ) => chosen == correct_indexes,
        (
            AnswerSchema::FillBlank { accepted_answers },
            AnswerValue::Text(submitted),
        ) => {
            let submitted = normalize_text(submitted);
            accepted_answers
                .iter()
                .any(|a| normalize_text(a) == submitted)
        }
        // A wrong-shaped stored value cannot match anything.
        _ => false,
    }
}

/// Grade the given answers against a quiz.
///
/// Every question is scored; unanswered questions count as incorrect, never
/// as exempted. The score is `round(100 * correct / total)`.
pub fn grade(quiz: &Quiz, answers: &BTreeMap<Uuid, AnswerValue>) -> GradeReport {
    let total_questions = quiz.questions.len();
    let mut verdicts = Vec::with_capacity(total_questions);
    let mut correct_count = 0usize;

    for question in &quiz.questions {
        let answer = answers.get(&question.id);
        let correct = answer.is_some_and(|a| is_correct(&question.schema, a));
        if correct {
            correct_count += 1;
        }
        verdicts.push(Verdict {
            question_id: question.id,
            correct,
            answered: answer.is_some(),
            points: question.points,
            explanation: question.explanation.clone(),
        });
    }

    let score = if total_questions == 0 {
        0
    } else {
        ((100.0 * correct_count as f64 / total_questions as f64).round()) as u8
    };

    GradeReport {
        score,
        correct_count,
        total_questions,
        verdicts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AssessmentKind, Difficulty, Question, QuestionKind};
    use std::collections::BTreeSet;

    fn single_choice(options: &[&str], correct: usize) -> Question {
        Question {
            id: Uuid::new_v4(),
            text: "q".into(),
            points: 1,
            explanation: None,
            schema: AnswerSchema::SingleChoice {
                options: options.iter().map(|s| s.to_string()).collect(),
                correct_index: correct,
            },
        }
    }

    fn quiz_with(questions: Vec<Question>) -> Quiz {
        Quiz {
            id: Uuid::new_v4(),
            title: "test".into(),
            description: None,
            difficulty: Difficulty::Basic,
            time_limit_minutes: None,
            assessment: AssessmentKind::Mixed,
            lesson_ref: None,
            questions,
        }
    }

    #[test]
    fn single_choice_exact_index() {
        let q = single_choice(&["A", "B", "C"], 1);
        let qid = q.id;
        let quiz = quiz_with(vec![q]);

        let right = BTreeMap::from([(qid, AnswerValue::Choice(1))]);
        assert_eq!(grade(&quiz, &right).score, 100);

        let wrong = BTreeMap::from([(qid, AnswerValue::Choice(0))]);
        assert_eq!(grade(&quiz, &wrong).score, 0);
    }

    #[test]
    fn multi_select_requires_exact_set() {
        let q = Question {
            id: Uuid::new_v4(),
            text: "q".into(),
            points: 1,
            explanation: None,
            schema: AnswerSchema::MultiSelect {
                options: vec!["a".into(), "b".into(), "c".into()],
                correct_indexes: BTreeSet::from([0, 2]),
            },
        };
        let qid = q.id;
        let quiz = quiz_with(vec![q]);

        let exact = BTreeMap::from([(qid, AnswerValue::Selection(BTreeSet::from([0, 2])))]);
        assert_eq!(grade(&quiz, &exact).score, 100);

        // Subset gets no partial credit.
        let subset = BTreeMap::from([(qid, AnswerValue::Selection(BTreeSet::from([0])))]);
        assert_eq!(grade(&quiz, &subset).score, 0);

        let superset =
            BTreeMap::from([(qid, AnswerValue::Selection(BTreeSet::from([0, 1, 2])))]);
        assert_eq!(grade(&quiz, &superset).score, 0);
    }

    #[test]
    fn fill_blank_normalizes_case_and_whitespace() {
        let q = Question {
            id: Uuid::new_v4(),
            text: "Capital of France?".into(),
            points: 1,
            explanation: None,
            schema: AnswerSchema::FillBlank {
                accepted_answers: vec!["Paris".into()],
            },
        };
        let qid = q.id;
        let quiz = quiz_with(vec![q]);

        let padded = BTreeMap::from([(qid, AnswerValue::Text("  paris  ".into()))]);
        assert_eq!(grade(&quiz, &padded).score, 100);

        let misspelled = BTreeMap::from([(qid, AnswerValue::Text("Pariss".into()))]);
        assert_eq!(grade(&quiz, &misspelled).score, 0);
    }

    #[test]
    fn fill_blank_collapses_inner_whitespace() {
        let q = Question {
            id: Uuid::new_v4(),
            text: "Province?".into(),
            points: 1,
            explanation: None,
            schema: AnswerSchema::FillBlank {
                accepted_answers: vec!["Lâm Đồng".into(), "lam dong".into()],
            },
        };
        let qid = q.id;
        let quiz = quiz_with(vec![q]);

        let spaced = BTreeMap::from([(qid, AnswerValue::Text("LAM \t DONG".into()))]);
        assert_eq!(grade(&quiz, &spaced).score, 100);
    }

    #[test]
    fn unanswered_counts_as_incorrect() {
        let questions: Vec<Question> = (0..4).map(|_| single_choice(&["a", "b"], 0)).collect();
        let ids: Vec<Uuid> = questions.iter().map(|q| q.id).collect();
        let quiz = quiz_with(questions);

        // Answer only two of four, both correctly.
        let answers = BTreeMap::from([
            (ids[0], AnswerValue::Choice(0)),
            (ids[1], AnswerValue::Choice(0)),
        ]);
        let report = grade(&quiz, &answers);
        assert_eq!(report.score, 50);
        assert_eq!(report.correct_count, 2);
        assert!(!report.verdicts[2].answered);
        assert!(!report.verdicts[2].correct);
    }

    #[test]
    fn wrong_shaped_answer_scores_incorrect() {
        let q = single_choice(&["a", "b"], 0);
        let qid = q.id;
        let quiz = quiz_with(vec![q]);

        let answers = BTreeMap::from([(qid, AnswerValue::Text("a".into()))]);
        assert_eq!(grade(&quiz, &answers).score, 0);
    }

    #[test]
    fn score_rounds_to_nearest_integer() {
        let questions: Vec<Question> = (0..3).map(|_| single_choice(&["a", "b"], 0)).collect();
        let ids: Vec<Uuid> = questions.iter().map(|q| q.id).collect();
        let quiz = quiz_with(questions);

        let answers = BTreeMap::from([(ids[0], AnswerValue::Choice(0))]);
        // 1/3 → 33, 2/3 → 67
        assert_eq!(grade(&quiz, &answers).score, 33);

        let answers = BTreeMap::from([
            (ids[0], AnswerValue::Choice(0)),
            (ids[1], AnswerValue::Choice(0)),
        ]);
        assert_eq!(grade(&quiz, &answers).score, 67);
    }

    #[test]
    fn pass_threshold_is_reporting_only() {
        let q = single_choice(&["a", "b"], 0);
        let qid = q.id;
        let quiz = quiz_with(vec![q]);
        let report = grade(&quiz, &BTreeMap::from([(qid, AnswerValue::Choice(0))]));
        assert!(report.passed(70));
        assert!(report.passed(100));
        assert!(!grade(&quiz, &BTreeMap::new()).passed(70));
    }
}
