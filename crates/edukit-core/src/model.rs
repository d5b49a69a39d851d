//! Core data model types for edukit.
//!
//! These are the fundamental types the entire assessment engine uses to
//! represent quizzes, questions, answer schemas, and attempts.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The three supported question variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    SingleChoice,
    MultiSelect,
    FillBlank,
}

impl QuestionKind {
    /// Human-readable name for author-facing messages. `Display` emits the
    /// wire token instead.
    pub fn label(&self) -> &'static str {
        match self {
            QuestionKind::SingleChoice => "single-choice",
            QuestionKind::MultiSelect => "multi-select",
            QuestionKind::FillBlank => "fill-in-the-blank",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::SingleChoice => write!(f, "single_choice"),
            QuestionKind::MultiSelect => write!(f, "multi_select"),
            QuestionKind::FillBlank => write!(f, "fill_blank"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single_choice" | "single-choice" | "quiz" => Ok(QuestionKind::SingleChoice),
            "multi_select" | "multi-select" | "multi_choice" => Ok(QuestionKind::MultiSelect),
            "fill_blank" | "fill-blank" | "fill_in_blank" => Ok(QuestionKind::FillBlank),
            other => Err(format!("unknown question kind: {other}")),
        }
    }
}

/// Variant-specific correctness data attached to a question.
///
/// The tag doubles as the question's kind, so a schema/kind mismatch is
/// unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnswerSchema {
    SingleChoice {
        options: Vec<String>,
        #[serde(rename = "correctIndex", alias = "correct_index")]
        correct_index: usize,
    },
    MultiSelect {
        options: Vec<String>,
        #[serde(rename = "correctIndexes", alias = "correct_indexes")]
        correct_indexes: BTreeSet<usize>,
    },
    FillBlank {
        #[serde(rename = "acceptedAnswers", alias = "accepted_answers")]
        accepted_answers: Vec<String>,
    },
}

impl AnswerSchema {
    pub fn kind(&self) -> QuestionKind {
        match self {
            AnswerSchema::SingleChoice { .. } => QuestionKind::SingleChoice,
            AnswerSchema::MultiSelect { .. } => QuestionKind::MultiSelect,
            AnswerSchema::FillBlank { .. } => QuestionKind::FillBlank,
        }
    }

    /// Whether this schema satisfies its variant's shape invariants:
    /// choice variants need at least two options and in-bounds correctness
    /// markers, fill-blank needs at least one non-empty accepted answer.
    pub fn is_well_formed(&self) -> bool {
        match self {
            AnswerSchema::SingleChoice {
                options,
                correct_index,
            } => options.len() >= 2 && *correct_index < options.len(),
            AnswerSchema::MultiSelect {
                options,
                correct_indexes,
            } => {
                options.len() >= 2
                    && !correct_indexes.is_empty()
                    && correct_indexes.iter().all(|i| *i < options.len())
            }
            AnswerSchema::FillBlank { accepted_answers } => {
                !accepted_answers.is_empty()
                    && accepted_answers.iter().all(|a| !a.trim().is_empty())
            }
        }
    }
}

/// A single quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier for this question.
    pub id: Uuid,
    /// The question prompt shown to the learner.
    pub text: String,
    /// Point weight; informational, at least 1.
    #[serde(default = "default_points")]
    pub points: u32,
    /// Optional explanation shown after grading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Variant-specific correctness data.
    #[serde(rename = "answerSchema", alias = "answer_schema")]
    pub schema: AnswerSchema,
}

fn default_points() -> u32 {
    1
}

impl Question {
    pub fn kind(&self) -> QuestionKind {
        self.schema.kind()
    }
}

/// Quiz difficulty, ordered from easiest to hardest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Basic,
    Intermediate,
    Advanced,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Basic
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Basic => write!(f, "basic"),
            Difficulty::Intermediate => write!(f, "intermediate"),
            Difficulty::Advanced => write!(f, "advanced"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "basic" | "beginner" | "easy" => Ok(Difficulty::Basic),
            "intermediate" | "medium" => Ok(Difficulty::Intermediate),
            "advanced" | "hard" => Ok(Difficulty::Advanced),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Quiz-level restriction on question variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssessmentKind {
    #[serde(rename = "mixed")]
    Mixed,
    #[serde(rename = "quiz")]
    SingleChoiceOnly,
    #[serde(rename = "multi_choice")]
    MultiSelectOnly,
    #[serde(rename = "fill_blank")]
    FillBlankOnly,
}

impl Default for AssessmentKind {
    fn default() -> Self {
        AssessmentKind::Mixed
    }
}

impl AssessmentKind {
    /// Whether a question of the given kind may appear in a quiz of this
    /// assessment kind.
    pub fn allows(&self, kind: QuestionKind) -> bool {
        match self {
            AssessmentKind::Mixed => true,
            AssessmentKind::SingleChoiceOnly => kind == QuestionKind::SingleChoice,
            AssessmentKind::MultiSelectOnly => kind == QuestionKind::MultiSelect,
            AssessmentKind::FillBlankOnly => kind == QuestionKind::FillBlank,
        }
    }

    /// Human-readable name for author-facing messages. `Display` emits the
    /// wire token instead.
    pub fn label(&self) -> &'static str {
        match self {
            AssessmentKind::Mixed => "mixed",
            AssessmentKind::SingleChoiceOnly => "single-choice only",
            AssessmentKind::MultiSelectOnly => "multi-select only",
            AssessmentKind::FillBlankOnly => "fill-in-the-blank only",
        }
    }
}

impl fmt::Display for AssessmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssessmentKind::Mixed => write!(f, "mixed"),
            AssessmentKind::SingleChoiceOnly => write!(f, "quiz"),
            AssessmentKind::MultiSelectOnly => write!(f, "multi_choice"),
            AssessmentKind::FillBlankOnly => write!(f, "fill_blank"),
        }
    }
}

impl FromStr for AssessmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mixed" => Ok(AssessmentKind::Mixed),
            "quiz" | "single_choice" => Ok(AssessmentKind::SingleChoiceOnly),
            "multi_choice" | "multi_select" => Ok(AssessmentKind::MultiSelectOnly),
            "fill_blank" => Ok(AssessmentKind::FillBlankOnly),
            other => Err(format!("unknown assessment kind: {other}")),
        }
    }
}

/// A quiz as exchanged with the persistence service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    /// Unique identifier for this quiz.
    pub id: Uuid,
    /// Quiz title.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Time limit in minutes; absent means untimed.
    #[serde(
        default,
        rename = "timeLimitMinutes",
        alias = "time_limit_minutes",
        skip_serializing_if = "Option::is_none"
    )]
    pub time_limit_minutes: Option<NonZeroU32>,
    #[serde(default, rename = "assessmentType", alias = "assessment_type")]
    pub assessment: AssessmentKind,
    /// Optional reference to the lesson this quiz belongs to.
    #[serde(
        default,
        rename = "lessonRef",
        alias = "lesson_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub lesson_ref: Option<Uuid>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Quiz {
    /// A quiz needs at least one question to be attemptable.
    pub fn is_attemptable(&self) -> bool {
        !self.questions.is_empty()
    }

    pub fn question(&self, id: Uuid) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Time limit converted to seconds, if the quiz is timed. Saturates on
    /// absurd wire values rather than overflowing.
    pub fn time_limit_seconds(&self) -> Option<u32> {
        self.time_limit_minutes.map(|m| m.get().saturating_mul(60))
    }
}

/// A learner's stored answer for one question.
///
/// Untagged on the wire: an integer, an index array, or a string, matching
/// the question variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Choice(usize),
    Selection(BTreeSet<usize>),
    Text(String),
}

impl AnswerValue {
    /// Whether this value has the shape the given question kind expects.
    pub fn matches(&self, kind: QuestionKind) -> bool {
        matches!(
            (self, kind),
            (AnswerValue::Choice(_), QuestionKind::SingleChoice)
                | (AnswerValue::Selection(_), QuestionKind::MultiSelect)
                | (AnswerValue::Text(_), QuestionKind::FillBlank)
        )
    }

    /// Short shape name used in contract-error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            AnswerValue::Choice(_) => "choice index",
            AnswerValue::Selection(_) => "index set",
            AnswerValue::Text(_) => "text",
        }
    }
}

/// Attempt lifecycle state. `Submitted` and `TimedOut` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
    InProgress,
    Submitted,
    TimedOut,
}

impl AttemptState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AttemptState::Submitted | AttemptState::TimedOut)
    }
}

/// A persisted attempt record.
///
/// Mutated only through [`crate::attempt::AttemptSession`] while in
/// progress; immutable once terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    /// Unique identifier, assigned by the store.
    pub id: Uuid,
    #[serde(rename = "quizRef", alias = "quiz_ref")]
    pub quiz_ref: Uuid,
    #[serde(rename = "userRef", alias = "user_ref")]
    pub user_ref: Uuid,
    /// Answers keyed by question id.
    #[serde(default)]
    pub answers: BTreeMap<Uuid, AnswerValue>,
    /// Advisory review marks; no grading effect.
    #[serde(default)]
    pub flagged: BTreeSet<Uuid>,
    /// Seconds left on the countdown when the attempt ended; 0 for untimed.
    #[serde(default, rename = "remainingSeconds", alias = "remaining_seconds")]
    pub remaining_seconds: u32,
    pub state: AttemptState,
    /// Final score in 0..=100, populated only in terminal states.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
    /// Wall-clock seconds spent on the attempt.
    #[serde(default, rename = "durationSeconds", alias = "duration_seconds")]
    pub duration_seconds: u64,
    /// When the store accepted the attempt.
    #[serde(
        default,
        rename = "submittedAt",
        alias = "submitted_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub submitted_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_kind_display_and_parse() {
        assert_eq!(QuestionKind::SingleChoice.to_string(), "single_choice");
        assert_eq!(
            "quiz".parse::<QuestionKind>().unwrap(),
            QuestionKind::SingleChoice
        );
        assert_eq!(
            "Multi_Choice".parse::<QuestionKind>().unwrap(),
            QuestionKind::MultiSelect
        );
        assert_eq!(
            "fill_blank".parse::<QuestionKind>().unwrap(),
            QuestionKind::FillBlank
        );
        assert!("essay".parse::<QuestionKind>().is_err());
    }

    #[test]
    fn difficulty_ordering_and_aliases() {
        assert!(Difficulty::Basic < Difficulty::Advanced);
        assert_eq!("easy".parse::<Difficulty>().unwrap(), Difficulty::Basic);
        assert_eq!(
            "MEDIUM".parse::<Difficulty>().unwrap(),
            Difficulty::Intermediate
        );
        assert!("impossible".parse::<Difficulty>().is_err());
    }

    #[test]
    fn assessment_kind_wire_values() {
        let json = serde_json::to_string(&AssessmentKind::MultiSelectOnly).unwrap();
        assert_eq!(json, "\"multi_choice\"");
        let parsed: AssessmentKind = serde_json::from_str("\"quiz\"").unwrap();
        assert_eq!(parsed, AssessmentKind::SingleChoiceOnly);
        assert!(AssessmentKind::Mixed.allows(QuestionKind::FillBlank));
        assert!(!AssessmentKind::SingleChoiceOnly.allows(QuestionKind::MultiSelect));
    }

    #[test]
    fn schema_well_formedness() {
        let good = AnswerSchema::SingleChoice {
            options: vec!["a".into(), "b".into()],
            correct_index: 1,
        };
        assert!(good.is_well_formed());

        let out_of_bounds = AnswerSchema::SingleChoice {
            options: vec!["a".into(), "b".into()],
            correct_index: 2,
        };
        assert!(!out_of_bounds.is_well_formed());

        let empty_set = AnswerSchema::MultiSelect {
            options: vec!["a".into(), "b".into()],
            correct_indexes: BTreeSet::new(),
        };
        assert!(!empty_set.is_well_formed());

        let blank_accepted = AnswerSchema::FillBlank {
            accepted_answers: vec!["  ".into()],
        };
        assert!(!blank_accepted.is_well_formed());
    }

    #[test]
    fn schema_serde_uses_variant_field_names() {
        let schema = AnswerSchema::MultiSelect {
            options: vec!["a".into(), "b".into(), "c".into()],
            correct_indexes: BTreeSet::from([0, 2]),
        };
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["type"], "multi_select");
        assert_eq!(json["correctIndexes"], serde_json::json!([0, 2]));

        // Snake-case aliases are accepted on read.
        let parsed: AnswerSchema = serde_json::from_value(serde_json::json!({
            "type": "single_choice",
            "options": ["x", "y"],
            "correct_index": 1,
        }))
        .unwrap();
        assert_eq!(parsed.kind(), QuestionKind::SingleChoice);
    }

    #[test]
    fn answer_value_shapes() {
        let choice = AnswerValue::Choice(1);
        assert!(choice.matches(QuestionKind::SingleChoice));
        assert!(!choice.matches(QuestionKind::MultiSelect));

        let selection: AnswerValue = serde_json::from_str("[0, 2]").unwrap();
        assert_eq!(selection, AnswerValue::Selection(BTreeSet::from([0, 2])));

        let text: AnswerValue = serde_json::from_str("\"paris\"").unwrap();
        assert!(text.matches(QuestionKind::FillBlank));
    }

    #[test]
    fn time_limit_seconds_saturates_on_huge_values() {
        let mut quiz = Quiz {
            id: Uuid::nil(),
            title: "t".into(),
            description: None,
            difficulty: Difficulty::Basic,
            time_limit_minutes: NonZeroU32::new(10),
            assessment: AssessmentKind::Mixed,
            lesson_ref: None,
            questions: Vec::new(),
        };
        assert_eq!(quiz.time_limit_seconds(), Some(600));

        quiz.time_limit_minutes = NonZeroU32::new(u32::MAX);
        assert_eq!(quiz.time_limit_seconds(), Some(u32::MAX));
    }

    #[test]
    fn attempt_state_terminality() {
        assert!(!AttemptState::InProgress.is_terminal());
        assert!(AttemptState::Submitted.is_terminal());
        assert!(AttemptState::TimedOut.is_terminal());
    }
}
