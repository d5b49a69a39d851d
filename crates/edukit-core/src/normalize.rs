//! Two-way transform between wire records and editable authoring forms.
//!
//! Hydration (`Raw*` → draft) is total: missing or malformed fields fall
//! back to per-variant defaults so the editor always has a valid shape to
//! work with. Serialization (draft → model) is where validation happens;
//! questions that fail their variant's minimum are reported and excluded
//! rather than corrupting the whole quiz.

use std::collections::BTreeSet;
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{
    AnswerSchema, AssessmentKind, Difficulty, Question, QuestionKind, Quiz,
};

/// Raw wire question, tolerant of both field-naming conventions and of the
/// answer schema arriving either nested or flattened onto the question.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawQuestion {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default, alias = "question", alias = "prompt")]
    pub text: Option<String>,
    #[serde(default, rename = "type", alias = "questionType", alias = "question_type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub points: Option<u32>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default, rename = "answerSchema", alias = "answer_schema")]
    pub answer_schema: Option<RawAnswerSchema>,
    #[serde(flatten)]
    pub flat: RawAnswerSchema,
}

/// Raw answer-schema fields; every field optional.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawAnswerSchema {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default, rename = "correctIndex", alias = "correct_index")]
    pub correct_index: Option<usize>,
    #[serde(default, rename = "correctIndexes", alias = "correct_indexes")]
    pub correct_indexes: Option<Vec<usize>>,
    #[serde(default, rename = "acceptedAnswers", alias = "accepted_answers")]
    pub accepted_answers: Option<Vec<String>>,
}

/// Raw wire quiz.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawQuiz {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default, alias = "name")]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default, rename = "timeLimitMinutes", alias = "time_limit_minutes")]
    pub time_limit_minutes: Option<u32>,
    #[serde(default, rename = "assessmentType", alias = "assessment_type")]
    pub assessment: Option<String>,
    #[serde(default, rename = "lessonRef", alias = "lesson_ref")]
    pub lesson_ref: Option<Uuid>,
    #[serde(default)]
    pub questions: Vec<RawQuestion>,
}

/// One editable answer option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDraft {
    pub text: String,
    pub correct: bool,
}

impl OptionDraft {
    pub fn new(text: impl Into<String>, correct: bool) -> Self {
        Self {
            text: text.into(),
            correct,
        }
    }

    fn blank() -> Self {
        Self {
            text: String::new(),
            correct: false,
        }
    }
}

/// The in-memory, always-valid-shaped question representation used during
/// authoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub id: Uuid,
    pub text: String,
    pub kind: QuestionKind,
    pub points: u32,
    pub explanation: Option<String>,
    /// Choice options; meaningful for the choice variants.
    pub options: Vec<OptionDraft>,
    /// Accepted answers; meaningful for fill-blank.
    pub accepted_answers: Vec<String>,
}

/// Why a question was rejected during serialization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidReason {
    #[error("question text is empty")]
    EmptyText,
    #[error("choice question needs at least 2 non-empty options, found {found}")]
    TooFewOptions { found: usize },
    #[error("fill-blank question needs at least 1 non-empty accepted answer")]
    NoAcceptedAnswers,
    #[error("{} question not allowed in a {} quiz", .question.label(), .quiz.label())]
    KindNotAllowed {
        quiz: AssessmentKind,
        question: QuestionKind,
    },
}

/// A question that failed its variant's minimum shape; reported to the
/// caller and excluded from the emitted quiz.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("question {id}: {reason}")]
pub struct QuestionInvalid {
    pub id: Uuid,
    pub reason: InvalidReason,
}

/// Why a whole quiz could not be serialized.
#[derive(Debug, Error)]
pub enum QuizInvalid {
    #[error("quiz title is empty")]
    EmptyTitle,
    #[error("no valid questions remain ({} rejected)", rejected.len())]
    NoValidQuestions { rejected: Vec<QuestionInvalid> },
}

/// A successfully serialized quiz plus the questions that did not make it.
#[derive(Debug)]
pub struct SerializedQuiz {
    pub quiz: Quiz,
    pub rejected: Vec<QuestionInvalid>,
}

impl QuestionDraft {
    /// Fresh draft of the given kind with the variant's default edit targets.
    pub fn new(kind: QuestionKind) -> Self {
        let mut draft = Self {
            id: Uuid::new_v4(),
            text: String::new(),
            kind,
            points: 1,
            explanation: None,
            options: Vec::new(),
            accepted_answers: Vec::new(),
        };
        draft.ensure_edit_targets();
        draft
    }

    /// Hydrate a wire record into an editable draft. Never fails; missing or
    /// unrecognized fields default.
    pub fn hydrate(raw: &RawQuestion) -> Self {
        let schema = raw.answer_schema.as_ref().unwrap_or(&raw.flat);

        let kind = raw
            .kind
            .as_deref()
            .or(schema.kind.as_deref())
            .and_then(|s| QuestionKind::from_str(s).ok())
            .unwrap_or(QuestionKind::SingleChoice);

        let option_texts = schema
            .options
            .clone()
            .or_else(|| raw.flat.options.clone())
            .unwrap_or_default();

        let mut options: Vec<OptionDraft> = option_texts
            .into_iter()
            .map(|text| OptionDraft::new(text, false))
            .collect();

        match kind {
            QuestionKind::SingleChoice => {
                let correct = schema.correct_index.or(raw.flat.correct_index);
                if let Some(i) = correct.filter(|i| *i < options.len()) {
                    options[i].correct = true;
                }
            }
            QuestionKind::MultiSelect => {
                let indexes = schema
                    .correct_indexes
                    .clone()
                    .or_else(|| raw.flat.correct_indexes.clone())
                    .unwrap_or_default();
                for i in indexes {
                    if let Some(opt) = options.get_mut(i) {
                        opt.correct = true;
                    }
                }
            }
            QuestionKind::FillBlank => {}
        }

        let accepted_answers = schema
            .accepted_answers
            .clone()
            .or_else(|| raw.flat.accepted_answers.clone())
            .unwrap_or_default();

        let mut draft = Self {
            id: raw.id.unwrap_or_else(Uuid::new_v4),
            text: raw.text.clone().unwrap_or_default(),
            kind,
            points: raw.points.unwrap_or(1).max(1),
            explanation: raw.explanation.clone().filter(|e| !e.trim().is_empty()),
            options,
            accepted_answers,
        };
        draft.ensure_edit_targets();
        draft
    }

    /// Hydrate from a JSON value; malformed input degrades to defaults
    /// instead of failing.
    pub fn hydrate_json(value: &serde_json::Value) -> Self {
        let raw: RawQuestion = serde_json::from_value(value.clone()).unwrap_or_default();
        Self::hydrate(&raw)
    }

    /// Open an existing persisted question for editing.
    pub fn from_question(question: &Question) -> Self {
        let mut draft = Self {
            id: question.id,
            text: question.text.clone(),
            kind: question.kind(),
            points: question.points,
            explanation: question.explanation.clone(),
            options: Vec::new(),
            accepted_answers: Vec::new(),
        };
        match &question.schema {
            AnswerSchema::SingleChoice {
                options,
                correct_index,
            } => {
                draft.options = options
                    .iter()
                    .enumerate()
                    .map(|(i, text)| OptionDraft::new(text.clone(), i == *correct_index))
                    .collect();
            }
            AnswerSchema::MultiSelect {
                options,
                correct_indexes,
            } => {
                draft.options = options
                    .iter()
                    .enumerate()
                    .map(|(i, text)| OptionDraft::new(text.clone(), correct_indexes.contains(&i)))
                    .collect();
            }
            AnswerSchema::FillBlank { accepted_answers } => {
                draft.accepted_answers = accepted_answers.clone();
            }
        }
        draft.ensure_edit_targets();
        draft
    }

    /// Guarantee the editor always has something to edit: two blank options
    /// (first marked correct) for choice kinds, one blank accepted answer
    /// for fill-blank.
    fn ensure_edit_targets(&mut self) {
        match self.kind {
            QuestionKind::SingleChoice | QuestionKind::MultiSelect => {
                while self.options.len() < 2 {
                    self.options.push(OptionDraft::blank());
                }
                if !self.options.iter().any(|o| o.correct) {
                    self.options[0].correct = true;
                }
            }
            QuestionKind::FillBlank => {
                if self.accepted_answers.is_empty() {
                    self.accepted_answers.push(String::new());
                }
            }
        }
    }

    /// Convert this draft to a different question kind, carrying over what
    /// translates: correct option texts become accepted answers, and the
    /// first accepted answer seeds the option list.
    pub fn switch_kind(&mut self, new: QuestionKind) {
        if self.kind == new {
            return;
        }
        let old = self.kind;
        self.kind = new;

        match (old, new) {
            (QuestionKind::SingleChoice | QuestionKind::MultiSelect, QuestionKind::FillBlank) => {
                self.accepted_answers = self
                    .options
                    .iter()
                    .filter(|o| o.correct && !o.text.trim().is_empty())
                    .map(|o| o.text.clone())
                    .collect();
                self.options.clear();
            }
            (QuestionKind::FillBlank, _) => {
                let seed = self
                    .accepted_answers
                    .iter()
                    .find(|a| !a.trim().is_empty())
                    .cloned();
                self.options = match seed {
                    Some(text) => vec![OptionDraft::new(text, true), OptionDraft::blank()],
                    None => Vec::new(),
                };
                self.accepted_answers.clear();
            }
            (QuestionKind::MultiSelect, QuestionKind::SingleChoice) => {
                // Exactly one correct option survives the narrowing.
                let first = self.options.iter().position(|o| o.correct);
                for (i, opt) in self.options.iter_mut().enumerate() {
                    opt.correct = Some(i) == first;
                }
            }
            (QuestionKind::SingleChoice, QuestionKind::MultiSelect) => {}
            _ => {}
        }
        self.ensure_edit_targets();
    }

    /// Validate and emit a wire question. Trims all text; a question below
    /// its variant's minimum is rejected.
    pub fn serialize(&self) -> Result<Question, QuestionInvalid> {
        let invalid = |reason| QuestionInvalid {
            id: self.id,
            reason,
        };

        let text = self.text.trim().to_string();
        if text.is_empty() {
            return Err(invalid(InvalidReason::EmptyText));
        }

        let schema = match self.kind {
            QuestionKind::SingleChoice | QuestionKind::MultiSelect => {
                let surviving: Vec<&OptionDraft> = self
                    .options
                    .iter()
                    .filter(|o| !o.text.trim().is_empty())
                    .collect();
                if surviving.len() < 2 {
                    return Err(invalid(InvalidReason::TooFewOptions {
                        found: surviving.len(),
                    }));
                }
                let options: Vec<String> =
                    surviving.iter().map(|o| o.text.trim().to_string()).collect();
                let marked: BTreeSet<usize> = surviving
                    .iter()
                    .enumerate()
                    .filter(|(_, o)| o.correct)
                    .map(|(i, _)| i)
                    .collect();

                match self.kind {
                    QuestionKind::SingleChoice => AnswerSchema::SingleChoice {
                        options,
                        // Never emit a schema with zero correct answers.
                        correct_index: marked.first().copied().unwrap_or(0),
                    },
                    QuestionKind::MultiSelect => AnswerSchema::MultiSelect {
                        options,
                        correct_indexes: if marked.is_empty() {
                            BTreeSet::from([0])
                        } else {
                            marked
                        },
                    },
                    QuestionKind::FillBlank => unreachable!(),
                }
            }
            QuestionKind::FillBlank => {
                let accepted: Vec<String> = self
                    .accepted_answers
                    .iter()
                    .map(|a| a.trim().to_string())
                    .filter(|a| !a.is_empty())
                    .collect();
                if accepted.is_empty() {
                    return Err(invalid(InvalidReason::NoAcceptedAnswers));
                }
                AnswerSchema::FillBlank {
                    accepted_answers: accepted,
                }
            }
        };

        Ok(Question {
            id: self.id,
            text,
            points: self.points.max(1),
            explanation: self
                .explanation
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(String::from),
            schema,
        })
    }
}

/// The editable quiz form.
#[derive(Debug, Clone)]
pub struct QuizDraft {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: Difficulty,
    pub time_limit_minutes: Option<NonZeroU32>,
    pub assessment: AssessmentKind,
    pub lesson_ref: Option<Uuid>,
    pub questions: Vec<QuestionDraft>,
}

impl QuizDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            difficulty: Difficulty::Basic,
            time_limit_minutes: None,
            assessment: AssessmentKind::Mixed,
            lesson_ref: None,
            questions: Vec::new(),
        }
    }

    /// Hydrate a wire quiz. Never fails; each question hydrates with its own
    /// defaults.
    pub fn hydrate(raw: &RawQuiz) -> Self {
        Self {
            id: raw.id.unwrap_or_else(Uuid::new_v4),
            title: raw.title.clone().unwrap_or_default(),
            description: raw.description.clone().filter(|d| !d.trim().is_empty()),
            difficulty: raw
                .difficulty
                .as_deref()
                .and_then(|d| d.parse().ok())
                .unwrap_or_default(),
            time_limit_minutes: raw.time_limit_minutes.and_then(NonZeroU32::new),
            assessment: raw
                .assessment
                .as_deref()
                .and_then(|a| a.parse().ok())
                .unwrap_or_default(),
            lesson_ref: raw.lesson_ref,
            questions: raw.questions.iter().map(QuestionDraft::hydrate).collect(),
        }
    }

    /// Open an existing persisted quiz for editing.
    pub fn from_quiz(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id,
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            difficulty: quiz.difficulty,
            time_limit_minutes: quiz.time_limit_minutes,
            assessment: quiz.assessment,
            lesson_ref: quiz.lesson_ref,
            questions: quiz
                .questions
                .iter()
                .map(QuestionDraft::from_question)
                .collect(),
        }
    }

    /// Validate and emit a wire quiz. Questions that fail their variant's
    /// minimum, or whose kind the quiz's assessment kind disallows, are
    /// reported and excluded; the quiz itself fails only when the title is
    /// empty or no question survives.
    pub fn serialize(&self) -> Result<SerializedQuiz, QuizInvalid> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(QuizInvalid::EmptyTitle);
        }

        let mut questions = Vec::new();
        let mut rejected = Vec::new();
        for draft in &self.questions {
            if !self.assessment.allows(draft.kind) {
                rejected.push(QuestionInvalid {
                    id: draft.id,
                    reason: InvalidReason::KindNotAllowed {
                        quiz: self.assessment,
                        question: draft.kind,
                    },
                });
                continue;
            }
            match draft.serialize() {
                Ok(q) => questions.push(q),
                Err(e) => rejected.push(e),
            }
        }

        for r in &rejected {
            tracing::warn!(question = %r.id, "excluding invalid question: {}", r.reason);
        }

        if questions.is_empty() {
            return Err(QuizInvalid::NoValidQuestions { rejected });
        }

        Ok(SerializedQuiz {
            quiz: Quiz {
                id: self.id,
                title,
                description: self
                    .description
                    .as_deref()
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(String::from),
                difficulty: self.difficulty,
                time_limit_minutes: self.time_limit_minutes,
                assessment: self.assessment,
                lesson_ref: self.lesson_ref,
                questions,
            },
            rejected,
        })
    }
}
