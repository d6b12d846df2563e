use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("section name cannot be empty")]
    EmptySection,

    #[error("question number must be > 0")]
    InvalidNumber,
}

//
// ─── QUESTION TYPE ─────────────────────────────────────────────────────────────
//

/// The answer format of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    /// Exactly one option is correct.
    #[serde(rename = "mcq")]
    SingleChoice,
    /// Any subset of options may be correct.
    #[serde(rename = "msq")]
    MultiChoice,
    /// A numeric answer accepted within an inclusive range.
    #[serde(rename = "nat")]
    NumericRange,
}

impl QuestionType {
    /// Short lower-case code used on the wire (`mcq`, `msq`, `nat`).
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "mcq",
            QuestionType::MultiChoice => "msq",
            QuestionType::NumericRange => "nat",
        }
    }

    /// Parses the upper-case token used in exam definition tables.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "MCQ" => Some(QuestionType::SingleChoice),
            "MSQ" => Some(QuestionType::MultiChoice),
            "NAT" => Some(QuestionType::NumericRange),
            _ => None,
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

//
// ─── ANSWER KEY ────────────────────────────────────────────────────────────────
//

/// Inclusive bounds for a numeric answer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// A range that only accepts `value` itself.
    #[must_use]
    pub fn exact(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Correct-answer encoding; the variant fixes the question type.
///
/// Option indices are 0-based. A `None` payload means the author's key could
/// not be decoded: the question is kept but cannot be graded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AnswerKey {
    SingleChoice(Option<u32>),
    MultiChoice(BTreeSet<u32>),
    NumericRange(Option<NumericRange>),
}

impl AnswerKey {
    #[must_use]
    pub fn question_type(&self) -> QuestionType {
        match self {
            AnswerKey::SingleChoice(_) => QuestionType::SingleChoice,
            AnswerKey::MultiChoice(_) => QuestionType::MultiChoice,
            AnswerKey::NumericRange(_) => QuestionType::NumericRange,
        }
    }

    /// Returns true when the key carries enough information to grade an answer.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        match self {
            AnswerKey::SingleChoice(index) => index.is_some(),
            AnswerKey::MultiChoice(indices) => !indices.is_empty(),
            AnswerKey::NumericRange(range) => range.is_some(),
        }
    }
}

//
// ─── MARKS ─────────────────────────────────────────────────────────────────────
//

/// Marking scheme of a single question.
///
/// `incorrect` is always `<= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Marks {
    correct: f64,
    incorrect: f64,
    partial: f64,
}

impl Marks {
    /// Builds marks from the awarded score and the declared penalty.
    ///
    /// Authors enter the penalty as a magnitude, so a positive value is
    /// negated; zero and negative values are kept as they are. A non-finite
    /// penalty is treated as no penalty.
    #[must_use]
    pub fn new(correct: f64, penalty: f64) -> Self {
        Self {
            correct,
            incorrect: normalize_penalty(penalty),
            partial: 0.0,
        }
    }

    #[must_use]
    pub fn with_partial(mut self, partial: f64) -> Self {
        self.partial = partial;
        self
    }

    #[must_use]
    pub fn correct(&self) -> f64 {
        self.correct
    }

    #[must_use]
    pub fn incorrect(&self) -> f64 {
        self.incorrect
    }

    #[must_use]
    pub fn partial(&self) -> f64 {
        self.partial
    }
}

/// Converts a declared penalty into the non-positive mark stored on a question.
#[must_use]
pub fn normalize_penalty(value: f64) -> f64 {
    if !value.is_finite() {
        0.0
    } else if value > 0.0 {
        -value
    } else {
        value
    }
}

//
// ─── QUESTION DESCRIPTOR ───────────────────────────────────────────────────────
//

/// One validated row of an exam definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionDescriptor {
    section: String,
    number: u32,
    key: AnswerKey,
    marks: Marks,
}

impl QuestionDescriptor {
    /// Creates a question descriptor.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptySection` if the section name is blank.
    /// Returns `QuestionError::InvalidNumber` if `number` is zero.
    pub fn new(
        section: impl Into<String>,
        number: u32,
        key: AnswerKey,
        marks: Marks,
    ) -> Result<Self, QuestionError> {
        let section = section.into().trim().to_owned();
        if section.is_empty() {
            return Err(QuestionError::EmptySection);
        }
        if number == 0 {
            return Err(QuestionError::InvalidNumber);
        }

        Ok(Self {
            section,
            number,
            key,
            marks,
        })
    }

    #[must_use]
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Author-assigned question number, unique within its section.
    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[must_use]
    pub fn question_type(&self) -> QuestionType {
        self.key.question_type()
    }

    #[must_use]
    pub fn key(&self) -> &AnswerKey {
        &self.key
    }

    #[must_use]
    pub fn marks(&self) -> Marks {
        self.marks
    }
}
