//! Decoding of comma-separated exam definitions.
//!
//! The first non-blank line is a header naming the columns (any order, any
//! case); every following line describes one question. Row-level problems
//! drop the row (or just its key) and parsing continues; only structural
//! problems with the table as a whole fail the parse.

use std::collections::BTreeSet;

use thiserror::Error;
use tracing::{debug, warn};

use crate::model::{AnswerKey, ExamDefinition, Marks, NumericRange, QuestionDescriptor, QuestionType};

/// Columns every exam definition must declare, in reporting order.
pub const REQUIRED_COLUMNS: [&str; 6] = ["section", "question no", "type", "key", "marks", "negative"];

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Structural problems that prevent an exam definition from loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FormatError {
    #[error("exam definition is empty")]
    Empty,

    #[error("invalid exam definition: too few lines ({found}), expected a header and at least one row")]
    TooFewLines { found: usize },

    #[error("invalid exam definition: missing column `{0}`")]
    MissingColumn(&'static str),

    #[error("unknown question type `{value}` on line {line}")]
    UnknownQuestionType { line: usize, value: String },
}

//
// ─── POLICY ────────────────────────────────────────────────────────────────────
//

/// What to do with a row whose `type` cell is not `MCQ`, `MSQ` or `NAT`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownTypePolicy {
    /// Keep the row as a single-choice question with an unusable key.
    #[default]
    SingleChoice,
    /// Fail the whole parse.
    Reject,
}

//
// ─── PARSER ────────────────────────────────────────────────────────────────────
//

/// Line-oriented parser for exam definition tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefinitionParser {
    unknown_types: UnknownTypePolicy,
}

impl DefinitionParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_unknown_types(mut self, policy: UnknownTypePolicy) -> Self {
        self.unknown_types = policy;
        self
    }

    #[must_use]
    pub fn unknown_types(&self) -> UnknownTypePolicy {
        self.unknown_types
    }

    /// Decode a whole exam definition.
    ///
    /// # Errors
    ///
    /// Returns `FormatError::Empty` for empty input, `FormatError::TooFewLines`
    /// when there is no data row, `FormatError::MissingColumn` for the first
    /// required column absent from the header, and
    /// `FormatError::UnknownQuestionType` when the policy rejects unknown types.
    pub fn parse(&self, text: &str) -> Result<ExamDefinition, FormatError> {
        if text.is_empty() {
            return Err(FormatError::Empty);
        }

        let lines: Vec<(usize, &str)> = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| (idx + 1, line))
            .collect();

        let [(_, header), rows @ ..] = lines.as_slice() else {
            return Err(FormatError::TooFewLines { found: 0 });
        };
        if rows.is_empty() {
            return Err(FormatError::TooFewLines { found: 1 });
        }

        let columns = Columns::from_header(header)?;
        let mut definition = ExamDefinition::new();
        let mut skipped = 0_usize;

        for &(line, row) in rows {
            match self.parse_row(line, row, &columns)? {
                Some(question) => definition.push(question),
                None => skipped += 1,
            }
        }

        debug!(
            sections = definition.sections().len(),
            questions = definition.question_count(),
            skipped,
            "parsed exam definition"
        );
        Ok(definition)
    }

    fn parse_row(
        &self,
        line: usize,
        row: &str,
        columns: &Columns,
    ) -> Result<Option<QuestionDescriptor>, FormatError> {
        let cells: Vec<&str> = row.split(',').map(str::trim).collect();
        if cells.len() < REQUIRED_COLUMNS.len() {
            debug!(line, cells = cells.len(), "skipping incomplete row");
            return Ok(None);
        }
        let Some(cells) = columns.pick(&cells) else {
            debug!(line, "skipping row shorter than its header");
            return Ok(None);
        };

        if cells.section.is_empty() {
            debug!(line, "skipping row without a section");
            return Ok(None);
        }
        let Some(number) = cells.number.parse::<u32>().ok().filter(|n| *n > 0) else {
            debug!(line, value = cells.number, "skipping row with invalid question number");
            return Ok(None);
        };
        let kind = cells.kind.to_uppercase();
        if kind.is_empty() {
            debug!(line, "skipping row without a question type");
            return Ok(None);
        }

        let key = match QuestionType::from_code(&kind) {
            Some(question_type) => decode_key(question_type, cells.key),
            None => match self.unknown_types {
                UnknownTypePolicy::SingleChoice => {
                    warn!(line, value = cells.kind, "unknown question type, keeping as single choice");
                    AnswerKey::SingleChoice(None)
                }
                UnknownTypePolicy::Reject => {
                    return Err(FormatError::UnknownQuestionType {
                        line,
                        value: cells.kind.to_owned(),
                    });
                }
            },
        };

        let marks = Marks::new(parse_score(cells.marks), parse_score(cells.negative));
        match QuestionDescriptor::new(cells.section, number, key, marks) {
            Ok(question) => Ok(Some(question)),
            Err(err) => {
                debug!(line, %err, "skipping invalid question");
                Ok(None)
            }
        }
    }
}

/// Decode an exam definition with the default (lenient) policy.
///
/// # Errors
///
/// See [`DefinitionParser::parse`].
pub fn parse_definition(text: &str) -> Result<ExamDefinition, FormatError> {
    DefinitionParser::new().parse(text)
}

//
// ─── COLUMNS ───────────────────────────────────────────────────────────────────
//

/// Header positions of the required columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    section: usize,
    number: usize,
    kind: usize,
    key: usize,
    marks: usize,
    negative: usize,
}

struct RowCells<'a> {
    section: &'a str,
    number: &'a str,
    kind: &'a str,
    key: &'a str,
    marks: &'a str,
    negative: &'a str,
}

impl Columns {
    fn from_header(header: &str) -> Result<Self, FormatError> {
        let header = header.trim_start_matches('\u{feff}').to_lowercase();
        let names: Vec<&str> = header.split(',').map(str::trim).collect();
        let find = |column: &'static str| {
            names
                .iter()
                .position(|name| *name == column)
                .ok_or(FormatError::MissingColumn(column))
        };

        Ok(Self {
            section: find("section")?,
            number: find("question no")?,
            kind: find("type")?,
            key: find("key")?,
            marks: find("marks")?,
            negative: find("negative")?,
        })
    }

    fn pick<'a>(&self, cells: &[&'a str]) -> Option<RowCells<'a>> {
        Some(RowCells {
            section: cells.get(self.section)?,
            number: cells.get(self.number)?,
            kind: cells.get(self.kind)?,
            key: cells.get(self.key)?,
            marks: cells.get(self.marks)?,
            negative: cells.get(self.negative)?,
        })
    }
}

//
// ─── KEY DECODING ──────────────────────────────────────────────────────────────
//

/// Decode one option token into a 0-based index.
///
/// A single letter maps to its alphabet position (`A`/`a` → 0) and a decimal
/// number to itself minus one (`1` → 0). Anything else, including `0`, is
/// not an option.
#[must_use]
pub fn decode_option(token: &str) -> Option<u32> {
    match token.as_bytes() {
        [] => None,
        [letter] if letter.is_ascii_alphabetic() => {
            Some(u32::from(letter.to_ascii_uppercase() - b'A'))
        }
        digits if digits.iter().all(u8::is_ascii_digit) => token.parse::<u32>().ok()?.checked_sub(1),
        _ => None,
    }
}

/// Decode the raw `key` cell according to the question type.
#[must_use]
pub fn decode_key(question_type: QuestionType, raw: &str) -> AnswerKey {
    let raw = raw.trim();
    match question_type {
        QuestionType::SingleChoice => AnswerKey::SingleChoice(decode_option(raw)),
        QuestionType::MultiChoice => {
            let options: BTreeSet<u32> = raw
                .split(';')
                .filter_map(|token| decode_option(token.trim()))
                .collect();
            AnswerKey::MultiChoice(options)
        }
        QuestionType::NumericRange => AnswerKey::NumericRange(decode_range(raw)),
    }
}

fn decode_range(raw: &str) -> Option<NumericRange> {
    if raw.is_empty() {
        return None;
    }
    match raw.split_once(':') {
        Some((min, rest)) => {
            let max = rest.split_once(':').map_or(rest, |(max, _)| max);
            Some(NumericRange::new(parse_number(min)?, parse_number(max)?))
        }
        None => parse_number(raw).map(NumericRange::exact),
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Blank or malformed mark cells count as zero.
fn parse_score(value: &str) -> f64 {
    parse_number(value).unwrap_or(0.0)
}
