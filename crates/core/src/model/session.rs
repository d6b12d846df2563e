use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::model::exam::ExamDetails;
use crate::model::ids::{GlobalQuestionId, SectionId};
use crate::model::question::QuestionType;

/// Number of answer options rendered for choice questions unless told otherwise.
pub const DEFAULT_ANSWER_OPTIONS: u8 = 4;

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

/// Navigation/answer state of a single question in the palette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionStatus {
    #[default]
    NotVisited,
    NotAnswered,
    Answered,
    Marked,
    MarkedAnswered,
}

/// Lifecycle of the test as a whole.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestStatus {
    #[default]
    NotStarted,
    Ongoing,
    Finished,
}

/// How question numbers are shown in the palette.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub enum NumberingOrder {
    /// Numbers exactly as written in the exam definition.
    #[default]
    Original,
}

/// A candidate's response to a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum QuestionAnswer {
    Choice(u32),
    Choices(BTreeSet<u32>),
    Numeric(f64),
}

//
// ─── SECTIONS & QUESTIONS ──────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDescriptor {
    pub id: SectionId,
    pub name: String,
    pub subject: String,
}

/// Runtime record of one question inside a test session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionQuestion {
    pub global_id: GlobalQuestionId,
    pub local_number: u32,
    pub section: String,
    pub question_type: QuestionType,
    pub answer_options: u8,
    pub status: QuestionStatus,
    pub answer: Option<QuestionAnswer>,
    pub time_spent: u32,
}

impl SessionQuestion {
    /// A question nobody has looked at yet.
    #[must_use]
    pub fn new(
        global_id: GlobalQuestionId,
        local_number: u32,
        section: impl Into<String>,
        question_type: QuestionType,
    ) -> Self {
        Self {
            global_id,
            local_number,
            section: section.into(),
            question_type,
            answer_options: DEFAULT_ANSWER_OPTIONS,
            status: QuestionStatus::NotVisited,
            answer: None,
            time_spent: 0,
        }
    }

    #[must_use]
    pub fn cursor(&self) -> QuestionCursor {
        QuestionCursor {
            section: self.section.clone(),
            local_number: self.local_number,
            global_id: self.global_id,
        }
    }
}

//
// ─── CURRENT STATE ─────────────────────────────────────────────────────────────
//

/// Position of the question currently on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCursor {
    pub section: String,
    pub local_number: u32,
    pub global_id: GlobalQuestionId,
}

/// Navigation and timing record of the running test.
///
/// `current` is `None` only when the session holds no questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub current: Option<QuestionCursor>,
    pub test_name: String,
    pub total_duration_seconds: u32,
    /// `None` until the test starts; the full duration applies.
    pub remaining_seconds: Option<u32>,
    /// Countdown value at which the current question was opened.
    pub current_question_start_seconds: u32,
    pub test_status: TestStatus,
    pub answer_buffer: Option<QuestionAnswer>,
    pub sections_first_question: BTreeMap<String, u32>,
    pub numbering_order: NumberingOrder,
    /// Whether the frontend should persist answers as the test runs.
    pub save_test_data: bool,
}

impl SessionState {
    /// State of a test that has been loaded but not started.
    #[must_use]
    pub fn not_started(
        details: &ExamDetails,
        current: Option<QuestionCursor>,
        sections_first_question: BTreeMap<String, u32>,
    ) -> Self {
        Self {
            current,
            test_name: details.name.clone(),
            total_duration_seconds: details.duration_seconds,
            remaining_seconds: None,
            current_question_start_seconds: details.duration_seconds,
            test_status: TestStatus::NotStarted,
            answer_buffer: None,
            sections_first_question,
            numbering_order: NumberingOrder::Original,
            save_test_data: true,
        }
    }

    /// Seconds left on the clock, falling back to the full duration before start.
    #[must_use]
    pub fn effective_remaining_seconds(&self) -> u32 {
        self.remaining_seconds.unwrap_or(self.total_duration_seconds)
    }
}

//
// ─── AUXILIARY SLOTS ───────────────────────────────────────────────────────────
//

/// Per-status tally of a group of questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub not_visited: u32,
    pub not_answered: u32,
    pub answered: u32,
    pub marked: u32,
    pub marked_answered: u32,
}

impl StatusCounts {
    pub fn record(&mut self, status: QuestionStatus) {
        let slot = match status {
            QuestionStatus::NotVisited => &mut self.not_visited,
            QuestionStatus::NotAnswered => &mut self.not_answered,
            QuestionStatus::Answered => &mut self.answered,
            QuestionStatus::Marked => &mut self.marked,
            QuestionStatus::MarkedAnswered => &mut self.marked_answered,
        };
        *slot = slot.saturating_add(1);
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.not_visited
            + self.not_answered
            + self.answered
            + self.marked
            + self.marked_answered
    }
}

impl FromIterator<QuestionStatus> for StatusCounts {
    fn from_iter<I: IntoIterator<Item = QuestionStatus>>(iter: I) -> Self {
        let mut counts = Self::default();
        for status in iter {
            counts.record(status);
        }
        counts
    }
}

/// Most recent answer handed to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedAnswer {
    pub global_id: GlobalQuestionId,
    pub answer: Option<QuestionAnswer>,
}
