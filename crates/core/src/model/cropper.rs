use serde::{Deserialize, Serialize};

use crate::model::question::{Marks, QuestionType};
use crate::model::session::DEFAULT_ANSWER_OPTIONS;

/// Rectangle on a page of the question paper.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageRegion {
    pub page: u32,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl PageRegion {
    /// Empty region on the first page, to be drawn later by the region editor.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            page: 1,
            x1: 0.0,
            y1: 0.0,
            x2: 0.0,
            y2: 0.0,
        }
    }
}

/// Presentation metadata for one question, keyed like `SessionQuestion`
/// but owned separately from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropperQuestion {
    pub local_number: u32,
    pub question_type: QuestionType,
    pub marks: Marks,
    pub answer_options: u8,
    pub regions: Vec<PageRegion>,
}

impl CropperQuestion {
    #[must_use]
    pub fn new(local_number: u32, question_type: QuestionType, marks: Marks) -> Self {
        Self {
            local_number,
            question_type,
            marks,
            answer_options: DEFAULT_ANSWER_OPTIONS,
            regions: vec![PageRegion::placeholder()],
        }
    }
}
