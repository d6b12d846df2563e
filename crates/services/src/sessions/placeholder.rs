//! Built-in mock exam shown before a real exam is loaded.

use exam_core::model::{ExamDetails, Marks, QuestionStatus, QuestionType};
use rand::Rng;

use super::exam_session::{ExamSession, SessionAssembler};

pub const PLACEHOLDER_TEST_NAME: &str = "Mock Test 1";
pub const PLACEHOLDER_DURATION_SECONDS: u32 = 180 * 60;
pub const PLACEHOLDER_SUBJECTS: u32 = 4;
pub const PLACEHOLDER_SECTIONS_PER_SUBJECT: u32 = 3;

/// Section whose statuses are seeded for demonstration.
pub const DEMO_SECTION: &str = "Subject1 Section 1";

const SEEDED_STATUSES: [QuestionStatus; 4] = [
    QuestionStatus::Answered,
    QuestionStatus::NotAnswered,
    QuestionStatus::Marked,
    QuestionStatus::MarkedAnswered,
];

/// Deterministic mock exam: four subjects of three sections each.
///
/// The first section of a subject holds 20 single-choice questions, the other
/// two hold 5 numeric questions. Question numbers run on across sections, so
/// each question's local number equals its global id.
#[must_use]
pub fn placeholder_session() -> ExamSession {
    let mut assembler = SessionAssembler::new();
    let mut number = 1_u32;

    for subject_num in 1..=PLACEHOLDER_SUBJECTS {
        let subject = format!("Subject{subject_num}");

        for section_num in 1..=PLACEHOLDER_SECTIONS_PER_SUBJECT {
            let section = format!("{subject} Section {section_num}");
            let (count, question_type) = if section_num == 1 {
                (20, QuestionType::SingleChoice)
            } else {
                (5, QuestionType::NumericRange)
            };

            assembler.open_section(&section, &subject);
            for _ in 0..count {
                assembler.add_question(&section, number, question_type, Marks::new(4.0, 1.0));
                number += 1;
            }
        }
    }

    let details = ExamDetails::new(PLACEHOLDER_TEST_NAME, PLACEHOLDER_DURATION_SECONDS);
    let mut session = assembler.finish(&details);

    // the question on screen at launch counts as visited
    if let Some(question) = session.question_mut(DEMO_SECTION, 1) {
        question.status = QuestionStatus::NotAnswered;
    }
    session
}

/// Scatter demo statuses over questions 2..=20 of [`DEMO_SECTION`].
///
/// Each status is applied twice, in a fixed order, to a question drawn from
/// `rng`; later draws overwrite earlier ones.
pub fn seed_demo_statuses<R: Rng + ?Sized>(session: &mut ExamSession, rng: &mut R) {
    for status in SEEDED_STATUSES.iter().chain(SEEDED_STATUSES.iter()) {
        let local_number = rng.random_range(2..=20);
        if let Some(question) = session.question_mut(DEMO_SECTION, local_number) {
            question.status = *status;
        }
    }
}

/// Placeholder exam with seeded demo statuses.
#[must_use]
pub fn demo_session<R: Rng + ?Sized>(rng: &mut R) -> ExamSession {
    let mut session = placeholder_session();
    seed_demo_statuses(&mut session, rng);
    session
}
