use exam_core::model::{ExamDefinition, ExamDetails, QuestionDescriptor};
use tracing::info;

use super::exam_session::{ExamSession, SessionAssembler};

/// Build a fresh session from a decoded exam definition.
///
/// Sections keep the definition's order and get ids 1, 2, ...; questions are
/// ordered by number inside each section and receive global ids in that walk
/// order, starting at 1 with no gaps. The state points at the first section's
/// lowest-numbered question and the clock has not started.
///
/// An empty definition yields an empty session with no current question.
#[must_use]
pub fn synthesize(definition: &ExamDefinition, details: &ExamDetails) -> ExamSession {
    let mut assembler = SessionAssembler::new();

    for section in definition.sections() {
        assembler.open_section(section.name(), section.name());

        let mut questions: Vec<&QuestionDescriptor> = section.questions().iter().collect();
        questions.sort_by_key(|question| question.number());

        for question in questions {
            assembler.add_question(
                section.name(),
                question.number(),
                question.question_type(),
                question.marks(),
            );
        }
    }

    let session = assembler.finish(details).with_definition(definition.clone());
    info!(
        test = %details.name,
        sections = session.sections().len(),
        questions = session.question_count(),
        "synthesized exam session"
    );
    session
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{AnswerKey, GlobalQuestionId, Marks, QuestionStatus, QuestionType, TestStatus};
    use std::collections::BTreeSet;

    fn question(section: &str, number: u32, key: AnswerKey) -> QuestionDescriptor {
        QuestionDescriptor::new(section, number, key, Marks::new(4.0, 1.0)).unwrap()
    }

    fn mcq(section: &str, number: u32) -> QuestionDescriptor {
        question(section, number, AnswerKey::SingleChoice(Some(0)))
    }

    fn details() -> ExamDetails {
        ExamDetails::new("Instant Test", 3_600)
    }

    #[test]
    fn ids_follow_section_then_number_order() {
        let definition: ExamDefinition = [mcq("A", 1), mcq("A", 2), mcq("B", 1)].into_iter().collect();
        let session = synthesize(&definition, &details());

        let names: Vec<&str> = session.sections().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(session.sections()[1].id.value(), 2);

        assert_eq!(session.question("A", 1).unwrap().global_id, GlobalQuestionId::new(1));
        assert_eq!(session.question("A", 2).unwrap().global_id, GlobalQuestionId::new(2));
        assert_eq!(session.question("B", 1).unwrap().global_id, GlobalQuestionId::new(3));
    }

    #[test]
    fn questions_are_sorted_within_a_section() {
        let definition: ExamDefinition = [mcq("A", 9), mcq("B", 4), mcq("A", 2), mcq("A", 5)]
            .into_iter()
            .collect();
        let session = synthesize(&definition, &details());

        let order: Vec<(String, u32, u32)> = session
            .questions()
            .map(|q| (q.section.clone(), q.local_number, q.global_id.value()))
            .collect();
        assert_eq!(
            order,
            [
                ("A".to_owned(), 2, 1),
                ("A".to_owned(), 5, 2),
                ("A".to_owned(), 9, 3),
                ("B".to_owned(), 4, 4),
            ]
        );
        assert_eq!(session.state().sections_first_question["A"], 2);
        assert_eq!(session.state().sections_first_question["B"], 4);
    }

    #[test]
    fn initial_state_points_at_first_question() {
        let definition: ExamDefinition = [mcq("Physics", 3), mcq("Physics", 1), mcq("Maths", 1)]
            .into_iter()
            .collect();
        let session = synthesize(&definition, &details());
        let state = session.state();

        let cursor = state.current.as_ref().unwrap();
        assert_eq!(cursor.section, "Physics");
        assert_eq!(cursor.local_number, 1);
        assert_eq!(cursor.global_id, GlobalQuestionId::new(1));
        assert_eq!(state.test_name, "Instant Test");
        assert_eq!(state.total_duration_seconds, 3_600);
        assert_eq!(state.current_question_start_seconds, 3_600);
        assert_eq!(state.remaining_seconds, None);
        assert_eq!(state.test_status, TestStatus::NotStarted);
        assert!(state.answer_buffer.is_none());
    }

    #[test]
    fn questions_start_fresh() {
        let definition: ExamDefinition = [
            question("A", 1, AnswerKey::MultiChoice(BTreeSet::from([0, 2]))),
            mcq("A", 2),
        ]
        .into_iter()
        .collect();
        let session = synthesize(&definition, &details());

        for q in session.questions() {
            assert_eq!(q.status, QuestionStatus::NotVisited);
            assert!(q.answer.is_none());
            assert_eq!(q.time_spent, 0);
        }
        assert_eq!(session.question("A", 1).unwrap().question_type, QuestionType::MultiChoice);
    }

    #[test]
    fn cropper_grid_mirrors_questions() {
        let definition: ExamDefinition = [mcq("A", 1), mcq("A", 2), mcq("B", 7)].into_iter().collect();
        let session = synthesize(&definition, &details());

        for q in session.questions() {
            let crop = session.cropper_question(&q.section, q.local_number).unwrap();
            assert_eq!(crop.local_number, q.local_number);
            assert_eq!(crop.question_type, q.question_type);
            assert_eq!(crop.marks.correct(), 4.0);
            assert_eq!(crop.marks.incorrect(), -1.0);
            assert_eq!(crop.regions.len(), 1);
            assert_eq!(crop.regions[0].page, 1);
        }
        let cropped: usize = session
            .sections()
            .iter()
            .map(|s| session.cropper_section(&s.name).map_or(0, |c| c.len()))
            .sum();
        assert_eq!(cropped, session.question_count());
    }

    #[test]
    fn empty_definition_gives_empty_session() {
        let session = synthesize(&ExamDefinition::new(), &details());
        assert!(session.sections().is_empty());
        assert!(session.is_empty());
        assert!(session.state().current.is_none());
        assert!(session.current_question().is_none());
        assert_eq!(session.state().test_name, "Instant Test");
    }

    #[test]
    fn synthesis_is_repeatable() {
        let definition: ExamDefinition = [mcq("B", 2), mcq("A", 1), mcq("B", 1)].into_iter().collect();
        let first = synthesize(&definition, &details());
        let second = synthesize(&definition, &details());
        assert_eq!(first, second);
        assert_eq!(first.definition(), Some(&definition));
    }
}
