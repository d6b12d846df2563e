use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use exam_core::model::{
    CropperQuestion, ExamDefinition, ExamDetails, GlobalQuestionId, LoggedAnswer, Marks,
    QuestionType, SectionDescriptor, SectionId, SessionQuestion, SessionState, StatusCounts,
};
use tracing::warn;

/// Where a global question id lives in the per-section grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionLocation {
    pub section: String,
    pub local_number: u32,
}

/// Short description of a loaded session, handy for logs and UIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionOverview {
    pub test_name: String,
    pub sections: usize,
    pub questions: usize,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Everything a running test reads and writes, replaced as a unit on load.
///
/// The question grid and the cropper grid share `(section, local_number)`
/// keys but are separate maps; the global index only stores locations, so it
/// can never disagree with the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamSession {
    sections: Vec<SectionDescriptor>,
    questions: BTreeMap<String, BTreeMap<u32, SessionQuestion>>,
    global_index: BTreeMap<GlobalQuestionId, QuestionLocation>,
    cropper: BTreeMap<String, BTreeMap<u32, CropperQuestion>>,
    state: SessionState,
    last_logged_answer: Option<LoggedAnswer>,
    image_urls: BTreeMap<String, BTreeMap<u32, String>>,
    summary: BTreeMap<String, StatusCounts>,
    definition: Option<ExamDefinition>,
    question_paper: Option<PathBuf>,
}

impl ExamSession {
    #[must_use]
    pub fn sections(&self) -> &[SectionDescriptor] {
        &self.sections
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&SectionDescriptor> {
        self.sections.iter().find(|section| section.name == name)
    }

    /// Questions of one section keyed by local number.
    #[must_use]
    pub fn section_questions(&self, section: &str) -> Option<&BTreeMap<u32, SessionQuestion>> {
        self.questions.get(section)
    }

    #[must_use]
    pub fn question(&self, section: &str, local_number: u32) -> Option<&SessionQuestion> {
        self.questions.get(section)?.get(&local_number)
    }

    pub fn question_mut(&mut self, section: &str, local_number: u32) -> Option<&mut SessionQuestion> {
        self.questions.get_mut(section)?.get_mut(&local_number)
    }

    #[must_use]
    pub fn location(&self, id: GlobalQuestionId) -> Option<&QuestionLocation> {
        self.global_index.get(&id)
    }

    #[must_use]
    pub fn question_by_global_id(&self, id: GlobalQuestionId) -> Option<&SessionQuestion> {
        let location = self.global_index.get(&id)?;
        self.question(&location.section, location.local_number)
    }

    pub fn question_by_global_id_mut(&mut self, id: GlobalQuestionId) -> Option<&mut SessionQuestion> {
        let QuestionLocation {
            section,
            local_number,
        } = self.global_index.get(&id)?.clone();
        self.question_mut(&section, local_number)
    }

    /// All questions in global id order.
    pub fn questions(&self) -> impl Iterator<Item = &SessionQuestion> + '_ {
        self.global_index
            .values()
            .filter_map(|location| self.question(&location.section, location.local_number))
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.global_index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.global_index.is_empty()
    }

    #[must_use]
    pub fn cropper_section(&self, section: &str) -> Option<&BTreeMap<u32, CropperQuestion>> {
        self.cropper.get(section)
    }

    #[must_use]
    pub fn cropper_question(&self, section: &str, local_number: u32) -> Option<&CropperQuestion> {
        self.cropper.get(section)?.get(&local_number)
    }

    pub fn cropper_question_mut(
        &mut self,
        section: &str,
        local_number: u32,
    ) -> Option<&mut CropperQuestion> {
        self.cropper.get_mut(section)?.get_mut(&local_number)
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    /// The question the navigation record points at.
    #[must_use]
    pub fn current_question(&self) -> Option<&SessionQuestion> {
        let cursor = self.state.current.as_ref()?;
        self.question(&cursor.section, cursor.local_number)
    }

    #[must_use]
    pub fn last_logged_answer(&self) -> Option<&LoggedAnswer> {
        self.last_logged_answer.as_ref()
    }

    pub fn log_answer(&mut self, answer: LoggedAnswer) {
        self.last_logged_answer = Some(answer);
    }

    #[must_use]
    pub fn image_url(&self, section: &str, local_number: u32) -> Option<&str> {
        self.image_urls
            .get(section)?
            .get(&local_number)
            .map(String::as_str)
    }

    pub fn set_image_url(&mut self, section: &str, local_number: u32, url: impl Into<String>) {
        self.image_urls
            .entry(section.to_owned())
            .or_default()
            .insert(local_number, url.into());
    }

    /// Last computed per-section status tally.
    #[must_use]
    pub fn summary(&self) -> &BTreeMap<String, StatusCounts> {
        &self.summary
    }

    /// Recompute the per-section status tally from the question grid.
    pub fn refresh_summary(&mut self) -> &BTreeMap<String, StatusCounts> {
        self.summary = self
            .questions
            .iter()
            .map(|(section, questions)| {
                let counts: StatusCounts = questions.values().map(|q| q.status).collect();
                (section.clone(), counts)
            })
            .collect();
        &self.summary
    }

    /// The parsed definition this session was built from, if any.
    #[must_use]
    pub fn definition(&self) -> Option<&ExamDefinition> {
        self.definition.as_ref()
    }

    #[must_use]
    pub fn question_paper(&self) -> Option<&Path> {
        self.question_paper.as_deref()
    }

    pub fn set_question_paper(&mut self, path: impl Into<PathBuf>) {
        self.question_paper = Some(path.into());
    }

    #[must_use]
    pub fn overview(&self) -> SessionOverview {
        SessionOverview {
            test_name: self.state.test_name.clone(),
            sections: self.sections.len(),
            questions: self.question_count(),
        }
    }

    pub(crate) fn with_definition(mut self, definition: ExamDefinition) -> Self {
        self.definition = Some(definition);
        self
    }
}

//
// ─── ASSEMBLY ──────────────────────────────────────────────────────────────────
//

/// Incrementally builds an `ExamSession`, handing out global ids in call order.
pub(crate) struct SessionAssembler {
    sections: Vec<SectionDescriptor>,
    questions: BTreeMap<String, BTreeMap<u32, SessionQuestion>>,
    global_index: BTreeMap<GlobalQuestionId, QuestionLocation>,
    cropper: BTreeMap<String, BTreeMap<u32, CropperQuestion>>,
    first_questions: BTreeMap<String, u32>,
    next_id: GlobalQuestionId,
}

impl SessionAssembler {
    pub(crate) fn new() -> Self {
        Self {
            sections: Vec::new(),
            questions: BTreeMap::new(),
            global_index: BTreeMap::new(),
            cropper: BTreeMap::new(),
            first_questions: BTreeMap::new(),
            next_id: GlobalQuestionId::FIRST,
        }
    }

    /// Register a section; ids follow registration order starting at 1.
    pub(crate) fn open_section(&mut self, name: &str, subject: &str) -> SectionId {
        if let Some(existing) = self.sections.iter().find(|s| s.name == name) {
            return existing.id;
        }
        let next = u32::try_from(self.sections.len()).unwrap_or(u32::MAX).saturating_add(1);
        let id = SectionId::new(next);
        self.sections.push(SectionDescriptor {
            id,
            name: name.to_owned(),
            subject: subject.to_owned(),
        });
        self.questions.entry(name.to_owned()).or_default();
        self.cropper.entry(name.to_owned()).or_default();
        id
    }

    /// Add a question to an open section.
    ///
    /// Returns `None` without consuming an id when the section already holds
    /// `local_number`.
    pub(crate) fn add_question(
        &mut self,
        section: &str,
        local_number: u32,
        question_type: QuestionType,
        marks: Marks,
    ) -> Option<GlobalQuestionId> {
        let grid = self.questions.entry(section.to_owned()).or_default();
        if grid.contains_key(&local_number) {
            warn!(section, local_number, "duplicate question number, keeping the first");
            return None;
        }

        let global_id = self.next_id;
        self.next_id = global_id.next();

        grid.insert(
            local_number,
            SessionQuestion::new(global_id, local_number, section, question_type),
        );
        self.cropper
            .entry(section.to_owned())
            .or_default()
            .insert(local_number, CropperQuestion::new(local_number, question_type, marks));
        self.global_index.insert(
            global_id,
            QuestionLocation {
                section: section.to_owned(),
                local_number,
            },
        );
        self.first_questions
            .entry(section.to_owned())
            .and_modify(|first| *first = (*first).min(local_number))
            .or_insert(local_number);

        Some(global_id)
    }

    /// Finish assembly with a not-started state on the first section's first question.
    pub(crate) fn finish(self, details: &ExamDetails) -> ExamSession {
        let current = self.sections.iter().find_map(|section| {
            let first = self.first_questions.get(&section.name)?;
            self.questions
                .get(&section.name)?
                .get(first)
                .map(SessionQuestion::cursor)
        });
        let state = SessionState::not_started(details, current, self.first_questions);

        ExamSession {
            sections: self.sections,
            questions: self.questions,
            global_index: self.global_index,
            cropper: self.cropper,
            state,
            last_logged_answer: None,
            image_urls: BTreeMap::new(),
            summary: BTreeMap::new(),
            definition: None,
            question_paper: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{QuestionAnswer, QuestionStatus};

    fn small_session() -> ExamSession {
        let mut assembler = SessionAssembler::new();
        assembler.open_section("A", "A");
        assembler.add_question("A", 3, QuestionType::SingleChoice, Marks::new(4.0, 1.0));
        assembler.add_question("A", 5, QuestionType::SingleChoice, Marks::new(4.0, 1.0));
        assembler.open_section("B", "B");
        assembler.add_question("B", 1, QuestionType::NumericRange, Marks::new(2.0, 0.0));
        assembler.finish(&ExamDetails::new("Unit", 900))
    }

    #[test]
    fn duplicate_numbers_do_not_consume_ids() {
        let mut assembler = SessionAssembler::new();
        assembler.open_section("A", "A");
        let first = assembler.add_question("A", 1, QuestionType::SingleChoice, Marks::new(1.0, 0.0));
        let duplicate = assembler.add_question("A", 1, QuestionType::MultiChoice, Marks::new(1.0, 0.0));
        let next = assembler.add_question("A", 2, QuestionType::SingleChoice, Marks::new(1.0, 0.0));

        assert_eq!(first, Some(GlobalQuestionId::new(1)));
        assert_eq!(duplicate, None);
        assert_eq!(next, Some(GlobalQuestionId::new(2)));

        let session = assembler.finish(&ExamDetails::new("Dup", 60));
        assert_eq!(
            session.question("A", 1).unwrap().question_type,
            QuestionType::SingleChoice
        );
    }

    #[test]
    fn reopening_a_section_keeps_its_id() {
        let mut assembler = SessionAssembler::new();
        let a = assembler.open_section("A", "A");
        let b = assembler.open_section("B", "B");
        assert_eq!(assembler.open_section("A", "A"), a);
        assert_eq!(a.value(), 1);
        assert_eq!(b.value(), 2);
    }

    #[test]
    fn global_lookup_reaches_the_grid_entry() {
        let mut session = small_session();
        let id = GlobalQuestionId::new(2);
        assert_eq!(session.question_by_global_id(id).unwrap().local_number, 5);

        session.question_by_global_id_mut(id).unwrap().status = QuestionStatus::Answered;
        assert_eq!(session.question("A", 5).unwrap().status, QuestionStatus::Answered);
        assert!(session.question_by_global_id(GlobalQuestionId::new(4)).is_none());
    }

    #[test]
    fn cropper_edits_do_not_touch_session_questions() {
        let mut session = small_session();
        session.cropper_question_mut("A", 3).unwrap().answer_options = 5;
        assert_eq!(session.question("A", 3).unwrap().answer_options, 4);
    }

    #[test]
    fn summary_counts_statuses_per_section() {
        let mut session = small_session();
        session.question_mut("A", 3).unwrap().status = QuestionStatus::Marked;
        let summary = session.refresh_summary();
        assert_eq!(summary["A"].marked, 1);
        assert_eq!(summary["A"].not_visited, 1);
        assert_eq!(summary["B"].total(), 1);
    }

    #[test]
    fn auxiliary_slots_start_empty_and_accept_writes() {
        let mut session = small_session();
        assert!(session.last_logged_answer().is_none());
        assert!(session.image_url("A", 3).is_none());
        assert!(session.summary().is_empty());

        session.log_answer(LoggedAnswer {
            global_id: GlobalQuestionId::new(1),
            answer: Some(QuestionAnswer::Choice(2)),
        });
        session.set_image_url("A", 3, "blob:a-3");
        session.set_question_paper("paper.pdf");

        assert_eq!(session.last_logged_answer().unwrap().global_id, GlobalQuestionId::new(1));
        assert_eq!(session.image_url("A", 3), Some("blob:a-3"));
        assert_eq!(session.question_paper(), Some(Path::new("paper.pdf")));
    }

    #[test]
    fn current_question_follows_the_cursor() {
        let session = small_session();
        let current = session.current_question().unwrap();
        assert_eq!(current.section, "A");
        assert_eq!(current.local_number, 3);
        assert_eq!(session.overview().questions, 3);
    }
}
