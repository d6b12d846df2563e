use serde::{Deserialize, Serialize};

use crate::model::question::QuestionDescriptor;

/// Questions of one section, in the order they were declared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionSection {
    name: String,
    questions: Vec<QuestionDescriptor>,
}

impl DefinitionSection {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn questions(&self) -> &[QuestionDescriptor] {
        &self.questions
    }
}

/// A decoded exam definition: sections in first-appearance order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExamDefinition {
    sections: Vec<DefinitionSection>,
}

impl ExamDefinition {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a question to its section, opening the section at the end if
    /// it has not been seen yet.
    pub fn push(&mut self, question: QuestionDescriptor) {
        match self
            .sections
            .iter_mut()
            .find(|section| section.name == question.section())
        {
            Some(section) => section.questions.push(question),
            None => self.sections.push(DefinitionSection {
                name: question.section().to_owned(),
                questions: vec![question],
            }),
        }
    }

    #[must_use]
    pub fn sections(&self) -> &[DefinitionSection] {
        &self.sections
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&DefinitionSection> {
        self.sections.iter().find(|section| section.name == name)
    }

    /// Total number of retained questions across all sections.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl FromIterator<QuestionDescriptor> for ExamDefinition {
    fn from_iter<I: IntoIterator<Item = QuestionDescriptor>>(iter: I) -> Self {
        let mut definition = Self::new();
        for question in iter {
            definition.push(question);
        }
        definition
    }
}

/// Exam metadata supplied by the caller alongside a definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamDetails {
    pub name: String,
    pub duration_seconds: u32,
}

impl ExamDetails {
    #[must_use]
    pub fn new(name: impl Into<String>, duration_seconds: u32) -> Self {
        Self {
            name: name.into(),
            duration_seconds,
        }
    }
}
