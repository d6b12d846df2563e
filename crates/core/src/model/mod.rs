mod cropper;
mod exam;
mod ids;
mod question;
mod session;

pub use cropper::{CropperQuestion, PageRegion};
pub use exam::{DefinitionSection, ExamDefinition, ExamDetails};
pub use ids::{GlobalQuestionId, SectionId};
pub use question::{
    AnswerKey, Marks, NumericRange, QuestionDescriptor, QuestionError, QuestionType,
    normalize_penalty,
};
pub use session::{
    DEFAULT_ANSWER_OPTIONS, LoggedAnswer, NumberingOrder, QuestionAnswer, QuestionCursor, QuestionStatus,
    SectionDescriptor, SessionQuestion, SessionState, StatusCounts, TestStatus,
};
