mod exam_session;
mod placeholder;
mod synthesize;

// Public API of the session subsystem.
pub use exam_session::{ExamSession, QuestionLocation, SessionOverview};
pub use placeholder::{
    DEMO_SECTION, PLACEHOLDER_DURATION_SECONDS, PLACEHOLDER_SECTIONS_PER_SUBJECT,
    PLACEHOLDER_SUBJECTS, PLACEHOLDER_TEST_NAME, demo_session, placeholder_session,
    seed_demo_statuses,
};
pub use synthesize::synthesize;
