#![forbid(unsafe_code)]

pub mod error;
pub mod loader;
pub mod sessions;
pub mod store;

pub use error::ExamLoadError;
pub use loader::{ExamLoader, ExamService};
pub use store::SessionStore;

pub use sessions::{
    ExamSession, QuestionLocation, SessionOverview, demo_session, placeholder_session,
    seed_demo_statuses, synthesize,
};
