use parking_lot::RwLock;
use std::sync::{Arc, OnceLock};

use tracing::info;

use crate::sessions::{ExamSession, demo_session};

/// Shared owner of the current test session.
///
/// Every structure of a session lives behind one lock, so replacing the
/// session is atomic for readers: a reader sees either the old session or the
/// new one, never a mix.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<ExamSession>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(session: ExamSession) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
        }
    }

    /// A store holding the mock exam with randomly seeded demo statuses.
    #[must_use]
    pub fn with_demo_session() -> Self {
        Self::new(demo_session(&mut rand::rng()))
    }

    /// Process-wide store, created with the demo session on first access.
    pub fn global() -> &'static SessionStore {
        static GLOBAL: OnceLock<SessionStore> = OnceLock::new();
        GLOBAL.get_or_init(SessionStore::with_demo_session)
    }

    /// Swap in a new session wholesale and return the previous one.
    pub fn replace(&self, session: ExamSession) -> ExamSession {
        let overview = session.overview();
        let previous = std::mem::replace(&mut *self.inner.write(), session);
        info!(
            test = %overview.test_name,
            sections = overview.sections,
            questions = overview.questions,
            "session replaced"
        );
        previous
    }

    pub fn read<T>(&self, f: impl FnOnce(&ExamSession) -> T) -> T {
        f(&*self.inner.read())
    }

    pub fn write<T>(&self, f: impl FnOnce(&mut ExamSession) -> T) -> T {
        f(&mut *self.inner.write())
    }

    /// Clone of the current session.
    #[must_use]
    pub fn snapshot(&self) -> ExamSession {
        self.inner.read().clone()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let overview = self.read(ExamSession::overview);
        f.debug_struct("SessionStore")
            .field("test_name", &overview.test_name)
            .field("questions", &overview.questions)
            .finish()
    }
}
