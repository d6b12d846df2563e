use std::path::Path;
use std::sync::Arc;

use exam_core::DefinitionParser;
use exam_core::model::{ExamDefinition, ExamDetails};
use rand::Rng;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::ExamLoadError;
use crate::sessions::{SessionOverview, demo_session, synthesize};
use crate::store::SessionStore;

/// Reads exam definition text and decodes it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExamLoader {
    parser: DefinitionParser,
}

impl ExamLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_parser(mut self, parser: DefinitionParser) -> Self {
        self.parser = parser;
        self
    }

    /// Read and decode the definition stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns `ExamLoadError::Read` if the file cannot be read or is not
    /// UTF-8, and `ExamLoadError::Format` if the table is invalid.
    pub async fn read_definition(&self, path: &Path) -> Result<ExamDefinition, ExamLoadError> {
        debug!(path = %path.display(), "reading exam definition");
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(ExamLoadError::Read)?;
        Ok(self.parser.parse(&text)?)
    }

    /// Read an uploaded definition to the end and decode it.
    ///
    /// # Errors
    ///
    /// Same as [`ExamLoader::read_definition`].
    pub async fn read_definition_from<R>(&self, mut reader: R) -> Result<ExamDefinition, ExamLoadError>
    where
        R: AsyncRead + Unpin,
    {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .await
            .map_err(ExamLoadError::Read)?;
        Ok(self.parser.parse(&text)?)
    }
}

/// Loads exams into a `SessionStore`.
///
/// Loads through the same service run one at a time; a failed load leaves the
/// store exactly as it was.
#[derive(Debug, Clone)]
pub struct ExamService {
    store: SessionStore,
    loader: ExamLoader,
    load_lock: Arc<Mutex<()>>,
}

impl ExamService {
    #[must_use]
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            loader: ExamLoader::new(),
            load_lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn with_parser(mut self, parser: DefinitionParser) -> Self {
        self.loader = self.loader.with_parser(parser);
        self
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Load the definition at `path` and make it the current session.
    ///
    /// `paper` is installed together with the session, so readers never see
    /// the new session without it.
    ///
    /// # Errors
    ///
    /// Returns `ExamLoadError` if the definition cannot be read or decoded.
    pub async fn load_from_path(
        &self,
        path: &Path,
        details: &ExamDetails,
        paper: Option<&Path>,
    ) -> Result<SessionOverview, ExamLoadError> {
        let _guard = self.load_lock.lock().await;
        let definition = self
            .loader
            .read_definition(path)
            .await
            .inspect_err(|err| warn!(path = %path.display(), %err, "exam definition not loaded"))?;
        Ok(self.install(&definition, details, paper))
    }

    /// Load an uploaded definition and make it the current session.
    ///
    /// # Errors
    ///
    /// Returns `ExamLoadError` if the definition cannot be read or decoded.
    pub async fn load_from_reader<R>(
        &self,
        reader: R,
        details: &ExamDetails,
        paper: Option<&Path>,
    ) -> Result<SessionOverview, ExamLoadError>
    where
        R: AsyncRead + Unpin,
    {
        let _guard = self.load_lock.lock().await;
        let definition = self
            .loader
            .read_definition_from(reader)
            .await
            .inspect_err(|err| warn!(%err, "exam definition not loaded"))?;
        Ok(self.install(&definition, details, paper))
    }

    /// Attach a question paper to whatever session is current.
    pub fn attach_question_paper(&self, path: &Path) {
        self.store.write(|session| session.set_question_paper(path));
    }

    /// Go back to the mock exam, e.g. after closing a loaded exam.
    pub fn reset_to_placeholder<R: Rng + ?Sized>(&self, rng: &mut R) -> SessionOverview {
        let session = demo_session(rng);
        let overview = session.overview();
        self.store.replace(session);
        overview
    }

    fn install(
        &self,
        definition: &ExamDefinition,
        details: &ExamDetails,
        paper: Option<&Path>,
    ) -> SessionOverview {
        let mut session = synthesize(definition, details);
        if let Some(paper) = paper {
            session.set_question_paper(paper);
        }
        let overview = session.overview();
        if session.is_empty() {
            info!(test = %details.name, "exam definition holds no questions");
        }
        self.store.replace(session);
        overview
    }
}
