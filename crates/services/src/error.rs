//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::FormatError;

/// Errors emitted while loading an exam definition.
///
/// Either way no session state has been touched.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamLoadError {
    #[error("failed to read exam definition")]
    Read(#[source] std::io::Error),
    #[error(transparent)]
    Format(#[from] FormatError),
}
