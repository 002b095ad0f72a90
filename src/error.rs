//! Error types for the latex2mobi library.
//!
//! Every error in this crate is fatal to the run it occurs in: the pipeline
//! is strictly sequential and nothing is retried. A missing metadata field is
//! *not* an error (see [`crate::pipeline::extract`]); it simply produces no
//! converter flag.
//!
//! Failures to remove individual byproduct files during cleanup are logged
//! as warnings and never surface here.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// All fatal errors returned by the latex2mobi library.
#[derive(Debug, Error)]
pub enum Latex2MobiError {
    // ── Tool errors ───────────────────────────────────────────────────────
    /// A required external command is not on `PATH`.
    #[error("Required command '{command}' was not found.\n{hint}")]
    MissingTool { command: String, hint: String },

    /// The external command exists but could not be started.
    #[error("Failed to run '{command}': {source}")]
    ToolSpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The external command ran and exited unsuccessfully.
    #[error("'{command}' failed with {status}")]
    ToolFailed { command: String, status: ExitStatus },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input document was not found at the given path.
    #[error("Document not found: '{path}'\nCheck the path exists and is readable.")]
    DocumentNotFound { path: PathBuf },

    /// Process does not have read permission on the document.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The document exists but could not be read (e.g. it is a directory).
    #[error("Failed to read document '{path}': {source}")]
    DocumentUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input path has no file name component.
    #[error("Invalid input '{path}': not a document file path")]
    InvalidInput { path: PathBuf },

    // ── Workspace errors ──────────────────────────────────────────────────
    /// The uniquely named working copy of the document could not be created.
    #[error("Failed to prepare working copy in '{dir}': {source}")]
    WorkspaceFailed {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Latex2MobiError {
    /// Whether this error was raised before any external command ran.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Latex2MobiError::DocumentNotFound { .. }
                | Latex2MobiError::PermissionDenied { .. }
                | Latex2MobiError::DocumentUnreadable { .. }
                | Latex2MobiError::InvalidInput { .. }
        )
    }
}
