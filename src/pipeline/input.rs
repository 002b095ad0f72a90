//! Input resolution: validate the document path and read its source.
//!
//! tex4ht has to be run from the document's own directory with the bare file
//! name, so besides reading the text we also split the path into the pieces
//! later stages need ([`DocumentPaths`]).

use crate::error::Latex2MobiError;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a document lives and what its byproducts will be called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPaths {
    /// The path as given by the caller.
    pub source: PathBuf,
    /// Working directory for both external stages.
    pub dir: PathBuf,
    /// Bare file name, e.g. `novel.tex`.
    pub file_name: String,
    /// File name without extension, e.g. `novel`.
    pub stem: String,
}

impl DocumentPaths {
    /// Split `path` into directory, file name and stem.
    ///
    /// A path without a directory component resolves to `.`.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, Latex2MobiError> {
        let path = path.as_ref();
        let invalid = || Latex2MobiError::InvalidInput {
            path: path.to_path_buf(),
        };

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(invalid)?
            .to_string();
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(invalid)?
            .to_string();
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Ok(Self {
            source: path.to_path_buf(),
            dir,
            file_name,
            stem,
        })
    }

    /// Default package path: `<dir>/<stem>.<extension>`.
    pub fn sibling(&self, extension: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", self.stem, extension))
    }
}

/// Read the whole document as text.
///
/// A missing file and a file without read permission are reported as
/// distinct errors. Bytes that are not valid UTF-8 are replaced rather than
/// rejected; only the ASCII preamble commands matter for extraction.
pub fn read_document(path: &Path) -> Result<String, Latex2MobiError> {
    let mut file = std::fs::File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Latex2MobiError::DocumentNotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => Latex2MobiError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => Latex2MobiError::DocumentUnreadable {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| Latex2MobiError::DocumentUnreadable {
            path: path.to_path_buf(),
            source: e,
        })?;

    debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
