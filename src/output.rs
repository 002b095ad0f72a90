//! Data produced by a conversion run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Bibliographic metadata extracted from the LaTeX preamble.
///
/// Every field is optional: a declaration missing from the source is the
/// normal case, not an error. Text fields are already unescaped (`\&` → `&`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// `\documentclass{..}`, e.g. `book` or `article`.
    pub document_class: Option<String>,
    /// Babel languages in declaration order.
    pub languages: Option<Vec<String>>,
    pub author: Option<String>,
    /// Cover image path, relative to the document directory.
    pub cover: Option<String>,
    pub date: Option<String>,
    pub publisher: Option<String>,
    /// Digits only.
    pub isbn: Option<String>,
    pub title: Option<String>,
    pub synopsis: Option<String>,
    pub subjects: Option<String>,
    pub rating: Option<String>,
}

impl DocumentMetadata {
    /// First declared language, the only one the packager is told about.
    pub fn primary_language(&self) -> Option<&str> {
        self.languages
            .as_ref()
            .and_then(|langs| langs.first())
            .map(String::as_str)
    }

    /// Number of fields that were found in the source.
    pub fn field_count(&self) -> usize {
        [
            self.document_class.is_some(),
            self.languages.is_some(),
            self.author.is_some(),
            self.cover.is_some(),
            self.date.is_some(),
            self.publisher.is_some(),
            self.isbn.is_some(),
            self.title.is_some(),
            self.synopsis.is_some(),
            self.subjects.is_some(),
            self.rating.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}

/// Ordered packager flags, e.g. `--language=english`.
///
/// Order does not matter to `ebook-convert` but is kept deterministic so
/// invocations are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversionOptions(Vec<String>);

impl ConversionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bare flag such as `--no-inline-toc`.
    pub fn push_flag(&mut self, flag: &str) {
        self.0.push(format!("--{flag}"));
    }

    /// Append a `--name=value` flag.
    pub fn push_value(&mut self, name: &str, value: &str) {
        self.0.push(format!("--{name}={value}"));
    }

    /// Value of the first `--name=value` flag, if any.
    pub fn value_of(&self, name: &str) -> Option<&str> {
        let prefix = format!("--{name}=");
        self.0.iter().find_map(|f| f.strip_prefix(prefix.as_str()))
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.0.iter().any(|f| f == flag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl IntoIterator for ConversionOptions {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Metadata and packager options derived from one document, without running
/// any external command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionPlan {
    pub document: PathBuf,
    pub metadata: DocumentMetadata,
    pub options: ConversionOptions,
}

/// Outcome of a completed conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    /// The e-book written by the packager.
    pub output: PathBuf,
    pub metadata: DocumentMetadata,
    pub options: ConversionOptions,
    /// Byproducts left in place because of the keep flags. Their names carry
    /// the per-run working stem (`<stem>-XXXXXX.html`).
    pub kept: Vec<PathBuf>,
    pub stats: ConversionStats,
}

/// Timing and cleanup figures for a conversion run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    pub transform_duration_ms: u64,
    pub package_duration_ms: u64,
    pub total_duration_ms: u64,
    /// Byproduct files removed by cleanup.
    pub removed_files: usize,
    /// Byproduct files left in place because of the keep flags.
    pub kept_files: usize,
}
