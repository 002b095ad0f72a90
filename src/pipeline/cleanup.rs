//! Cleanup of stage-1 byproducts.
//!
//! tex4ht leaves a fixed set of auxiliary files next to the document, all
//! sharing the working copy's stem. Markup files (`.html`, `.css`) can be
//! kept on their own with `keep_html`; `keep_files` keeps everything.
//! Removal failures are logged and skipped.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Auxiliary files produced by tex4ht and the TeX run underneath it.
pub const BYPRODUCT_EXTENSIONS: &[&str] =
    &["4ct", "4tc", "aux", "dvi", "idv", "lg", "log", "tmp", "xref"];

/// Intermediate markup files.
pub const MARKUP_EXTENSIONS: &[&str] = &["html", "css"];

/// What to leave behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeepPolicy {
    pub keep_files: bool,
    pub keep_html: bool,
}

impl KeepPolicy {
    fn keeps(self, is_markup: bool) -> bool {
        self.keep_files || (is_markup && self.keep_html)
    }
}

/// Files removed and files deliberately kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: Vec<PathBuf>,
    pub kept: Vec<PathBuf>,
}

/// Every byproduct path stage 1 may create for `stem` in `dir`, paired with
/// whether it is markup.
pub fn byproducts(dir: &Path, stem: &str) -> Vec<(PathBuf, bool)> {
    BYPRODUCT_EXTENSIONS
        .iter()
        .map(|ext| (ext, false))
        .chain(MARKUP_EXTENSIONS.iter().map(|ext| (ext, true)))
        .map(|(ext, is_markup)| (dir.join(format!("{stem}.{ext}")), is_markup))
        .collect()
}

/// Remove the byproducts of `stem` in `dir` that `policy` does not keep.
///
/// Files that do not exist are skipped silently.
pub fn remove_byproducts(dir: &Path, stem: &str, policy: KeepPolicy) -> CleanupReport {
    let mut report = CleanupReport::default();

    for (path, is_markup) in byproducts(dir, stem) {
        if !path.is_file() {
            continue;
        }
        if policy.keeps(is_markup) {
            debug!("Keeping {}", path.display());
            report.kept.push(path);
            continue;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed {}", path.display());
                report.removed.push(path);
            }
            Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn populate(dir: &Path, stem: &str) {
        for ext in BYPRODUCT_EXTENSIONS.iter().chain(MARKUP_EXTENSIONS) {
            std::fs::write(dir.join(format!("{stem}.{ext}")), "x").unwrap();
        }
        std::fs::write(dir.join(format!("{stem}.tex")), "src").unwrap();
        std::fs::write(dir.join("other.log"), "unrelated").unwrap();
    }

    #[test]
    fn test_removes_everything_by_default() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path(), "doc");

        let report = remove_byproducts(dir.path(), "doc", KeepPolicy::default());
        assert_eq!(
            report.removed.len(),
            BYPRODUCT_EXTENSIONS.len() + MARKUP_EXTENSIONS.len()
        );
        assert!(report.kept.is_empty());
        assert!(dir.path().join("doc.tex").exists());
        assert!(dir.path().join("other.log").exists());
        assert!(!dir.path().join("doc.html").exists());
    }

    #[test]
    fn test_keep_html_keeps_markup_only() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path(), "doc");

        let policy = KeepPolicy {
            keep_html: true,
            ..Default::default()
        };
        let report = remove_byproducts(dir.path(), "doc", policy);
        assert_eq!(report.kept.len(), MARKUP_EXTENSIONS.len());
        assert!(dir.path().join("doc.html").exists());
        assert!(dir.path().join("doc.css").exists());
        assert!(!dir.path().join("doc.aux").exists());
    }

    #[test]
    fn test_keep_files_keeps_all() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path(), "doc");

        let policy = KeepPolicy {
            keep_files: true,
            keep_html: false,
        };
        let report = remove_byproducts(dir.path(), "doc", policy);
        assert!(report.removed.is_empty());
        assert!(dir.path().join("doc.idv").exists());
    }

    #[test]
    fn test_missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("doc.log"), "x").unwrap();
        let report = remove_byproducts(dir.path(), "doc", KeepPolicy::default());
        assert_eq!(report.removed, vec![dir.path().join("doc.log")]);
    }
}
