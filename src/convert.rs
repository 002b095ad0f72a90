//! Conversion entry points.
//!
//! [`convert`] drives the whole pipeline. [`plan`] and [`inspect`] stop
//! after metadata extraction and need no external tools, which makes them
//! useful for checking what a document will be converted with.
//!
//! ## Ordering guarantees
//!
//! Tool availability is checked first, then the document is read; if either
//! fails nothing else happens. Options are only derived from a successfully
//! read document, and stage 2 only runs after stage 1 succeeded. Cleanup runs
//! whenever stage 1 was started, success or not.

use crate::config::{ConversionConfig, DEFAULT_OUTPUT_EXTENSION};
use crate::error::Latex2MobiError;
use crate::output::{
    ConversionOptions, ConversionPlan, ConversionReport, ConversionStats, DocumentMetadata,
};
use crate::pipeline::cleanup::{self, KeepPolicy};
use crate::pipeline::external::{self, Toolchain};
use crate::pipeline::extract::MetadataExtractor;
use crate::pipeline::input::DocumentPaths;
use crate::pipeline::plan::ConversionPlanner;
use crate::progress::Stage;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Convert a LaTeX document to a Kindle e-book.
///
/// # Arguments
/// * `input`  - path to the `.tex` document
/// * `config` - conversion configuration
///
/// # Errors
/// - a required external command is missing
/// - the document cannot be read (not found / permission denied)
/// - the working copy cannot be created
/// - either external stage exits unsuccessfully
pub fn convert(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionReport, Latex2MobiError> {
    let total_start = Instant::now();
    let input = input.as_ref();
    info!("Starting conversion: {}", input.display());

    // ── Step 1: Check external tools ─────────────────────────────────────
    let tools = external::check_tools(config)?;

    // ── Step 2: Read document and extract metadata ───────────────────────
    let paths = DocumentPaths::new(input)?;
    let metadata = MetadataExtractor::from_path(&paths.source)?.metadata();

    // ── Step 3: Derive packager options ──────────────────────────────────
    let options = ConversionPlanner::new(&config.output_profile).plan(&metadata);
    let output = resolve_output_path(config, &paths)?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(&paths.file_name, options.len());
    }

    // ── Step 4: Unique working copy ──────────────────────────────────────
    let work = working_copy(&paths)?;
    let work_stem = file_stem(work.path());
    debug!("Working copy: {}", work.path().display());

    // ── Step 5: Run both stages, then clean up regardless ────────────────
    let staged = run_stages(config, &tools, &paths, work.path(), &work_stem, &output, &options);

    let report = timed(config, Stage::Cleanup, || {
        Ok(cleanup::remove_byproducts(
            &paths.dir,
            &work_stem,
            KeepPolicy {
                keep_files: config.keep_files,
                keep_html: config.keep_html,
            },
        ))
    });
    drop(work);

    let success = staged.is_ok();
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(success);
    }
    let (transform_duration_ms, package_duration_ms) = staged?;
    let (cleanup_report, _) = report?;

    for kept in &cleanup_report.kept {
        info!("Kept {}", kept.display());
    }

    let stats = ConversionStats {
        transform_duration_ms,
        package_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        removed_files: cleanup_report.removed.len(),
        kept_files: cleanup_report.kept.len(),
    };

    info!(
        "Conversion complete: {} in {}ms",
        output.display(),
        stats.total_duration_ms
    );

    Ok(ConversionReport {
        output,
        metadata,
        options,
        kept: cleanup_report.kept,
        stats,
    })
}

/// Extract metadata and derive packager options without running anything.
pub fn plan(
    input: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionPlan, Latex2MobiError> {
    let input = input.as_ref();
    let metadata = inspect(input)?;
    let options = ConversionPlanner::new(&config.output_profile).plan(&metadata);
    Ok(ConversionPlan {
        document: input.to_path_buf(),
        metadata,
        options,
    })
}

/// Extract document metadata only.
///
/// Does not require tex4ht or the packager to be installed.
pub fn inspect(input: impl AsRef<Path>) -> Result<DocumentMetadata, Latex2MobiError> {
    Ok(MetadataExtractor::from_path(input)?.metadata())
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Both external stages; stage 2 is skipped when stage 1 fails.
///
/// Returns the duration of each stage in milliseconds.
fn run_stages(
    config: &ConversionConfig,
    tools: &Toolchain,
    paths: &DocumentPaths,
    work: &Path,
    work_stem: &str,
    output: &Path,
    options: &ConversionOptions,
) -> Result<(u64, u64), Latex2MobiError> {
    let work_name = work
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let ((), transform_ms) = timed(config, Stage::Transform, || {
        external::run_transformer(&tools.transformer, &paths.dir, &work_name)
    })?;

    let html = PathBuf::from(format!("{work_stem}.html"));
    let ((), package_ms) = timed(config, Stage::Package, || {
        external::run_packager(&tools.packager, &paths.dir, &html, output, options)
    })?;

    Ok((transform_ms, package_ms))
}

/// Run one stage, reporting it to the progress callback.
fn timed<T>(
    config: &ConversionConfig,
    stage: Stage,
    f: impl FnOnce() -> Result<T, Latex2MobiError>,
) -> Result<(T, u64), Latex2MobiError> {
    if let Some(ref cb) = config.progress_callback {
        cb.on_stage_start(stage);
    }
    let start = Instant::now();
    match f() {
        Ok(value) => {
            let elapsed_ms = start.elapsed().as_millis() as u64;
            debug!("{} finished in {}ms", stage, elapsed_ms);
            if let Some(ref cb) = config.progress_callback {
                cb.on_stage_complete(stage, elapsed_ms);
            }
            Ok((value, elapsed_ms))
        }
        Err(e) => {
            if let Some(ref cb) = config.progress_callback {
                cb.on_stage_error(stage, &e.to_string());
            }
            Err(e)
        }
    }
}

/// Copy the document next to itself under a unique name, so byproducts of
/// concurrent runs on the same directory never collide. The copy is deleted
/// when the returned handle is dropped.
fn working_copy(paths: &DocumentPaths) -> Result<NamedTempFile, Latex2MobiError> {
    let workspace_err = |source: std::io::Error| Latex2MobiError::WorkspaceFailed {
        dir: paths.dir.clone(),
        source,
    };
    let work = tempfile::Builder::new()
        .prefix(&format!("{}-", paths.stem))
        .suffix(".tex")
        .rand_bytes(6)
        .tempfile_in(&paths.dir)
        .map_err(workspace_err)?;
    std::fs::copy(&paths.source, work.path()).map_err(workspace_err)?;
    Ok(work)
}

/// The package path, made absolute because the packager runs inside the
/// document directory.
fn resolve_output_path(
    config: &ConversionConfig,
    paths: &DocumentPaths,
) -> Result<PathBuf, Latex2MobiError> {
    let output = config
        .output
        .clone()
        .unwrap_or_else(|| paths.sibling(DEFAULT_OUTPUT_EXTENSION));
    std::path::absolute(&output).map_err(|e| Latex2MobiError::WorkspaceFailed {
        dir: output.clone(),
        source: e,
    })
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_next_to_document() {
        let paths = DocumentPaths::new("/books/novel.tex").unwrap();
        let out = resolve_output_path(&ConversionConfig::default(), &paths).unwrap();
        assert_eq!(out, PathBuf::from("/books/novel.mobi"));
    }

    #[test]
    fn test_relative_output_made_absolute() {
        let paths = DocumentPaths::new("/books/novel.tex").unwrap();
        let config = ConversionConfig::builder().output("out/novel.azw3").build().unwrap();
        let out = resolve_output_path(&config, &paths).unwrap();
        assert!(out.is_absolute());
        assert!(out.ends_with("out/novel.azw3"));
    }

    #[test]
    fn test_working_copy_is_unique_and_temporary() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("novel.tex");
        std::fs::write(&doc, "\\documentclass{book}\n").unwrap();
        let paths = DocumentPaths::new(&doc).unwrap();

        let a = working_copy(&paths).unwrap();
        let b = working_copy(&paths).unwrap();
        assert_ne!(a.path(), b.path());
        assert!(file_stem(a.path()).starts_with("novel-"));
        assert_eq!(
            std::fs::read_to_string(a.path()).unwrap(),
            "\\documentclass{book}\n"
        );

        let copy = a.path().to_path_buf();
        drop(a);
        assert!(!copy.exists());
        assert!(doc.exists());
    }

    #[test]
    fn test_plan_without_tools() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("paper.tex");
        std::fs::write(&doc, "\\documentclass{article}\n\\author{A \\& B}\n").unwrap();

        let plan = plan(&doc, &ConversionConfig::default()).unwrap();
        assert_eq!(plan.metadata.author.as_deref(), Some("A & B"));
        assert_eq!(
            plan.options.value_of("chapter"),
            Some(r#"//*[@class="sectionHead"]"#)
        );
    }

    #[test]
    fn test_inspect_missing_document() {
        let err = inspect("/definitely/not/here.tex").unwrap_err();
        assert!(matches!(err, Latex2MobiError::DocumentNotFound { .. }));
    }
}
