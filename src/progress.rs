//! Progress-callback trait for conversion stage events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to be told
//! when each external stage starts and finishes. Both stages can run for a
//! long time on large books, so the CLI uses this to drive a spinner.
//!
//! # Example
//!
//! ```rust
//! use latex2mobi::{ConversionConfig, ConversionProgressCallback, Stage};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl ConversionProgressCallback for Printer {
//!     fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
//!         eprintln!("{stage} done in {elapsed_ms}ms");
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(Printer) as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::fmt;
use std::sync::Arc;

/// A step of the conversion pipeline that reports progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// LaTeX → HTML via tex4ht.
    Transform,
    /// HTML → e-book via the packager.
    Package,
    /// Byproduct removal.
    Cleanup,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Transform => "Transforming",
            Stage::Package => "Packaging",
            Stage::Cleanup => "Cleaning up",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Called by the conversion pipeline as it moves through its stages.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Calls happen on the converting thread, in order.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after metadata extraction, before any external command.
    ///
    /// # Arguments
    /// * `document` - display name of the document
    /// * `options`  - number of packager options planned
    fn on_conversion_start(&self, document: &str, options: usize) {
        let _ = (document, options);
    }

    /// Called just before a stage begins.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage finishes successfully.
    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        let _ = (stage, elapsed_ms);
    }

    /// Called when a stage fails; the conversion stops afterwards.
    fn on_stage_error(&self, stage: Stage, error: &str) {
        let _ = (stage, error);
    }

    /// Called once at the end, successful or not.
    fn on_conversion_complete(&self, success: bool) {
        let _ = success;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingCallback {
        events: Mutex<Vec<String>>,
    }

    impl ConversionProgressCallback for RecordingCallback {
        fn on_stage_start(&self, stage: Stage) {
            self.events.lock().unwrap().push(format!("start {stage:?}"));
        }

        fn on_stage_error(&self, stage: Stage, error: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("error {stage:?}: {error}"));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start("book.tex", 4);
        cb.on_stage_start(Stage::Transform);
        cb.on_stage_complete(Stage::Transform, 10);
        cb.on_stage_error(Stage::Package, "boom");
        cb.on_conversion_complete(false);
    }

    #[test]
    fn recording_callback_keeps_order() {
        let cb = RecordingCallback::default();
        cb.on_stage_start(Stage::Transform);
        cb.on_stage_error(Stage::Transform, "exit 1");
        cb.on_stage_complete(Stage::Transform, 1);
        let events = cb.events.lock().unwrap();
        assert_eq!(
            *events,
            vec!["start Transform".to_string(), "error Transform: exit 1".into()]
        );
    }

    #[test]
    fn stage_labels() {
        assert_eq!(Stage::Package.to_string(), "Packaging");
        assert_eq!(Stage::Cleanup.label(), "Cleaning up");
    }
}
