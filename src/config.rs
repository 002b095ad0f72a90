//! Configuration types for LaTeX-to-Kindle conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`].
//!
//! # Example
//! ```rust
//! use latex2mobi::{ConversionConfig, Engine};
//!
//! let config = ConversionConfig::builder()
//!     .engine(Engine::Xelatex)
//!     .keep_html(true)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.transformer_command(), "htxelatex");
//! ```

use crate::error::Latex2MobiError;
use crate::pipeline::plan::DEFAULT_OUTPUT_PROFILE;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Default stage-2 packager (calibre).
pub const DEFAULT_PACKAGER: &str = "ebook-convert";

/// Default package extension when no output path is given.
pub const DEFAULT_OUTPUT_EXTENSION: &str = "mobi";

/// TeX engine variant used by tex4ht for stage 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Engine {
    /// `htlatex` (default).
    #[default]
    Latex,
    /// `htlualatex`.
    Lualatex,
    /// `htxelatex`.
    Xelatex,
}

impl Engine {
    pub fn name(self) -> &'static str {
        match self {
            Engine::Latex => "latex",
            Engine::Lualatex => "lualatex",
            Engine::Xelatex => "xelatex",
        }
    }

    /// The tex4ht wrapper script for this engine: `ht` + engine name.
    pub fn transformer_command(self) -> String {
        format!("ht{}", self.name())
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for one LaTeX-to-Kindle conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
#[derive(Clone)]
pub struct ConversionConfig {
    /// TeX engine for stage 1. Default: [`Engine::Latex`].
    pub engine: Engine,

    /// Keep every stage-1 byproduct, markup included. Default: false.
    pub keep_files: bool,

    /// Keep the intermediate `.html`/`.css` files only. Ignored when
    /// `keep_files` is set. Default: false.
    pub keep_html: bool,

    /// Package path. If None, `<document dir>/<stem>.mobi`.
    pub output: Option<PathBuf>,

    /// Packager output profile. Default: `kindle`.
    pub output_profile: String,

    /// Stage-1 command override. If None, derived from `engine`.
    pub transformer: Option<String>,

    /// Stage-2 command. Default: `ebook-convert`.
    pub packager: String,

    /// Optional stage-event callback. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            engine: Engine::default(),
            keep_files: false,
            keep_html: false,
            output: None,
            output_profile: DEFAULT_OUTPUT_PROFILE.to_string(),
            transformer: None,
            packager: DEFAULT_PACKAGER.to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("engine", &self.engine)
            .field("keep_files", &self.keep_files)
            .field("keep_html", &self.keep_html)
            .field("output", &self.output)
            .field("output_profile", &self.output_profile)
            .field("transformer", &self.transformer)
            .field("packager", &self.packager)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The stage-1 command that will actually be run.
    pub fn transformer_command(&self) -> String {
        self.transformer
            .clone()
            .unwrap_or_else(|| self.engine.transformer_command())
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn engine(mut self, engine: Engine) -> Self {
        self.config.engine = engine;
        self
    }

    pub fn keep_files(mut self, v: bool) -> Self {
        self.config.keep_files = v;
        self
    }

    pub fn keep_html(mut self, v: bool) -> Self {
        self.config.keep_html = v;
        self
    }

    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output = Some(path.into());
        self
    }

    pub fn output_profile(mut self, profile: impl Into<String>) -> Self {
        self.config.output_profile = profile.into();
        self
    }

    pub fn transformer(mut self, command: impl Into<String>) -> Self {
        self.config.transformer = Some(command.into());
        self
    }

    pub fn packager(mut self, command: impl Into<String>) -> Self {
        self.config.packager = command.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Latex2MobiError> {
        let c = &self.config;
        if c.output_profile.trim().is_empty() {
            return Err(Latex2MobiError::InvalidConfig(
                "Output profile must not be empty".into(),
            ));
        }
        if c.packager.trim().is_empty() {
            return Err(Latex2MobiError::InvalidConfig(
                "Packager command must not be empty".into(),
            ));
        }
        if c.transformer.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(Latex2MobiError::InvalidConfig(
                "Transformer command must not be empty".into(),
            ));
        }
        if c.output.as_ref().is_some_and(|p| p.file_name().is_none()) {
            return Err(Latex2MobiError::InvalidConfig(format!(
                "Output path {:?} has no file name",
                c.output
            )));
        }
        Ok(self.config)
    }
}
