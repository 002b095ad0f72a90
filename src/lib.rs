//! # latex2mobi
//!
//! Convert LaTeX documents to Kindle e-books, carrying the bibliographic
//! metadata declared in the preamble (author, language, cover, ISBN, …)
//! through to the packaged book.
//!
//! The heavy lifting is done by two external tools: TeX4ht (`htlatex`,
//! `htlualatex` or `htxelatex`) turns the document into HTML, and calibre's
//! `ebook-convert` packages that HTML. This crate decides *how* the packager
//! is invoked: it reads the preamble declarations with line-anchored patterns
//! and maps them, together with the document class, to packager flags.
//!
//! ## Pipeline Overview
//!
//! ```text
//! novel.tex
//!  │
//!  ├─ 1. Tools    check ht<engine> and ebook-convert are on PATH
//!  ├─ 2. Input    read the document (not found ≠ permission denied)
//!  ├─ 3. Extract  \documentclass, babel languages, \author, \ISBN, …
//!  ├─ 4. Plan     --output-profile, --chapter XPath, --language, --authors, …
//!  ├─ 5. Stage 1  ht<engine> novel-XXXXXX.tex xhtml   → novel-XXXXXX.html
//!  ├─ 6. Stage 2  ebook-convert novel-XXXXXX.html novel.mobi <options>
//!  └─ 7. Cleanup  remove .aux/.log/.idv/… (and .html/.css unless kept)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use latex2mobi::{convert, ConversionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let report = convert("novel.tex", &config)?;
//!     println!("wrote {}", report.output.display());
//!     Ok(())
//! }
//! ```
//!
//! Inspecting what a document would be converted with needs no external
//! tools:
//!
//! ```rust,no_run
//! use latex2mobi::{plan, ConversionConfig};
//!
//! let plan = plan("novel.tex", &ConversionConfig::default()).unwrap();
//! for flag in plan.options.iter() {
//!     println!("{flag}");
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `latex2mobi` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, Engine};
pub use convert::{convert, inspect, plan};
pub use error::Latex2MobiError;
pub use output::{
    ConversionOptions, ConversionPlan, ConversionReport, ConversionStats, DocumentMetadata,
};
pub use pipeline::extract::{unescape, MetadataExtractor};
pub use pipeline::plan::ConversionPlanner;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback, Stage};
