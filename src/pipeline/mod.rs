//! Pipeline stages for LaTeX-to-Kindle conversion.
//!
//! Each submodule implements exactly one step. Only [`extract`] and [`plan`]
//! make decisions; the rest is file access and process plumbing.
//!
//! ## Data Flow
//!
//! ```text
//! external::check ──▶ input ──▶ extract ──▶ plan ──▶ external::run ──▶ cleanup
//!  (PATH lookup)     (read)    (regex)    (flags)   (ht*latex, ebook-convert)
//! ```
//!
//! 1. [`external`] - verify both external commands exist before any work,
//!    later run them one-shot and blocking
//! 2. [`input`]    - read the document, telling "missing" from "unreadable"
//! 3. [`extract`]  - line-anchored pattern lookups for metadata fields
//! 4. [`plan`]     - map document class and metadata to packager flags
//! 5. [`cleanup`]  - delete stage-1 byproducts unless asked to keep them

pub mod cleanup;
pub mod external;
pub mod extract;
pub mod input;
pub mod plan;
