//! Metadata extraction: line-anchored pattern lookups over LaTeX source.
//!
//! This is deliberately not a LaTeX parser. Preamble declarations such as
//! `\author{..}` are conventionally written one per line at the start of the
//! line, so each field is recognised by a single regex anchored at `^` and
//! tried against every line in order; the first hit wins. Declarations that
//! do not start a line are not seen, which also keeps commented-out or
//! example text elsewhere from producing false positives.
//!
//! Free-text values run to the brace that closes the opening one, skipping
//! escaped characters, and may continue over following lines (long synopses
//! are wrapped). A value whose braces never balance is absent.
//!
//! A field that never matches is simply absent. Extraction itself cannot
//! fail; only reading the document can (see [`crate::pipeline::input`]).

use crate::error::Latex2MobiError;
use crate::output::DocumentMetadata;
use crate::pipeline::input;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

// ── Patterns ─────────────────────────────────────────────────────────────────

static RE_DOCUMENT_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\\documentclass\s*(?:\[[^\]]*\])?\s*\{\s*([^}\s]+)\s*\}").unwrap()
});

static RE_LANGUAGES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\\usepackage\s*\[([^\]]+)\]\s*\{babel\}").unwrap());

static RE_AUTHOR: Lazy<Regex> = Lazy::new(|| text_declaration("author"));
static RE_COVER: Lazy<Regex> = Lazy::new(|| text_declaration("covergraphic"));
static RE_DATE: Lazy<Regex> = Lazy::new(|| text_declaration("date"));
static RE_PUBLISHER: Lazy<Regex> = Lazy::new(|| text_declaration("publisher"));
static RE_TITLE: Lazy<Regex> = Lazy::new(|| text_declaration("title"));
static RE_SYNOPSIS: Lazy<Regex> = Lazy::new(|| text_declaration("synopsis"));
static RE_SUBJECTS: Lazy<Regex> = Lazy::new(|| text_declaration("subjects"));

static RE_ISBN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\\ISBN\s*\{([0-9]+)\}").unwrap());

static RE_RATING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\\rating\s*\{([0-9]+(?:\.[0-9]+)?)\}").unwrap());

/// Any backslash followed by one character.
static RE_ESCAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\(.)").unwrap());

/// The opening `^\command{` of a free-text declaration; the value is read
/// by [`braced_value`].
fn text_declaration(command: &str) -> Regex {
    Regex::new(&format!(r"^\\{command}\s*\{{")).unwrap()
}

/// Text up to the `}` closing an already opened group, starting in `first`
/// and continuing over `rest` (joined with `\n`) while the group is open.
/// Backslash escapes are skipped, so `\{` and `\}` do not count.
fn braced_value<'a>(first: &'a str, rest: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut value = String::new();
    let mut depth = 1usize;
    for (i, line) in std::iter::once(first).chain(rest).enumerate() {
        if i > 0 {
            value.push('\n');
        }
        let mut chars = line.char_indices();
        while let Some((pos, c)) = chars.next() {
            match c {
                '\\' => {
                    chars.next();
                }
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        value.push_str(&line[..pos]);
                        return Some(value);
                    }
                }
                _ => {}
            }
        }
        value.push_str(line);
    }
    None
}

// ── Fields ───────────────────────────────────────────────────────────────────

/// One recognisable preamble declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    DocumentClass,
    Languages,
    Author,
    Cover,
    Date,
    Publisher,
    Isbn,
    Title,
    Synopsis,
    Subjects,
    Rating,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::DocumentClass,
        Field::Languages,
        Field::Author,
        Field::Cover,
        Field::Date,
        Field::Publisher,
        Field::Isbn,
        Field::Title,
        Field::Synopsis,
        Field::Subjects,
        Field::Rating,
    ];

    fn pattern(self) -> &'static Regex {
        match self {
            Field::DocumentClass => &RE_DOCUMENT_CLASS,
            Field::Languages => &RE_LANGUAGES,
            Field::Author => &RE_AUTHOR,
            Field::Cover => &RE_COVER,
            Field::Date => &RE_DATE,
            Field::Publisher => &RE_PUBLISHER,
            Field::Isbn => &RE_ISBN,
            Field::Title => &RE_TITLE,
            Field::Synopsis => &RE_SYNOPSIS,
            Field::Subjects => &RE_SUBJECTS,
            Field::Rating => &RE_RATING,
        }
    }

    /// Free-text fields carry LaTeX escapes that must be undone.
    fn is_text(self) -> bool {
        matches!(
            self,
            Field::Author
                | Field::Cover
                | Field::Date
                | Field::Publisher
                | Field::Title
                | Field::Synopsis
                | Field::Subjects
        )
    }

    /// Try this field's declaration against a single line.
    ///
    /// Returns the raw value (not unescaped), or `None` when the line does
    /// not declare this field, declares it blank, or leaves it unclosed.
    pub fn try_match(self, line: &str) -> Option<String> {
        self.match_from(line, std::iter::empty())
    }

    /// Like [`Field::try_match`], but a free-text value opened on `line` may
    /// close on one of the `rest` lines.
    fn match_from<'a>(self, line: &'a str, rest: impl Iterator<Item = &'a str>) -> Option<String> {
        let value = if self.is_text() {
            let open = self.pattern().find(line)?;
            braced_value(&line[open.end()..], rest)?
        } else {
            self.pattern().captures(line)?.get(1)?.as_str().to_string()
        };
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    }
}

/// Replace every backslash-plus-character pair with the character alone.
///
/// Reverses the LaTeX convention of escaping special characters
/// (`\&` → `&`, `\_` → `_`). Applied uniformly, whatever follows the
/// backslash. A trailing lone backslash is left as is.
pub fn unescape(text: &str) -> String {
    RE_ESCAPE.replace_all(text, "$1").into_owned()
}

// ── Extractor ────────────────────────────────────────────────────────────────

/// Typed, independent metadata lookups over a document's source text.
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    source: String,
}

impl MetadataExtractor {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Read the document at `path` and wrap its text.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Latex2MobiError> {
        Ok(Self::new(input::read_document(path.as_ref())?))
    }

    /// First raw value declared for `field`, scanning lines in order.
    pub fn find(&self, field: Field) -> Option<String> {
        let mut lines = self.source.lines();
        while let Some(line) = lines.next() {
            if let Some(value) = field.match_from(line, lines.clone()) {
                return Some(value);
            }
        }
        None
    }

    fn find_text(&self, field: Field) -> Option<String> {
        debug_assert!(field.is_text());
        self.find(field).map(|raw| unescape(&raw))
    }

    pub fn document_class(&self) -> Option<String> {
        self.find(Field::DocumentClass)
    }

    /// Babel languages, comma-separated and trimmed, in declaration order.
    pub fn languages(&self) -> Option<Vec<String>> {
        let raw = self.find(Field::Languages)?;
        Some(
            raw.split(',')
                .map(str::trim)
                .filter(|lang| !lang.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn author(&self) -> Option<String> {
        self.find_text(Field::Author)
    }

    pub fn cover(&self) -> Option<String> {
        self.find_text(Field::Cover)
    }

    pub fn date(&self) -> Option<String> {
        self.find_text(Field::Date)
    }

    pub fn publisher(&self) -> Option<String> {
        self.find_text(Field::Publisher)
    }

    /// Digits only, so no unescaping.
    pub fn isbn(&self) -> Option<String> {
        self.find(Field::Isbn)
    }

    pub fn title(&self) -> Option<String> {
        self.find_text(Field::Title)
    }

    pub fn synopsis(&self) -> Option<String> {
        self.find_text(Field::Synopsis)
    }

    pub fn subjects(&self) -> Option<String> {
        self.find_text(Field::Subjects)
    }

    pub fn rating(&self) -> Option<String> {
        self.find(Field::Rating)
    }

    /// Run every lookup once.
    pub fn metadata(&self) -> DocumentMetadata {
        let meta = DocumentMetadata {
            document_class: self.document_class(),
            languages: self.languages(),
            author: self.author(),
            cover: self.cover(),
            date: self.date(),
            publisher: self.publisher(),
            isbn: self.isbn(),
            title: self.title(),
            synopsis: self.synopsis(),
            subjects: self.subjects(),
            rating: self.rating(),
        };
        debug!(
            "Extracted {}/{} metadata fields",
            meta.field_count(),
            Field::ALL.len()
        );
        meta
    }
}
