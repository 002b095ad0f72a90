//! Conversion planning: map document structure and metadata to
//! `ebook-convert` flags.
//!
//! ## Chapter detection
//!
//! tex4ht tags headings with a structural class attribute (`sectionHead`,
//! `chapterHead`, `partHead`). The packager splits chapters on an XPath over
//! the intermediate HTML, so the selector depends on the document class:
//!
//! | class     | selector |
//! |-----------|----------|
//! | `article` | `//*[@class="sectionHead"]` |
//! | `book`    | `//*[re:test(@class,"partHead\|chapterHead")]` |
//! | other     | none; the packager's own heuristic applies |

use crate::output::{ConversionOptions, DocumentMetadata};
use tracing::debug;

/// Chapter selector for `article` documents.
pub const ARTICLE_CHAPTER_XPATH: &str = r#"//*[@class="sectionHead"]"#;

/// Chapter selector for `book` documents.
pub const BOOK_CHAPTER_XPATH: &str = r#"//*[re:test(@class,"partHead|chapterHead")]"#;

/// Default packager output profile (Kindle-optimised).
pub const DEFAULT_OUTPUT_PROFILE: &str = "kindle";

/// Builds the ordered packager flag list for one document.
#[derive(Debug, Clone)]
pub struct ConversionPlanner {
    output_profile: String,
}

impl Default for ConversionPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_PROFILE)
    }
}

impl ConversionPlanner {
    pub fn new(output_profile: impl Into<String>) -> Self {
        Self {
            output_profile: output_profile.into(),
        }
    }

    /// Chapter selector for a document class, if the class has one.
    pub fn chapter_selector(document_class: Option<&str>) -> Option<&'static str> {
        match document_class? {
            "article" => Some(ARTICLE_CHAPTER_XPATH),
            "book" => Some(BOOK_CHAPTER_XPATH),
            _ => None,
        }
    }

    /// Derive every flag, in a fixed order: baseline, structure, language,
    /// then one flag per metadata field present.
    pub fn plan(&self, meta: &DocumentMetadata) -> ConversionOptions {
        let mut opts = ConversionOptions::new();

        opts.push_value("output-profile", &self.output_profile);
        opts.push_flag("no-inline-toc");

        if let Some(xpath) = Self::chapter_selector(meta.document_class.as_deref()) {
            opts.push_value("chapter", xpath);
        }

        // Only one language can be passed on.
        if let Some(lang) = meta.primary_language() {
            opts.push_value("language", lang);
        }

        let fields = [
            ("authors", &meta.author),
            ("cover", &meta.cover),
            ("publisher", &meta.publisher),
            ("isbn", &meta.isbn),
            ("title", &meta.title),
            ("pubdate", &meta.date),
            ("comments", &meta.synopsis),
            ("tags", &meta.subjects),
            ("rating", &meta.rating),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                opts.push_value(name, value);
            }
        }

        debug!("Planned {} packager options", opts.len());
        opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extract::MetadataExtractor;

    fn plan_for(source: &str) -> ConversionOptions {
        ConversionPlanner::default().plan(&MetadataExtractor::new(source).metadata())
    }

    fn has_chapter(opts: &ConversionOptions) -> bool {
        opts.value_of("chapter").is_some()
    }

    #[test]
    fn test_baseline_always_present() {
        let opts = plan_for("");
        let flags: Vec<&str> = opts.iter().collect();
        assert_eq!(flags, vec!["--output-profile=kindle", "--no-inline-toc"]);
    }

    #[test]
    fn test_book_selector() {
        let opts = plan_for(r"\documentclass[12pt]{book}");
        assert_eq!(
            opts.value_of("chapter"),
            Some(r#"//*[re:test(@class,"partHead|chapterHead")]"#)
        );
    }

    #[test]
    fn test_article_selector() {
        let opts = plan_for(r"\documentclass{article}");
        assert_eq!(opts.value_of("chapter"), Some(r#"//*[@class="sectionHead"]"#));
    }

    #[test]
    fn test_other_classes_have_no_selector() {
        for class in ["report", "memoir", "letter", "Book", "scrbook"] {
            let opts = plan_for(&format!("\\documentclass{{{class}}}"));
            assert!(!has_chapter(&opts), "unexpected selector for {class}");
        }
        assert!(!has_chapter(&plan_for("no class here")));
    }

    #[test]
    fn test_only_first_language_used() {
        let opts = plan_for(r"\usepackage[english,german]{babel}");
        assert_eq!(opts.value_of("language"), Some("english"));
        assert_eq!(opts.iter().filter(|f| f.starts_with("--language=")).count(), 1);
        assert!(!opts.iter().any(|f| f.contains("german")));
    }

    #[test]
    fn test_author_flag_is_unescaped() {
        let opts = plan_for(r"\author{Jane \& Doe}");
        assert_eq!(opts.value_of("authors"), Some("Jane & Doe"));
    }

    #[test]
    fn test_missing_isbn_gives_no_flag() {
        let opts = plan_for("\\documentclass{book}\n\\publisher{ACME}");
        assert_eq!(opts.value_of("isbn"), None);
        assert_eq!(opts.value_of("publisher"), Some("ACME"));
    }

    #[test]
    fn test_full_order_is_deterministic() {
        let src = "\\documentclass{article}\n\
                   \\usepackage[polish]{babel}\n\
                   \\rating{5}\n\
                   \\ISBN{123}\n\
                   \\publisher{P}\n\
                   \\covergraphic{c.jpg}\n\
                   \\author{A}\n\
                   \\title{T}\n\
                   \\date{D}\n\
                   \\synopsis{S}\n\
                   \\subjects{X}\n";
        let flags: Vec<String> = plan_for(src).into_iter().collect();
        assert_eq!(
            flags,
            vec![
                "--output-profile=kindle".to_string(),
                "--no-inline-toc".into(),
                r#"--chapter=//*[@class="sectionHead"]"#.into(),
                "--language=polish".into(),
                "--authors=A".into(),
                "--cover=c.jpg".into(),
                "--publisher=P".into(),
                "--isbn=123".into(),
                "--title=T".into(),
                "--pubdate=D".into(),
                "--comments=S".into(),
                "--tags=X".into(),
                "--rating=5".into(),
            ]
        );
        assert_eq!(plan_for(src), plan_for(src));
    }

    #[test]
    fn test_custom_output_profile() {
        let opts = ConversionPlanner::new("kindle_pw3").plan(&DocumentMetadata::default());
        assert_eq!(opts.value_of("output-profile"), Some("kindle_pw3"));
    }
}
