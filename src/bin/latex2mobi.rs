//! CLI binary for latex2mobi.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use latex2mobi::{
    convert, plan, ConversionConfig, ConversionPlan, ConversionProgressCallback,
    ConversionReport, Engine, ProgressCallback, Stage,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner naming the running stage, plus one
/// log line per finished stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    /// Remove the spinner line. Also used when a conversion fails before its
    /// first stage, where no completion event is sent.
    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, document: &str, options: usize) {
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {document} with {options} packager options…"))
        ));
    }

    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_prefix(stage.label());
        self.bar.set_message(match stage {
            Stage::Transform => "tex4ht",
            Stage::Package => "ebook-convert",
            Stage::Cleanup => "byproducts",
        });
        self.bar.reset_elapsed();
    }

    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        self.bar.println(format!(
            "  {} {:<14}{}",
            green("✓"),
            stage.label(),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
    }

    fn on_stage_error(&self, stage: Stage, error: &str) {
        // Keep the line short; the full error is printed on exit.
        let first = error.lines().next().unwrap_or(error);
        self.bar
            .println(format!("  {} {:<14}{}", red("✗"), stage.label(), red(first)));
    }

    fn on_conversion_complete(&self, _success: bool) {
        self.finish();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert next to the source (novel.tex → novel.mobi)
  latex2mobi novel.tex

  # Use XeLaTeX and keep the intermediate HTML
  latex2mobi --engine xelatex --keep-html novel.tex

  # Write an AZW3 for a Paperwhite
  latex2mobi --profile kindle_pw3 -o novel.azw3 novel.tex

  # Show the extracted metadata and packager options only
  latex2mobi --inspect-only novel.tex

RECOGNISED PREAMBLE DECLARATIONS (must start a line):
  \documentclass{book|article}   chapter detection
  \usepackage[lang,...]{babel}   --language (first language only)
  \author{..}                    --authors
  \covergraphic{..}              --cover
  \publisher{..}                 --publisher
  \ISBN{digits}                  --isbn
  \title{..}  \date{..}          --title  --pubdate
  \synopsis{..}  \subjects{..}   --comments  --tags
  \rating{n}                     --rating

REQUIRED TOOLS:
  ht<engine>      TeX4ht, shipped with TeX Live and MiKTeX
  ebook-convert   calibre

ENVIRONMENT VARIABLES:
  LATEX2MOBI_TRANSFORMER   Use this executable instead of ht<engine>
  LATEX2MOBI_PACKAGER      Use this executable instead of ebook-convert
  RUST_LOG                 Override log filtering (e.g. latex2mobi=debug)
"#;

/// Convert LaTeX documents to Kindle e-books.
#[derive(Parser, Debug)]
#[command(
    name = "latex2mobi",
    version,
    about = "Convert LaTeX documents to Kindle e-books via TeX4ht and calibre",
    long_about = "Convert a LaTeX document to a Kindle e-book. The document is turned into HTML \
by TeX4ht and packaged by calibre's ebook-convert; author, language, cover, publisher and ISBN \
declared in the preamble are passed on to the packager.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// LaTeX document to convert.
    input: PathBuf,

    /// TeX engine used by TeX4ht.
    #[arg(long, env = "LATEX2MOBI_ENGINE", value_enum, default_value = "latex")]
    engine: EngineArg,

    /// Keep all TeX4ht byproducts.
    #[arg(long, env = "LATEX2MOBI_KEEP_FILES")]
    keep_files: bool,

    /// Keep the intermediate HTML and CSS (implied by --keep-files).
    #[arg(long, env = "LATEX2MOBI_KEEP_HTML")]
    keep_html: bool,

    /// Write the e-book here instead of next to the document.
    #[arg(short, long, env = "LATEX2MOBI_OUTPUT")]
    output: Option<PathBuf>,

    /// ebook-convert output profile.
    #[arg(long, env = "LATEX2MOBI_PROFILE", default_value = "kindle")]
    profile: String,

    /// Stage-1 executable (default: ht<engine>).
    #[arg(long, env = "LATEX2MOBI_TRANSFORMER", hide = true)]
    transformer: Option<String>,

    /// Stage-2 executable.
    #[arg(long, env = "LATEX2MOBI_PACKAGER", default_value = "ebook-convert", hide = true)]
    packager: String,

    /// Print extracted metadata and packager options only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Output structured JSON instead of text.
    #[arg(long, env = "LATEX2MOBI_JSON")]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "LATEX2MOBI_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs (includes tool output).
    #[arg(short, long, env = "LATEX2MOBI_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "LATEX2MOBI_QUIET", conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum EngineArg {
    Latex,
    Lualatex,
    Xelatex,
}

impl From<EngineArg> for Engine {
    fn from(v: EngineArg) -> Self {
        match v {
            EngineArg::Latex => Engine::Latex,
            EngineArg::Lualatex => Engine::Lualatex,
            EngineArg::Xelatex => Engine::Xelatex,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner provides the feedback that matters; keep INFO logs out of
    // its way unless asked for.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    if cli.keep_files && cli.keep_html {
        tracing::debug!("--keep-html is implied by --keep-files");
    }

    let spinner = (show_progress && !cli.verbose).then(CliProgressCallback::new);
    let progress_cb: Option<ProgressCallback> = spinner
        .clone()
        .map(|cb| cb as Arc<dyn ConversionProgressCallback>);

    let config = build_config(&cli, progress_cb)?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let plan = plan(&cli.input, &config).context("Failed to inspect document")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&plan).context("Failed to serialise plan")?
            );
        } else {
            print_plan(&plan);
        }
        return Ok(());
    }

    // ── Run conversion ───────────────────────────────────────────────────
    let report = run_conversion(&cli.input, &config, spinner.as_deref())?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !cli.quiet {
        eprintln!("{}", summary(&report));
    }

    Ok(())
}

/// Convert, clearing the spinner on any failure so it never lingers above
/// the error message.
fn run_conversion(
    input: &Path,
    config: &ConversionConfig,
    spinner: Option<&CliProgressCallback>,
) -> Result<ConversionReport> {
    convert(input, config)
        .inspect_err(|_| {
            if let Some(spinner) = spinner {
                spinner.finish();
            }
        })
        .context("Conversion failed")
}

/// One summary line, then one line per byproduct left in place.
fn summary(report: &ConversionReport) -> String {
    let mut out = format!(
        "{}  {}  {}ms  ({} byproducts removed, {} kept)",
        green("✔"),
        bold(&report.output.display().to_string()),
        report.stats.total_duration_ms,
        report.stats.removed_files,
        report.stats.kept_files,
    );
    for path in &report.kept {
        out.push_str(&format!("\n   {} {}", dim("kept"), path.display()));
    }
    out
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .engine(cli.engine.into())
        .keep_files(cli.keep_files)
        .keep_html(cli.keep_html)
        .output_profile(cli.profile.clone())
        .packager(cli.packager.clone());

    if let Some(ref output) = cli.output {
        builder = builder.output(output.clone());
    }
    if let Some(ref transformer) = cli.transformer {
        builder = builder.transformer(transformer.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_plan(plan: &ConversionPlan) {
    let meta = &plan.metadata;
    let row = |label: &str, value: Option<&str>| {
        if let Some(v) = value {
            println!("{:<14}{}", format!("{label}:"), v);
        }
    };

    println!("{:<14}{}", "File:", plan.document.display());
    row("Class", meta.document_class.as_deref());
    if let Some(ref langs) = meta.languages {
        println!("{:<14}{}", "Languages:", langs.join(", "));
    }
    row("Title", meta.title.as_deref());
    row("Author", meta.author.as_deref());
    row("Publisher", meta.publisher.as_deref());
    row("Date", meta.date.as_deref());
    row("ISBN", meta.isbn.as_deref());
    row("Cover", meta.cover.as_deref());
    row("Subjects", meta.subjects.as_deref());
    row("Rating", meta.rating.as_deref());
    row("Synopsis", meta.synopsis.as_deref());

    println!();
    println!("{}", bold("Packager options:"));
    for flag in plan.options.iter() {
        println!("  {}", cyan(flag));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latex2mobi::{ConversionOptions, ConversionStats, DocumentMetadata, Latex2MobiError};

    #[test]
    fn spinner_cleared_when_conversion_fails_before_any_stage() {
        let spinner = CliProgressCallback::new();
        let config = ConversionConfig::builder()
            .transformer("latex2mobi-no-such-transformer")
            .packager("latex2mobi-no-such-packager")
            .progress_callback(spinner.clone() as Arc<dyn ConversionProgressCallback>)
            .build()
            .unwrap();

        let err = run_conversion(Path::new("novel.tex"), &config, Some(&spinner)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Latex2MobiError>(),
            Some(Latex2MobiError::MissingTool { .. })
        ));
        assert!(spinner.bar.is_finished());
    }

    #[test]
    fn summary_lists_kept_files() {
        let report = ConversionReport {
            output: PathBuf::from("/books/novel.mobi"),
            metadata: DocumentMetadata::default(),
            options: ConversionOptions::new(),
            kept: vec![
                PathBuf::from("/books/novel-a1b2c3.html"),
                PathBuf::from("/books/novel-a1b2c3.css"),
            ],
            stats: ConversionStats {
                kept_files: 2,
                ..Default::default()
            },
        };

        let text = summary(&report);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("/books/novel.mobi"));
        assert!(lines[1].ends_with("/books/novel-a1b2c3.html"));
        assert!(lines[2].ends_with("/books/novel-a1b2c3.css"));
    }

    #[test]
    fn summary_without_kept_files_is_one_line() {
        let report = ConversionReport {
            output: PathBuf::from("novel.mobi"),
            metadata: DocumentMetadata::default(),
            options: ConversionOptions::new(),
            kept: Vec::new(),
            stats: ConversionStats::default(),
        };
        assert_eq!(summary(&report).lines().count(), 1);
    }
}
