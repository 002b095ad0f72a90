//! External collaborators: tex4ht (stage 1) and the e-book packager
//! (stage 2).
//!
//! Both are one-shot blocking invocations. Their availability is checked up
//! front with [`check_tools`] so a missing command is reported before the
//! document is even read. Output of the tools is captured and forwarded to
//! the `debug` log; on failure the last lines are logged as warnings.

use crate::config::ConversionConfig;
use crate::error::Latex2MobiError;
use crate::output::ConversionOptions;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tracing::{debug, info, warn};

/// Output-format selector passed to tex4ht.
pub const TRANSFORMER_FORMAT: &str = "xhtml";

/// Lines of tool output echoed as warnings when a tool fails.
const FAILURE_TAIL_LINES: usize = 15;

/// Absolute paths of both external commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub transformer: PathBuf,
    pub packager: PathBuf,
}

/// Locate a command on `PATH` (or check an explicit path).
pub fn require_tool(command: &str, hint: &str) -> Result<PathBuf, Latex2MobiError> {
    let path = which::which(command).map_err(|_| Latex2MobiError::MissingTool {
        command: command.to_string(),
        hint: hint.to_string(),
    })?;
    debug!("Found '{}' at {}", command, path.display());
    Ok(path)
}

/// Check both stages' commands exist before doing any work.
pub fn check_tools(config: &ConversionConfig) -> Result<Toolchain, Latex2MobiError> {
    let transformer = require_tool(
        &config.transformer_command(),
        "Install TeX4ht (shipped with TeX Live and MiKTeX).",
    )?;
    let packager = require_tool(
        &config.packager,
        "Install calibre, which provides ebook-convert.",
    )?;
    Ok(Toolchain {
        transformer,
        packager,
    })
}

/// Stage 1: `ht<engine> <file name> xhtml`, run inside `dir`.
pub fn run_transformer(tool: &Path, dir: &Path, file_name: &str) -> Result<(), Latex2MobiError> {
    let mut cmd = Command::new(tool);
    cmd.arg(file_name).arg(TRANSFORMER_FORMAT).current_dir(dir);
    info!("Running {} on {}", tool.display(), file_name);
    run(cmd, tool)
}

/// Stage 2: `<packager> <html> <output> <options...>`, run inside `dir`.
pub fn run_packager(
    tool: &Path,
    dir: &Path,
    html: &Path,
    output: &Path,
    options: &ConversionOptions,
) -> Result<(), Latex2MobiError> {
    let mut cmd = Command::new(tool);
    cmd.arg(html)
        .arg(output)
        .args(options.iter())
        .current_dir(dir);
    info!("Packaging {} → {}", html.display(), output.display());
    debug!("Packager options: {:?}", options.as_slice());
    run(cmd, tool)
}

fn run(mut cmd: Command, tool: &Path) -> Result<(), Latex2MobiError> {
    let command = tool.display().to_string();
    let output = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|e| Latex2MobiError::ToolSpawnFailed {
            command: command.clone(),
            source: e,
        })?;

    log_output(&command, &output);

    if !output.status.success() {
        for line in tail(&output, FAILURE_TAIL_LINES) {
            warn!("{}: {}", command, line);
        }
        return Err(Latex2MobiError::ToolFailed {
            command,
            status: output.status,
        });
    }
    Ok(())
}

fn log_output(command: &str, output: &Output) {
    for line in String::from_utf8_lossy(&output.stdout).lines() {
        debug!("{}: {}", command, line);
    }
    for line in String::from_utf8_lossy(&output.stderr).lines() {
        debug!("{} (stderr): {}", command, line);
    }
}

/// Last `n` non-empty lines of stderr, falling back to stdout (TeX reports
/// errors on stdout).
fn tail(output: &Output, n: usize) -> Vec<String> {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let text = if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout)
    } else {
        stderr
    };
    let lines: Vec<String> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].to_vec()
}
