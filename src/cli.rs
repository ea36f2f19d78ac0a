//! Command-line interface for par-revise.
//!
//! This module handles CLI argument parsing for the one-shot host: apply a
//! single rewrite cycle to a region of a file on disk.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::selection::{Mark, VisualMode};

/// par-revise - AI-assisted selection rewriting
#[derive(Parser, Debug)]
#[command(name = "par-revise")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// File to edit in place (or preview with --dry-run)
    pub file: PathBuf,

    /// Start of the selection as LINE or LINE:COL (1-based line, 0-based column)
    #[arg(long, value_name = "LINE[:COL]")]
    pub start: String,

    /// End of the selection as LINE or LINE:COL
    #[arg(long, value_name = "LINE[:COL]")]
    pub end: String,

    /// Selection mode
    #[arg(long, value_enum, default_value_t = ModeArg::Char)]
    pub mode: ModeArg,

    /// Natural-language instruction for the transform
    #[arg(short, long, value_name = "TEXT")]
    pub instruction: String,

    /// Override the configured transform command
    #[arg(long, value_name = "COMMAND")]
    pub command: Option<String>,

    /// Override the configured timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Do not re-derive replacement indentation from the selection
    #[arg(long)]
    pub no_reindent: bool,

    /// Print a diff preview instead of writing the file
    #[arg(long)]
    pub dry_run: bool,

    /// Log level for the debug log (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

/// Selection mode as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Character-wise: columns bound the selected run of text
    Char,
    /// Line-wise: whole lines, columns ignored
    Line,
    /// Block: the same column span on every line
    Block,
}

impl From<ModeArg> for VisualMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Char => VisualMode::Char,
            ModeArg::Line => VisualMode::Line,
            ModeArg::Block => VisualMode::Block,
        }
    }
}

/// Parse a `LINE` or `LINE:COL` mark. Lines are 1-based, columns 0-based.
pub fn parse_mark(s: &str) -> Result<Mark, String> {
    let (line_str, col_str) = match s.split_once(':') {
        Some((l, c)) => (l, Some(c)),
        None => (s, None),
    };
    let line: usize = line_str
        .trim()
        .parse()
        .map_err(|_| format!("invalid line number '{line_str}'"))?;
    if line == 0 {
        return Err("line numbers are 1-based".to_string());
    }
    let col = match col_str {
        Some(c) => c
            .trim()
            .parse()
            .map_err(|_| format!("invalid column '{c}'"))?,
        None => 0,
    };
    Ok(Mark::new(line, col))
}

/// Derive a filetype hint from the file extension.
pub fn filetype_hint(path: &std::path::Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}
