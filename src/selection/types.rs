//! Type definitions for selection capture.

use thiserror::Error;

use crate::buffer::BufferId;

/// Visual selection mode.
///
/// Determines how the mark columns are interpreted during capture and
/// write-back. Every place that branches on mode matches exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualMode {
    /// Character-wise selection (v): columns bound the run of text from the
    /// start mark to the end mark.
    Char,
    /// Line-wise selection (V): columns are ignored; whole lines.
    Line,
    /// Block/rectangular selection (Ctrl+V): the same column span on every
    /// line in range.
    Block,
}

/// A raw selection mark: 1-based line, 0-based codepoint column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Mark {
    pub line: usize,
    pub col: usize,
}

impl Mark {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// An immutable snapshot of one captured region.
///
/// The coordinates and `text` are consistent at capture time: the text is
/// exactly what re-slicing the buffer with the stored coordinates and mode
/// would produce. A Selection does not track buffer edits made after
/// capture; it is consumed once by the replacement engine and dropped.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Id of the buffer the selection was captured from.
    pub buffer: BufferId,
    /// First selected line, 1-based inclusive.
    pub start_line: usize,
    /// Last selected line, 1-based inclusive. Always >= `start_line`.
    pub end_line: usize,
    /// Start column, 0-based codepoint offset; meaning depends on `mode`.
    pub start_col: usize,
    /// End column, 0-based codepoint offset, inclusive for `Char`/`Block`;
    /// the length of the last line for `Line`.
    pub end_col: usize,
    /// How the columns are interpreted.
    pub mode: VisualMode,
    /// The captured source text, lines joined by `\n`.
    pub text: String,
    /// Leading whitespace of the first captured line.
    pub indent: String,
}

impl Selection {
    /// Number of lines the selection spans.
    pub fn height(&self) -> usize {
        self.end_line - self.start_line + 1
    }

    /// The captured text as individual lines.
    pub fn lines(&self) -> Vec<&str> {
        self.text.split('\n').collect()
    }
}

/// Why a capture attempt produced no selection.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The host had no selection marks to hand over (for example, the
    /// trigger fired outside any visual selection).
    #[error("no selection marks available")]
    NoMarks,

    /// A mark referenced a line the buffer does not have.
    #[error("selection line {line} is out of range (buffer has {line_count} lines)")]
    LineOutOfRange { line: usize, line_count: usize },

    /// The buffer is gone; nothing to capture from.
    #[error("buffer is no longer valid")]
    BufferInvalid,
}
