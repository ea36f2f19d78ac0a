//! The text buffer boundary.
//!
//! The rewrite engine never owns the text it edits; it works against the
//! [`TextBuffer`] trait, which a host editor implements over its own buffer
//! type. [`MemoryBuffer`] is the built-in implementation used by the CLI
//! host and by tests.
//!
//! ## Index conventions at this boundary
//!
//! - **Lines are 1-based and ranges are inclusive** (`lines(2, 4)` returns
//!   lines 2, 3 and 4). This is the single internal convention; hosts with
//!   0-based buffers convert at their trait impl.
//! - **Columns are 0-based codepoint offsets**, never bytes. Column 3 of
//!   `"café!"` is `'!'`, not a byte inside `'é'`.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

/// Opaque identity of a buffer, stable for the buffer's lifetime.
///
/// A captured selection records the id of the buffer it was taken from so
/// the replacement engine can refuse to write into a different buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(u64);

impl BufferId {
    /// Allocate a process-unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        BufferId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for BufferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "buffer#{}", self.0)
    }
}

/// Errors surfaced by buffer mutations.
#[derive(Debug, Error)]
pub enum BufferError {
    /// The buffer has been closed or otherwise no longer exists.
    #[error("buffer is no longer valid")]
    Invalid,

    /// The buffer is read-only at call time.
    #[error("buffer is not editable")]
    ReadOnly,

    /// A line range fell outside the buffer.
    #[error("line range {start}..={end} out of bounds (buffer has {line_count} lines)")]
    RangeOutOfBounds {
        start: usize,
        end: usize,
        line_count: usize,
    },
}

/// Host-provided access to one text buffer.
///
/// Implementations do not need interior locking: the engine takes one
/// immutable snapshot per call and the host guarantees single-threaded
/// access for the duration of an edit cycle.
pub trait TextBuffer {
    /// Stable identity of this buffer.
    fn id(&self) -> BufferId;

    /// Whether the buffer still exists in the host.
    fn is_valid(&self) -> bool;

    /// Whether the buffer accepts mutations right now.
    fn is_editable(&self) -> bool;

    /// Total number of lines. A valid buffer always has at least one line.
    fn line_count(&self) -> usize;

    /// One line by 1-based number, without its line ending.
    fn line(&self, lnum: usize) -> Option<&str>;

    /// The inclusive 1-based range `[start, end]` as owned strings.
    /// Out-of-range portions are simply absent from the result.
    fn lines(&self, start: usize, end: usize) -> Vec<String>;

    /// Replace the inclusive 1-based range `[start, end]` with `replacement`.
    /// The replacement may have any length, including zero.
    fn splice_lines(
        &mut self,
        start: usize,
        end: usize,
        replacement: Vec<String>,
    ) -> Result<(), BufferError>;

    /// Begin an undo group: every mutation until the matching
    /// [`end_undo_group`](TextBuffer::end_undo_group) collapses into one
    /// undo/redo unit. Groups may nest; only the outermost pair delimits
    /// the unit.
    fn begin_undo_group(&mut self);

    /// Close the current undo group.
    fn end_undo_group(&mut self);

    /// Undo the most recent unit. Returns false when there is nothing to undo.
    fn undo(&mut self) -> bool;

    /// Redo the most recently undone unit.
    fn redo(&mut self) -> bool;

    /// Cursor position as (1-based line, 0-based codepoint column).
    fn cursor(&self) -> (usize, usize);

    /// Move the cursor. Out-of-range positions are clamped by the impl.
    fn set_cursor(&mut self, line: usize, col: usize);
}

/// Snapshot of buffer content for the undo stack.
#[derive(Debug, Clone)]
struct Snapshot {
    lines: Vec<String>,
    cursor: (usize, usize),
}

/// In-memory [`TextBuffer`] backed by a `Vec<String>`.
///
/// Undo is snapshot-based: each undo unit stores the full pre-edit line
/// vector. That is plenty for the single selection-replace cycle this crate
/// performs; a host editor with large buffers will have its own history and
/// implement the trait over it instead.
#[derive(Debug)]
pub struct MemoryBuffer {
    id: BufferId,
    lines: Vec<String>,
    cursor: (usize, usize),
    read_only: bool,
    valid: bool,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    group_depth: u32,
    group_snapshot: Option<Snapshot>,
    group_dirty: bool,
}

impl MemoryBuffer {
    /// Create a buffer from text. An empty string yields one empty line.
    pub fn from_text(text: &str) -> Self {
        let mut lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        // split always yields at least one element; a trailing newline adds a
        // phantom empty line that editors do not show.
        if lines.len() > 1 && lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }
        Self::from_lines(lines)
    }

    /// Create a buffer from pre-split lines.
    pub fn from_lines(lines: Vec<String>) -> Self {
        let lines = if lines.is_empty() {
            vec![String::new()]
        } else {
            lines
        };
        Self {
            id: BufferId::next(),
            lines,
            cursor: (1, 0),
            read_only: false,
            valid: true,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            group_depth: 0,
            group_snapshot: None,
            group_dirty: false,
        }
    }

    /// Load a buffer from a file on disk.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_text(&text))
    }

    /// Write the buffer to a file, with a trailing newline.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        let mut out = self.lines.join("\n");
        out.push('\n');
        std::fs::write(path, out)
    }

    /// The whole buffer joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Mark the buffer read-only (or writable again).
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Model the host closing the buffer: all later operations fail.
    pub fn close(&mut self) {
        self.valid = false;
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            lines: self.lines.clone(),
            cursor: self.cursor,
        }
    }

    fn restore(&mut self, snap: Snapshot) {
        self.lines = snap.lines;
        self.cursor = snap.cursor;
    }

    /// Record the pre-mutation state. Inside a group the snapshot was taken
    /// at `begin_undo_group`; outside, every mutation is its own unit.
    fn record_undo(&mut self) {
        if self.group_depth > 0 {
            self.group_dirty = true;
        } else {
            let snap = self.snapshot();
            self.undo_stack.push(snap);
        }
        self.redo_stack.clear();
    }
}

impl TextBuffer for MemoryBuffer {
    fn id(&self) -> BufferId {
        self.id
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn is_editable(&self) -> bool {
        self.valid && !self.read_only
    }

    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line(&self, lnum: usize) -> Option<&str> {
        if lnum == 0 {
            return None;
        }
        self.lines.get(lnum - 1).map(String::as_str)
    }

    fn lines(&self, start: usize, end: usize) -> Vec<String> {
        if start == 0 || end < start {
            return Vec::new();
        }
        let lo = start - 1;
        let hi = end.min(self.lines.len());
        if lo >= hi {
            return Vec::new();
        }
        self.lines[lo..hi].to_vec()
    }

    fn splice_lines(
        &mut self,
        start: usize,
        end: usize,
        replacement: Vec<String>,
    ) -> Result<(), BufferError> {
        if !self.valid {
            return Err(BufferError::Invalid);
        }
        if self.read_only {
            return Err(BufferError::ReadOnly);
        }
        if start == 0 || end < start || end > self.lines.len() {
            return Err(BufferError::RangeOutOfBounds {
                start,
                end,
                line_count: self.lines.len(),
            });
        }

        self.record_undo();
        self.lines.splice(start - 1..end, replacement);
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        // Keep the cursor on an existing line.
        let (line, col) = self.cursor;
        self.cursor = (line.min(self.lines.len()), col);
        Ok(())
    }

    fn begin_undo_group(&mut self) {
        if self.group_depth == 0 {
            self.group_snapshot = Some(self.snapshot());
            self.group_dirty = false;
        }
        self.group_depth += 1;
    }

    fn end_undo_group(&mut self) {
        if self.group_depth == 0 {
            return;
        }
        self.group_depth -= 1;
        if self.group_depth == 0 {
            if let Some(snap) = self.group_snapshot.take() {
                if self.group_dirty {
                    self.undo_stack.push(snap);
                }
            }
            self.group_dirty = false;
        }
    }

    fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(snap) => {
                self.redo_stack.push(self.snapshot());
                self.restore(snap);
                true
            }
            None => false,
        }
    }

    fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(snap) => {
                self.undo_stack.push(self.snapshot());
                self.restore(snap);
                true
            }
            None => false,
        }
    }

    fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    fn set_cursor(&mut self, line: usize, col: usize) {
        let line = line.clamp(1, self.lines.len());
        let max_col = crate::text_utils::char_len(&self.lines[line - 1]);
        self.cursor = (line, col.min(max_col));
    }
}
