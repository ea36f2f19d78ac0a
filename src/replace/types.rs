//! Type definitions for the replacement engine.

use thiserror::Error;

use crate::buffer::BufferError;
use crate::selection::Selection;

/// The inputs to one write-back: the captured selection, the new text, and
/// whether to re-derive its indentation from the original.
#[derive(Debug, Clone)]
pub struct Replacement {
    /// The selection being replaced. Consumed by exactly one apply call.
    pub selection: Selection,
    /// Replacement text, lines joined by `\n`. May be longer or shorter
    /// than the captured text, and may span a different number of lines.
    pub text: String,
    /// Strip the replacement's own indentation and re-prefix it with the
    /// original selection's, line by line.
    pub reindent: bool,
}

/// What a successful apply wrote: the inclusive 1-based line range now
/// occupied by the replacement. Used for cursor placement and for the
/// post-edit formatter collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub first_line: usize,
    pub last_line: usize,
}

/// Why an apply refused to mutate the buffer. None of these leave a partial
/// edit behind, and none are retried.
#[derive(Debug, Error)]
pub enum ReplaceError {
    /// The target buffer no longer exists.
    #[error("target buffer no longer exists")]
    BufferGone,

    /// The target buffer is read-only or otherwise rejecting edits.
    #[error("target buffer is not editable")]
    NotEditable,

    /// The buffer handed to apply is not the one the selection was
    /// captured from.
    #[error("buffer does not match the captured selection")]
    BufferMismatch,

    /// The selection's line range no longer exists in the buffer (lines
    /// were removed after capture).
    #[error("selection range {start}..={end} no longer exists (buffer has {line_count} lines)")]
    RangeGone {
        start: usize,
        end: usize,
        line_count: usize,
    },

    /// The underlying buffer rejected the mutation.
    #[error(transparent)]
    Buffer(#[from] BufferError),
}
