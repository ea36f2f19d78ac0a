//! The replacement engine.

use crate::buffer::TextBuffer;
use crate::selection::{Selection, VisualMode, reindent};
use crate::text_utils::{char_prefix, char_suffix};

use super::types::{Applied, Replacement, ReplaceError};

/// Applies a [`Replacement`] to a buffer as a single undo unit.
///
/// The engine re-checks buffer validity, editability, identity, and that
/// the selection's line range still exists. It does NOT re-validate that
/// the buffer content is unchanged since capture: a host that edited the
/// buffer in between gets the splice at the captured coordinates, which may
/// no longer correspond to the originally selected text. The single-cycle
/// session model keeps that window small.
#[derive(Debug, Clone, Copy)]
pub struct ReplaceEngine {
    /// Bracket the mutation in an undo group so one undo restores the
    /// pre-edit text fully.
    pub preserve_undo: bool,
}

impl Default for ReplaceEngine {
    fn default() -> Self {
        Self { preserve_undo: true }
    }
}

impl ReplaceEngine {
    pub fn new(preserve_undo: bool) -> Self {
        Self { preserve_undo }
    }

    /// Splice the replacement into the buffer. On success, returns the line
    /// range now occupied by the new text.
    pub fn apply<B: TextBuffer + ?Sized>(
        &self,
        buf: &mut B,
        repl: &Replacement,
    ) -> Result<Applied, ReplaceError> {
        let sel = &repl.selection;

        if !buf.is_valid() {
            return Err(ReplaceError::BufferGone);
        }
        if !buf.is_editable() {
            return Err(ReplaceError::NotEditable);
        }
        if buf.id() != sel.buffer {
            return Err(ReplaceError::BufferMismatch);
        }
        let line_count = buf.line_count();
        if sel.end_line > line_count {
            return Err(ReplaceError::RangeGone {
                start: sel.start_line,
                end: sel.end_line,
                line_count,
            });
        }
        let new_text = if repl.reindent {
            reindent(&sel.text, &repl.text)
        } else {
            repl.text.clone()
        };
        let new_lines: Vec<String> = new_text.split('\n').map(str::to_string).collect();

        let spliced = match sel.mode {
            VisualMode::Line => new_lines,
            VisualMode::Char => splice_char(buf, sel, new_lines),
            VisualMode::Block => splice_block(buf, sel, &new_lines),
        };

        let first_line = sel.start_line;
        let last_line = first_line + spliced.len().saturating_sub(1);

        log::debug!(
            "applying {:?} replacement over {}..={} ({} -> {} lines)",
            sel.mode,
            sel.start_line,
            sel.end_line,
            sel.height(),
            spliced.len()
        );

        if self.preserve_undo {
            buf.begin_undo_group();
        }
        let result = buf.splice_lines(sel.start_line, sel.end_line, spliced);
        if self.preserve_undo {
            buf.end_undo_group();
        }
        result?;

        buf.set_cursor(first_line, sel.start_col);
        Ok(Applied {
            first_line,
            last_line,
        })
    }
}

/// Character-wise splice: retain the text before the selection on its first
/// line and after it on its last line; the interior of a multi-line
/// selection is discarded wholesale.
fn splice_char<B: TextBuffer + ?Sized>(
    buf: &B,
    sel: &Selection,
    new_lines: Vec<String>,
) -> Vec<String> {
    let first = buf.line(sel.start_line).unwrap_or_default();
    let last = buf.line(sel.end_line).unwrap_or_default();
    let before = char_prefix(first, sel.start_col);
    let after = char_suffix(last, sel.end_col + 1);

    let mut out = Vec::with_capacity(new_lines.len());
    match new_lines.len() {
        0 => out.push(format!("{before}{after}")),
        1 => out.push(format!("{before}{}{after}", new_lines[0])),
        n => {
            out.push(format!("{before}{}", new_lines[0]));
            out.extend(new_lines[1..n - 1].iter().cloned());
            out.push(format!("{}{after}", new_lines[n - 1]));
        }
    }
    out
}

/// Block splice: rectangular replace-in-place, one replacement line per
/// original line; missing replacement lines are treated as empty.
fn splice_block<B: TextBuffer + ?Sized>(
    buf: &B,
    sel: &Selection,
    new_lines: &[String],
) -> Vec<String> {
    let mut out = Vec::with_capacity(sel.height());
    for (i, lnum) in (sel.start_line..=sel.end_line).enumerate() {
        let line = buf.line(lnum).unwrap_or_default();
        let prefix = char_prefix(line, sel.start_col);
        let suffix = char_suffix(line, sel.end_col + 1);
        let insert = new_lines.get(i).map(String::as_str).unwrap_or("");
        out.push(format!("{prefix}{insert}{suffix}"));
    }
    out
}
