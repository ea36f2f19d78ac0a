//! Mode-specific selection extraction.

use crate::buffer::TextBuffer;
use crate::text_utils::{char_len, char_slice, char_suffix, leading_whitespace};

use super::types::{CaptureError, Mark, Selection, VisualMode};

/// Capture the region between two marks as an immutable [`Selection`].
///
/// Marks may arrive in either order; they are normalized so the start
/// precedes the end. For [`VisualMode::Block`] the columns are additionally
/// swapped when `start.col > end.col` — a block selection dragged leftwards
/// covers the same rectangle as one dragged rightwards.
///
/// Fails without touching any state when a mark lies outside the buffer.
pub fn capture<B: TextBuffer + ?Sized>(
    buf: &B,
    start: Mark,
    end: Mark,
    mode: VisualMode,
) -> Result<Selection, CaptureError> {
    if !buf.is_valid() {
        return Err(CaptureError::BufferInvalid);
    }

    let (start, end) = if (end.line, end.col) < (start.line, start.col) {
        (end, start)
    } else {
        (start, end)
    };

    let line_count = buf.line_count();
    for mark in [start, end] {
        if mark.line == 0 || mark.line > line_count {
            log::warn!(
                "capture failed: line {} outside buffer of {} lines",
                mark.line,
                line_count
            );
            return Err(CaptureError::LineOutOfRange {
                line: mark.line,
                line_count,
            });
        }
    }

    let (start_col, end_col, lines) = match mode {
        VisualMode::Char => {
            let captured = capture_char(buf, start, end);
            (start.col, end.col, captured)
        }
        VisualMode::Line => {
            let captured = buf.lines(start.line, end.line);
            let last_len = captured.last().map_or(0, |l| char_len(l));
            (0, last_len, captured)
        }
        VisualMode::Block => {
            let (lo, hi) = if start.col <= end.col {
                (start.col, end.col)
            } else {
                (end.col, start.col)
            };
            let captured = buf
                .lines(start.line, end.line)
                .iter()
                .map(|l| char_slice(l, lo, hi))
                .collect();
            (lo, hi, captured)
        }
    };

    let text = lines.join("\n");
    let indent = lines
        .first()
        .map(|l| leading_whitespace(l).to_string())
        .unwrap_or_default();

    log::debug!(
        "captured {:?} selection {}:{}..{}:{} ({} lines)",
        mode,
        start.line,
        start_col,
        end.line,
        end_col,
        lines.len()
    );

    Ok(Selection {
        buffer: buf.id(),
        start_line: start.line,
        end_line: end.line,
        start_col,
        end_col,
        mode,
        text,
        indent,
    })
}

/// Character-wise extraction: inclusive column slice on one line, or
/// first-line-tail / interior / last-line-head across several.
fn capture_char<B: TextBuffer + ?Sized>(buf: &B, start: Mark, end: Mark) -> Vec<String> {
    if start.line == end.line {
        let line = buf.line(start.line).unwrap_or_default();
        return vec![char_slice(line, start.col, end.col)];
    }

    let mut out = Vec::with_capacity(end.line - start.line + 1);
    let first = buf.line(start.line).unwrap_or_default();
    out.push(char_suffix(first, start.col));
    if end.line - start.line > 1 {
        out.extend(buf.lines(start.line + 1, end.line - 1));
    }
    let last = buf.line(end.line).unwrap_or_default();
    out.push(char_slice(last, 0, end.col));
    out
}
