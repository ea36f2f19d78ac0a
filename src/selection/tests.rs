//! Unit tests for selection capture.

use crate::buffer::MemoryBuffer;

use super::{CaptureError, Mark, VisualMode, capture};

fn buf(text: &str) -> MemoryBuffer {
    MemoryBuffer::from_text(text)
}

// ---------------------------------------------------------------------------
// Char mode
// ---------------------------------------------------------------------------

#[test]
fn char_single_line_inclusive_slice() {
    let b = buf("hello world");
    let sel = capture(&b, Mark::new(1, 6), Mark::new(1, 10), VisualMode::Char).unwrap();
    assert_eq!(sel.text, "world");
    assert_eq!(sel.start_line, 1);
    assert_eq!(sel.end_line, 1);
}

#[test]
fn char_single_codepoint() {
    let b = buf("abc");
    let sel = capture(&b, Mark::new(1, 1), Mark::new(1, 1), VisualMode::Char).unwrap();
    assert_eq!(sel.text, "b");
}

#[test]
fn char_multiline_takes_tail_interior_head() {
    let b = buf("first line\nmiddle\nlast line");
    let sel = capture(&b, Mark::new(1, 6), Mark::new(3, 3), VisualMode::Char).unwrap();
    assert_eq!(sel.text, "line\nmiddle\nlast");
}

#[test]
fn char_two_lines_no_interior() {
    let b = buf("abcd\nefgh");
    let sel = capture(&b, Mark::new(1, 2), Mark::new(2, 1), VisualMode::Char).unwrap();
    assert_eq!(sel.text, "cd\nef");
}

#[test]
fn char_columns_are_codepoints_not_bytes() {
    let b = buf("héllo wörld");
    let sel = capture(&b, Mark::new(1, 1), Mark::new(1, 4), VisualMode::Char).unwrap();
    assert_eq!(sel.text, "éllo");
}

#[test]
fn char_reversed_marks_are_normalized() {
    let b = buf("abcd\nefgh");
    let sel = capture(&b, Mark::new(2, 1), Mark::new(1, 2), VisualMode::Char).unwrap();
    assert_eq!(sel.text, "cd\nef");
    assert_eq!(sel.start_line, 1);
    assert_eq!(sel.end_line, 2);
}

// ---------------------------------------------------------------------------
// Line mode
// ---------------------------------------------------------------------------

#[test]
fn line_mode_ignores_columns() {
    let b = buf("one\ntwo\nthree");
    let sel = capture(&b, Mark::new(1, 2), Mark::new(2, 1), VisualMode::Line).unwrap();
    assert_eq!(sel.text, "one\ntwo");
    assert_eq!(sel.start_col, 0);
    assert_eq!(sel.end_col, 3); // codepoint length of "two"
}

#[test]
fn line_mode_single_line() {
    let b = buf("alpha\nbeta");
    let sel = capture(&b, Mark::new(2, 4), Mark::new(2, 0), VisualMode::Line).unwrap();
    assert_eq!(sel.text, "beta");
    assert_eq!(sel.end_col, 4);
}

// ---------------------------------------------------------------------------
// Block mode
// ---------------------------------------------------------------------------

#[test]
fn block_captures_rectangle() {
    let b = buf("abcdef\nghijkl");
    let sel = capture(&b, Mark::new(1, 1), Mark::new(2, 3), VisualMode::Block).unwrap();
    assert_eq!(sel.text, "bcd\nhij");
}

#[test]
fn block_swaps_reversed_columns() {
    let b = buf("abcdef\nghijkl");
    let sel = capture(&b, Mark::new(1, 3), Mark::new(2, 1), VisualMode::Block).unwrap();
    assert_eq!(sel.text, "bcd\nhij");
    assert_eq!(sel.start_col, 1);
    assert_eq!(sel.end_col, 3);
}

#[test]
fn block_short_line_yields_empty_slice() {
    let b = buf("abcdef\nx\nghijkl");
    let sel = capture(&b, Mark::new(1, 2), Mark::new(3, 4), VisualMode::Block).unwrap();
    assert_eq!(sel.text, "cde\n\nijk");
}

#[test]
fn block_partially_covered_line() {
    let b = buf("abcdef\nghi");
    let sel = capture(&b, Mark::new(1, 2), Mark::new(2, 4), VisualMode::Block).unwrap();
    assert_eq!(sel.text, "cde\ni");
}

// ---------------------------------------------------------------------------
// Indentation detection
// ---------------------------------------------------------------------------

#[test]
fn indent_is_first_captured_lines_whitespace() {
    let b = buf("    indented\n        more");
    let sel = capture(&b, Mark::new(1, 0), Mark::new(2, 3), VisualMode::Line).unwrap();
    assert_eq!(sel.indent, "    ");
}

#[test]
fn indent_empty_when_capture_starts_mid_line() {
    let b = buf("    indented");
    let sel = capture(&b, Mark::new(1, 4), Mark::new(1, 11), VisualMode::Char).unwrap();
    assert_eq!(sel.indent, "");
    assert_eq!(sel.text, "indented");
}

#[test]
fn indent_tabs_preserved() {
    let b = buf("\t\tcode here");
    let sel = capture(&b, Mark::new(1, 0), Mark::new(1, 5), VisualMode::Line).unwrap();
    assert_eq!(sel.indent, "\t\t");
}

// ---------------------------------------------------------------------------
// Failure cases
// ---------------------------------------------------------------------------

#[test]
fn out_of_range_line_fails() {
    let b = buf("only line");
    let err = capture(&b, Mark::new(1, 0), Mark::new(5, 0), VisualMode::Line).unwrap_err();
    assert!(matches!(
        err,
        CaptureError::LineOutOfRange { line: 5, line_count: 1 }
    ));
}

#[test]
fn line_zero_fails() {
    let b = buf("a");
    assert!(capture(&b, Mark::new(0, 0), Mark::new(1, 0), VisualMode::Line).is_err());
}

#[test]
fn closed_buffer_fails() {
    let mut b = buf("a");
    b.close();
    let err = capture(&b, Mark::new(1, 0), Mark::new(1, 0), VisualMode::Char).unwrap_err();
    assert!(matches!(err, CaptureError::BufferInvalid));
}

// ---------------------------------------------------------------------------
// Snapshot consistency
// ---------------------------------------------------------------------------

#[test]
fn selection_height_and_lines() {
    let b = buf("a\nb\nc");
    let sel = capture(&b, Mark::new(1, 0), Mark::new(3, 0), VisualMode::Line).unwrap();
    assert_eq!(sel.height(), 3);
    assert_eq!(sel.lines(), vec!["a", "b", "c"]);
}

#[test]
fn capture_does_not_mutate_buffer() {
    let b = buf("a\nb\nc");
    let before = b.text();
    let _ = capture(&b, Mark::new(1, 0), Mark::new(2, 0), VisualMode::Char).unwrap();
    assert_eq!(b.text(), before);
}
