//! Positional reindentation of replacement text.

use crate::text_utils::leading_whitespace;

/// Re-derive the indentation of `replacement` from `original`, line by line.
///
/// Line *i* of the output takes the leading whitespace of line *i* of
/// `original`; when the replacement is longer than the original, extra
/// lines keep the last original line's indentation. Each replacement line
/// is stripped of its own leading whitespace first, so the result is
/// indentation-normalized even when the transform returned flush-left text
/// or a different indent scheme. Blank replacement lines stay blank.
pub fn reindent(original: &str, replacement: &str) -> String {
    let indents: Vec<&str> = original.lines().map(leading_whitespace).collect();
    let last_indent = indents.last().copied().unwrap_or("");

    replacement
        .split('\n')
        .enumerate()
        .map(|(i, line)| {
            let body = line.trim_start_matches([' ', '\t']);
            if body.is_empty() {
                return String::new();
            }
            let indent = indents.get(i).copied().unwrap_or(last_indent);
            format!("{indent}{body}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
