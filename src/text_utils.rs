//! Text helpers shared by capture and replacement: codepoint-indexed
//! slicing, leading-whitespace detection, and fenced-code-block stripping.
//!
//! All column arithmetic in this crate is in Unicode scalar values
//! (codepoints), never bytes. These helpers are the only place that walks
//! `char` boundaries, so the capture and splice code above them can treat a
//! column as a plain index.

/// Inclusive codepoint slice `[start, end]` of a line.
///
/// Out-of-range starts yield an empty string; `end` past the line end is
/// clamped. `end < start` yields an empty string.
pub fn char_slice(line: &str, start: usize, end: usize) -> String {
    if end < start {
        return String::new();
    }
    line.chars().skip(start).take(end - start + 1).collect()
}

/// The first `count` codepoints of a line.
pub fn char_prefix(line: &str, count: usize) -> String {
    line.chars().take(count).collect()
}

/// Everything from codepoint `from` to the end of the line.
pub fn char_suffix(line: &str, from: usize) -> String {
    line.chars().skip(from).collect()
}

/// Number of codepoints in a line.
pub fn char_len(line: &str) -> usize {
    line.chars().count()
}

/// The leading run of spaces and tabs on a line.
pub fn leading_whitespace(line: &str) -> &str {
    let end = line
        .char_indices()
        .find(|(_, c)| *c != ' ' && *c != '\t')
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    &line[..end]
}

/// Strip one outer fenced code block from a transform response.
///
/// Recognises a response whose first non-blank line opens a fence
/// (```` ``` ```` with an optional language tag) and whose last non-blank
/// line closes it; the interior is returned verbatim. Anything else passes
/// through unchanged, including responses that merely contain fences.
pub fn strip_code_fence(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();

    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());
    let (Some(first), Some(last)) = (first, last) else {
        return text.to_string();
    };

    let opens = lines[first].trim().starts_with("```");
    // The closing fence is bare backticks; a language tag only appears on the
    // opening fence.
    let closes = first < last && lines[last].trim().trim_start_matches('`').is_empty()
        && lines[last].trim().starts_with("```");
    if !opens || !closes {
        return text.to_string();
    }

    lines[first + 1..last].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_slice_inclusive() {
        assert_eq!(char_slice("abcdef", 1, 3), "bcd");
        assert_eq!(char_slice("abcdef", 0, 0), "a");
    }

    #[test]
    fn char_slice_clamps_end() {
        assert_eq!(char_slice("abc", 1, 99), "bc");
    }

    #[test]
    fn char_slice_out_of_range_start_is_empty() {
        assert_eq!(char_slice("abc", 5, 9), "");
        assert_eq!(char_slice("", 0, 3), "");
    }

    #[test]
    fn char_slice_multibyte() {
        // é and 漢 are single codepoints but multiple bytes.
        assert_eq!(char_slice("aé漢b", 1, 2), "é漢");
        assert_eq!(char_prefix("aé漢b", 2), "aé");
        assert_eq!(char_suffix("aé漢b", 2), "漢b");
    }

    #[test]
    fn leading_whitespace_spaces_and_tabs() {
        assert_eq!(leading_whitespace("    x"), "    ");
        assert_eq!(leading_whitespace("\t\t x"), "\t\t ");
        assert_eq!(leading_whitespace("x"), "");
        assert_eq!(leading_whitespace("   "), "   ");
    }

    #[test]
    fn strip_fence_with_language_tag() {
        let input = "```python\ndef f():\n    pass\n```";
        assert_eq!(strip_code_fence(input), "def f():\n    pass");
    }

    #[test]
    fn strip_fence_without_language_tag() {
        assert_eq!(strip_code_fence("```\nhello\n```"), "hello");
    }

    #[test]
    fn no_fence_passes_through() {
        assert_eq!(strip_code_fence("plain text\nno fences"), "plain text\nno fences");
    }

    #[test]
    fn interior_fences_are_not_stripped() {
        let input = "see this:\n```\ncode\n```";
        assert_eq!(strip_code_fence(input), input);
    }

    #[test]
    fn unterminated_fence_passes_through() {
        let input = "```python\ndef f():";
        assert_eq!(strip_code_fence(input), input);
    }

    #[test]
    fn surrounding_blank_lines_tolerated() {
        let input = "\n```rust\nfn main() {}\n```\n";
        assert_eq!(strip_code_fence(input), "fn main() {}");
    }
}
