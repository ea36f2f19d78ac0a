//! Naive line-by-line diff for previewing a replacement.
//!
//! This is deliberately a positional placeholder, not a real diff
//! algorithm: line *i* of the old text is compared with line *i* of the
//! new, and surplus lines on either side show up as pure removals or
//! additions. It exists so a host can show "what is about to change"
//! before committing a replacement.

/// One rendered line of the preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    /// Line present and identical in both versions.
    Context(String),
    /// Line as it was in the old text.
    Removed(String),
    /// Line as it will be in the new text.
    Added(String),
}

/// Compare old and new text positionally.
pub fn diff_lines(old: &str, new: &str) -> Vec<DiffLine> {
    let old_lines: Vec<&str> = old.split('\n').collect();
    let new_lines: Vec<&str> = new.split('\n').collect();
    let mut out = Vec::with_capacity(old_lines.len().max(new_lines.len()));

    for i in 0..old_lines.len().max(new_lines.len()) {
        match (old_lines.get(i), new_lines.get(i)) {
            (Some(o), Some(n)) if o == n => out.push(DiffLine::Context((*o).to_string())),
            (Some(o), Some(n)) => {
                out.push(DiffLine::Removed((*o).to_string()));
                out.push(DiffLine::Added((*n).to_string()));
            }
            (Some(o), None) => out.push(DiffLine::Removed((*o).to_string())),
            (None, Some(n)) => out.push(DiffLine::Added((*n).to_string())),
            (None, None) => unreachable!(),
        }
    }
    out
}

/// Render a diff with conventional ` `/`-`/`+` gutters.
pub fn render(diff: &[DiffLine]) -> String {
    diff.iter()
        .map(|line| match line {
            DiffLine::Context(l) => format!("  {l}"),
            DiffLine::Removed(l) => format!("- {l}"),
            DiffLine::Added(l) => format!("+ {l}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
