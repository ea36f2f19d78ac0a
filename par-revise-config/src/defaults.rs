//! Default value functions for configuration.
//!
//! Free functions used as `#[serde(default = "crate::defaults::...")]`
//! attributes on `Config` fields, so a partially-written config file picks
//! up defaults for every missing key.

use crate::types::LogLevel;

// ── Transform command ──────────────────────────────────────────────────────

/// External transform command. `aichat` reads the prompt from its final
/// argument and the content from stdin, which matches the invocation
/// contract exactly.
pub fn command() -> String {
    "aichat".to_string()
}

/// Extra arguments placed before the instruction argument.
pub fn args() -> Vec<String> {
    Vec::new()
}

/// Deadline for the external command, in milliseconds.
pub fn timeout_ms() -> u64 {
    30_000
}

// ── Edit behaviour ─────────────────────────────────────────────────────────

/// Group each replacement into a single undo entry.
pub fn preserve_undo() -> bool {
    true
}

/// Re-derive replacement indentation from the original selection.
pub fn reindent() -> bool {
    true
}

/// Run the formatter collaborator over the replaced range after an edit.
pub fn format_after() -> bool {
    false
}

/// Persist the buffer after an edit.
pub fn save_after() -> bool {
    false
}

// ── Logging ────────────────────────────────────────────────────────────────

pub fn log_level() -> LogLevel {
    LogLevel::Warn
}
