//! par-revise — AI-assisted selection rewriting engine.
//!
//! Captures a vi-style visual selection (character-wise, line-wise, or
//! block-wise) from a text buffer, sends it together with a
//! natural-language instruction to an external AI command, and splices the
//! returned text back over the selection as a single undo unit, optionally
//! re-indented to match the original.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  EditSession (one cycle, cancel, hooks)     │  ← Orchestration
//! ├──────────────────────┬──────────────────────┤
//! │  selection (capture) │  replace (write-back)│  ← Core range logic
//! ├──────────────────────┴──────────────────────┤
//! │  TextBuffer trait (host boundary)           │  ← 1-based lines,
//! ├─────────────────────────────────────────────┤     codepoint columns
//! │  transform (external AI command, timeout)   │  ← Subprocess glue
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The host owns the buffer and implements [`TextBuffer`] over it;
//! [`MemoryBuffer`] is the built-in implementation used by the bundled CLI
//! and by tests. The engine performs exactly one selection-replace-undo
//! cycle at a time; concurrent triggers are rejected by the session.
//!
//! # Mutex usage policy
//!
//! Sync-only state (post-edit hooks, the cancel handle slot) uses
//! `parking_lot::Mutex`, never held across an await. Cross-task signalling
//! uses atomics and `tokio::sync::Notify`.

/// Application version (root crate version, for use by embedding hosts).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod buffer;
pub mod cli;
pub mod debug;
pub mod diff;
pub mod replace;
pub mod selection;
pub mod session;
pub mod text_utils;
pub mod transform;

pub use buffer::{BufferError, BufferId, MemoryBuffer, TextBuffer};
pub use diff::{DiffLine, diff_lines};
pub use replace::{Applied, ReplaceEngine, ReplaceError, Replacement};
pub use selection::{CaptureError, Mark, Selection, VisualMode, capture, reindent};
pub use session::{
    EditSession, Formatter, Persister, SessionError, SessionHooks, SessionOptions,
};
pub use transform::{
    CancelHandle, TransformClient, TransformError, TransformHints, TransformRequest,
};
