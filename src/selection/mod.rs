//! Vi-style selection capture.
//!
//! Turns a pair of raw marks plus a visual mode into an immutable
//! [`Selection`] snapshot: the exact captured text, its line/column extent
//! in codepoint coordinates, and the indentation of its first line.
//!
//! ## Module layout
//!
//! - [`types`]: type definitions (`Selection`, `VisualMode`, `Mark`,
//!   `CaptureError`)
//! - [`capture`]: mode-specific extraction from a [`TextBuffer`]
//! - [`indent`]: indentation detection and the positional reindent transform
//!
//! [`TextBuffer`]: crate::buffer::TextBuffer

mod capture;
mod indent;
mod types;

pub use capture::capture;
pub use indent::reindent;
pub use types::{CaptureError, Mark, Selection, VisualMode};

#[cfg(test)]
mod tests;
