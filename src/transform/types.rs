//! Type definitions for the transform client.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio::sync::Notify;

/// Optional context forwarded to the external command as environment
/// variables, so prompts can mention the language or file being edited.
#[derive(Debug, Clone, Default)]
pub struct TransformHints {
    /// Language / filetype of the source buffer (e.g. `rust`, `python`).
    pub filetype: Option<String>,
    /// Path of the file backing the buffer, if any.
    pub path: Option<String>,
}

/// One request to the external transform command.
#[derive(Debug, Clone)]
pub struct TransformRequest {
    /// The captured selection text, written to the command's stdin.
    pub text: String,
    /// The natural-language instruction, appended as the final argument.
    pub instruction: String,
    /// Language and path context.
    pub hints: TransformHints,
}

/// Cancellation signal for an in-flight transform.
///
/// Clone it freely and call [`cancel`](CancelHandle::cancel) from anywhere.
/// Cancelling twice, or cancelling when no request is outstanding, is a
/// no-op; the external process (if any) is killed exactly once.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    inner: Arc<CancelInner>,
}

#[derive(Debug, Default)]
struct CancelInner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve once cancellation is requested. Registering the waiter
    /// before re-checking the flag closes the notify race.
    pub async fn cancelled(&self) {
        let notified = self.inner.notify.notified();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

/// Terminal outcomes of a transform request that are not a result.
///
/// Success, failure, timeout, and cancellation are mutually exclusive; the
/// caller observes exactly one of them per request.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The configured command could not be spawned.
    #[error("transform command not found: {0}")]
    CommandNotFound(String),

    /// The command exited with a non-zero status. `stderr` carries the
    /// process's diagnostic text, or a generic message when it wrote none.
    #[error("transform command exited with {code:?}: {stderr}")]
    Failed {
        code: Option<i32>,
        stderr: String,
    },

    /// The request exceeded its deadline and the process was killed.
    #[error("transform timed out after {0}ms")]
    Timeout(u64),

    /// The request was cancelled and the process was killed.
    #[error("transform cancelled")]
    Cancelled,

    /// Pipe plumbing to the child failed.
    #[error("i/o error talking to transform process: {0}")]
    Io(#[from] std::io::Error),
}
