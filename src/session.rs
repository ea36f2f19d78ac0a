//! The per-edit-cycle orchestrator.
//!
//! [`EditSession`] owns one capture → transform → apply cycle at a time.
//! It is an explicit object the host creates and holds — there is no
//! module-global state — so repeated invocations are testable in
//! isolation. The only shared mutable state is the "request outstanding"
//! flag, which is cleared unconditionally whichever of the three terminal
//! outcomes (completion, cancellation, timeout) ends the transform.
//!
//! Locking follows the crate convention: `parking_lot::Mutex` for
//! sync-only state, never held across an await.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use thiserror::Error;

use crate::buffer::TextBuffer;
use crate::replace::{Applied, ReplaceEngine, ReplaceError, Replacement};
use crate::selection::{CaptureError, Mark, VisualMode, capture};
use crate::transform::{
    CancelHandle, TransformClient, TransformError, TransformHints, TransformRequest,
};

/// Post-edit formatting collaborator: "format this line range".
///
/// Best-effort: failures are logged and never unwind the applied edit.
pub trait Formatter: Send {
    fn format_range(
        &mut self,
        buf: &mut dyn TextBuffer,
        first_line: usize,
        last_line: usize,
    ) -> anyhow::Result<()>;
}

/// Post-edit persistence collaborator: "persist this buffer".
///
/// Best-effort, same contract as [`Formatter`].
pub trait Persister: Send {
    fn persist(&mut self, buf: &mut dyn TextBuffer) -> anyhow::Result<()>;
}

/// Optional post-edit collaborators, dispatched in order: format, persist.
#[derive(Default)]
pub struct SessionHooks {
    pub formatter: Option<Box<dyn Formatter>>,
    pub persister: Option<Box<dyn Persister>>,
}

/// Behaviour switches for one session, usually taken from the config file.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Group the replacement into a single undo entry.
    pub preserve_undo: bool,
    /// Re-derive replacement indentation from the selection.
    pub reindent: bool,
    /// Invoke the formatter hook after a successful replacement.
    pub format_after: bool,
    /// Invoke the persister hook after a successful replacement.
    pub save_after: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            preserve_undo: true,
            reindent: true,
            format_after: false,
            save_after: false,
        }
    }
}

impl SessionOptions {
    /// Lift the relevant switches out of a loaded config.
    pub fn from_config(config: &par_revise_config::Config) -> Self {
        Self {
            preserve_undo: config.preserve_undo,
            reindent: config.reindent,
            format_after: config.format_after,
            save_after: config.save_after,
        }
    }
}

/// Why an edit cycle ended without applying a replacement.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A cycle is already in flight; the new trigger was rejected.
    #[error("an edit cycle is already in progress")]
    Busy,

    /// Selection capture failed; nothing was mutated.
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// The external transform failed, timed out, or was cancelled.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// The buffer rejected the write-back; nothing was mutated.
    #[error(transparent)]
    Replace(#[from] ReplaceError),
}

/// Clears the pending flag on every exit path, including early `?` returns.
struct PendingGuard(Arc<AtomicBool>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// One selection-rewrite cycle owner.
///
/// Methods take `&self`; a session can be shared (e.g. in an `Arc`) so a
/// UI thread can call [`cancel`](EditSession::cancel) while a rewrite is
/// awaiting the external command. A second rewrite started while one is in
/// flight is rejected with [`SessionError::Busy`].
pub struct EditSession {
    options: SessionOptions,
    client: TransformClient,
    hooks: Mutex<SessionHooks>,
    pending: Arc<AtomicBool>,
    cancel: Mutex<CancelHandle>,
}

impl EditSession {
    pub fn new(options: SessionOptions, client: TransformClient) -> Self {
        Self {
            options,
            client,
            hooks: Mutex::new(SessionHooks::default()),
            pending: Arc::new(AtomicBool::new(false)),
            cancel: Mutex::new(CancelHandle::new()),
        }
    }

    /// Attach post-edit collaborators.
    pub fn with_hooks(self, hooks: SessionHooks) -> Self {
        *self.hooks.lock() = hooks;
        self
    }

    /// Whether a transform request is currently outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    /// Cancel the in-flight transform, if any. Idempotent; cancelling an
    /// idle session is a no-op.
    pub fn cancel(&self) {
        self.cancel.lock().cancel();
    }

    /// Run one full edit cycle: capture the marked region, send it with the
    /// instruction to the external command, and splice the response back.
    ///
    /// Every failure is terminal for the cycle; the session returns to idle
    /// and nothing is retried. Post-edit hook failures are logged and do
    /// not undo the applied replacement.
    pub async fn rewrite<B: TextBuffer>(
        &self,
        buf: &mut B,
        start: Mark,
        end: Mark,
        mode: VisualMode,
        instruction: &str,
        hints: TransformHints,
    ) -> Result<Applied, SessionError> {
        if self.pending.swap(true, Ordering::SeqCst) {
            return Err(SessionError::Busy);
        }
        let _guard = PendingGuard(Arc::clone(&self.pending));

        // Each cycle gets a fresh cancellation scope; a cancel left over
        // from a previous cycle must not abort this one.
        let cancel = CancelHandle::new();
        *self.cancel.lock() = cancel.clone();

        let selection = capture(buf, start, end, mode)?;
        log::info!(
            "rewrite cycle: {:?} selection {}..{} ({} chars)",
            mode,
            selection.start_line,
            selection.end_line,
            selection.text.len()
        );

        let request = TransformRequest {
            text: selection.text.clone(),
            instruction: instruction.to_string(),
            hints,
        };
        let transformed = self.client.run(&request, &cancel).await?;

        let applied = ReplaceEngine::new(self.options.preserve_undo).apply(
            buf,
            &Replacement {
                selection,
                text: transformed,
                reindent: self.options.reindent,
            },
        )?;

        self.run_hooks(buf, applied);
        Ok(applied)
    }

    /// Fire-and-forget post-edit collaborators.
    fn run_hooks<B: TextBuffer>(&self, buf: &mut B, applied: Applied) {
        let mut hooks = self.hooks.lock();
        if self.options.format_after {
            if let Some(formatter) = hooks.formatter.as_mut() {
                if let Err(e) = formatter.format_range(buf, applied.first_line, applied.last_line)
                {
                    log::warn!("post-edit format failed (edit kept): {e:#}");
                }
            }
        }
        if self.options.save_after {
            if let Some(persister) = hooks.persister.as_mut() {
                if let Err(e) = persister.persist(buf) {
                    log::warn!("post-edit persist failed (edit kept): {e:#}");
                }
            }
        }
    }
}
