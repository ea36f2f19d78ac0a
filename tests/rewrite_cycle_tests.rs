//! Integration tests for the full rewrite cycle.
//!
//! These exercise `EditSession` end to end through the `par_revise` crate:
//! capture → external transform (a real `sh` subprocess) → write-back.
//! No editor host is required — all buffer state goes through
//! `MemoryBuffer`.
//!
//! Coverage targets:
//! - Successful cycles in all three visual modes
//! - Reindent behaviour through the session
//! - Single-undo restoration after a session rewrite
//! - Transform failure / timeout / cancellation leave the buffer untouched
//! - Pending flag lifecycle and rejection of concurrent cycles
//! - Cancel idempotence, including cancel-before-cycle
//! - Post-edit persister and formatter hooks, including hook failure

use std::sync::Arc;
use std::time::Duration;

use par_revise::buffer::{MemoryBuffer, TextBuffer};
use par_revise::selection::{Mark, VisualMode};
use par_revise::session::{
    EditSession, Formatter, Persister, SessionError, SessionHooks, SessionOptions,
};
use par_revise::transform::{TransformClient, TransformError, TransformHints};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A transform client that runs a shell snippet.
fn sh(script: &str, timeout_ms: u64) -> TransformClient {
    TransformClient::new("sh", vec!["-c".to_string(), script.to_string()], timeout_ms)
}

/// Uppercases whatever the selection contains.
fn upcase_client() -> TransformClient {
    sh("tr 'a-z' 'A-Z'", 10_000)
}

fn options_no_reindent() -> SessionOptions {
    SessionOptions {
        reindent: false,
        ..SessionOptions::default()
    }
}

async fn rewrite(
    session: &EditSession,
    buf: &mut MemoryBuffer,
    start: Mark,
    end: Mark,
    mode: VisualMode,
) -> Result<par_revise::Applied, SessionError> {
    session
        .rewrite(buf, start, end, mode, "uppercase this", TransformHints::default())
        .await
}

// ---------------------------------------------------------------------------
// Successful cycles
// ---------------------------------------------------------------------------

#[tokio::test]
async fn line_mode_cycle() {
    let session = EditSession::new(options_no_reindent(), upcase_client());
    let mut buf = MemoryBuffer::from_text("one\ntwo\nthree");
    let applied = rewrite(&session, &mut buf, Mark::new(2, 0), Mark::new(2, 0), VisualMode::Line)
        .await
        .unwrap();
    assert_eq!(buf.text(), "one\nTWO\nthree");
    assert_eq!((applied.first_line, applied.last_line), (2, 2));
    assert!(!session.is_pending());
}

#[tokio::test]
async fn char_mode_cycle() {
    let session = EditSession::new(options_no_reindent(), upcase_client());
    let mut buf = MemoryBuffer::from_text("say hello world");
    rewrite(&session, &mut buf, Mark::new(1, 4), Mark::new(1, 8), VisualMode::Char)
        .await
        .unwrap();
    assert_eq!(buf.text(), "say HELLO world");
}

#[tokio::test]
async fn block_mode_cycle() {
    let session = EditSession::new(options_no_reindent(), upcase_client());
    let mut buf = MemoryBuffer::from_text("abcdef\nghijkl");
    rewrite(&session, &mut buf, Mark::new(1, 1), Mark::new(2, 3), VisualMode::Block)
        .await
        .unwrap();
    assert_eq!(buf.text(), "aBCDef\ngHIJkl");
}

#[tokio::test]
async fn reindent_through_session() {
    // The transform returns flush-left text; the session re-indents it to
    // match the captured lines.
    let session = EditSession::new(SessionOptions::default(), sh("tr 'a-z' 'A-Z'", 10_000));
    let mut buf = MemoryBuffer::from_text("    alpha\n    beta");
    rewrite(&session, &mut buf, Mark::new(1, 0), Mark::new(2, 0), VisualMode::Line)
        .await
        .unwrap();
    assert_eq!(buf.text(), "    ALPHA\n    BETA");
}

#[tokio::test]
async fn single_undo_restores_cycle() {
    let source = "uno\ndos\ntres";
    let session = EditSession::new(options_no_reindent(), upcase_client());
    let mut buf = MemoryBuffer::from_text(source);
    rewrite(&session, &mut buf, Mark::new(1, 0), Mark::new(3, 0), VisualMode::Line)
        .await
        .unwrap();
    assert_eq!(buf.text(), "UNO\nDOS\nTRES");

    assert!(buf.undo());
    assert_eq!(buf.text(), source);
    assert!(!buf.undo());
}

// ---------------------------------------------------------------------------
// Failure outcomes leave the buffer untouched
// ---------------------------------------------------------------------------

#[tokio::test]
async fn transform_failure_aborts_cycle() {
    let session = EditSession::new(options_no_reindent(), sh("echo nope >&2; exit 7", 10_000));
    let mut buf = MemoryBuffer::from_text("a\nb");
    let err = rewrite(&session, &mut buf, Mark::new(1, 0), Mark::new(2, 0), VisualMode::Line)
        .await
        .unwrap_err();
    match err {
        SessionError::Transform(TransformError::Failed { stderr, .. }) => {
            assert_eq!(stderr, "nope");
        }
        other => panic!("expected transform failure, got {other:?}"),
    }
    assert_eq!(buf.text(), "a\nb");
    assert!(!session.is_pending());
}

#[tokio::test]
async fn transform_timeout_aborts_cycle() {
    let session = EditSession::new(options_no_reindent(), sh("sleep 30", 100));
    let mut buf = MemoryBuffer::from_text("a\nb");
    let err = rewrite(&session, &mut buf, Mark::new(1, 0), Mark::new(1, 0), VisualMode::Line)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Transform(TransformError::Timeout(100))
    ));
    assert_eq!(buf.text(), "a\nb");
    assert!(!session.is_pending());
}

#[tokio::test]
async fn capture_failure_aborts_before_transform() {
    // The transform command would fail loudly; it must never be spawned.
    let session = EditSession::new(options_no_reindent(), sh("exit 1", 10_000));
    let mut buf = MemoryBuffer::from_text("only");
    let err = rewrite(&session, &mut buf, Mark::new(1, 0), Mark::new(9, 0), VisualMode::Line)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Capture(_)));
    assert_eq!(buf.text(), "only");
}

// ---------------------------------------------------------------------------
// Cancellation and the pending flag
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancel_aborts_inflight_cycle() {
    let session = Arc::new(EditSession::new(options_no_reindent(), sh("sleep 30", 60_000)));
    let worker = Arc::clone(&session);
    let task = tokio::spawn(async move {
        let mut buf = MemoryBuffer::from_text("a\nb");
        let result =
            rewrite(&worker, &mut buf, Mark::new(1, 0), Mark::new(1, 0), VisualMode::Line).await;
        (result, buf.text())
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(session.is_pending());
    session.cancel();
    // A second cancel is a no-op.
    session.cancel();

    let (result, text) = task.await.unwrap();
    assert!(matches!(
        result,
        Err(SessionError::Transform(TransformError::Cancelled))
    ));
    assert_eq!(text, "a\nb");
    assert!(!session.is_pending());
}

#[tokio::test]
async fn concurrent_cycle_is_rejected() {
    let session = Arc::new(EditSession::new(options_no_reindent(), sh("sleep 30", 60_000)));
    let worker = Arc::clone(&session);
    let task = tokio::spawn(async move {
        let mut buf = MemoryBuffer::from_text("a\nb");
        rewrite(&worker, &mut buf, Mark::new(1, 0), Mark::new(1, 0), VisualMode::Line).await
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    let mut other = MemoryBuffer::from_text("x");
    let err = rewrite(&session, &mut other, Mark::new(1, 0), Mark::new(1, 0), VisualMode::Line)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::Busy));
    assert_eq!(other.text(), "x");

    session.cancel();
    let _ = task.await.unwrap();
}

#[tokio::test]
async fn cancel_on_idle_session_does_not_poison_next_cycle() {
    let session = EditSession::new(options_no_reindent(), upcase_client());
    // Nothing outstanding: both calls are no-ops.
    session.cancel();
    session.cancel();
    assert!(!session.is_pending());

    let mut buf = MemoryBuffer::from_text("fine");
    rewrite(&session, &mut buf, Mark::new(1, 0), Mark::new(1, 0), VisualMode::Line)
        .await
        .unwrap();
    assert_eq!(buf.text(), "FINE");
}

// ---------------------------------------------------------------------------
// Post-edit hooks
// ---------------------------------------------------------------------------

struct RecordingPersister {
    saved: Arc<parking_lot::Mutex<Option<String>>>,
}

impl Persister for RecordingPersister {
    fn persist(&mut self, buf: &mut dyn TextBuffer) -> anyhow::Result<()> {
        let count = buf.line_count();
        *self.saved.lock() = Some(buf.lines(1, count).join("\n"));
        Ok(())
    }
}

struct FailingPersister;

impl Persister for FailingPersister {
    fn persist(&mut self, _buf: &mut dyn TextBuffer) -> anyhow::Result<()> {
        anyhow::bail!("disk full")
    }
}

/// Rewrites the replaced range to a marker, proving it got the right span.
struct MarkerFormatter;

impl Formatter for MarkerFormatter {
    fn format_range(
        &mut self,
        buf: &mut dyn TextBuffer,
        first_line: usize,
        last_line: usize,
    ) -> anyhow::Result<()> {
        let formatted: Vec<String> = buf
            .lines(first_line, last_line)
            .into_iter()
            .map(|l| format!(">{l}"))
            .collect();
        buf.splice_lines(first_line, last_line, formatted)?;
        Ok(())
    }
}

#[tokio::test]
async fn persister_hook_sees_applied_text() {
    let saved = Arc::new(parking_lot::Mutex::new(None));
    let options = SessionOptions {
        save_after: true,
        ..options_no_reindent()
    };
    let session = EditSession::new(options, upcase_client()).with_hooks(SessionHooks {
        formatter: None,
        persister: Some(Box::new(RecordingPersister {
            saved: Arc::clone(&saved),
        })),
    });

    let mut buf = MemoryBuffer::from_text("hi\nthere");
    rewrite(&session, &mut buf, Mark::new(1, 0), Mark::new(1, 0), VisualMode::Line)
        .await
        .unwrap();
    assert_eq!(saved.lock().as_deref(), Some("HI\nthere"));
}

#[tokio::test]
async fn persister_failure_keeps_the_edit() {
    let options = SessionOptions {
        save_after: true,
        ..options_no_reindent()
    };
    let session = EditSession::new(options, upcase_client()).with_hooks(SessionHooks {
        formatter: None,
        persister: Some(Box::new(FailingPersister)),
    });

    let mut buf = MemoryBuffer::from_text("keep");
    let applied = rewrite(&session, &mut buf, Mark::new(1, 0), Mark::new(1, 0), VisualMode::Line)
        .await
        .unwrap();
    assert_eq!(buf.text(), "KEEP");
    assert_eq!((applied.first_line, applied.last_line), (1, 1));
}

#[tokio::test]
async fn formatter_hook_receives_replaced_range() {
    let options = SessionOptions {
        format_after: true,
        ..options_no_reindent()
    };
    let session = EditSession::new(options, upcase_client()).with_hooks(SessionHooks {
        formatter: Some(Box::new(MarkerFormatter)),
        persister: None,
    });

    let mut buf = MemoryBuffer::from_text("one\ntwo\nthree");
    rewrite(&session, &mut buf, Mark::new(2, 0), Mark::new(3, 0), VisualMode::Line)
        .await
        .unwrap();
    assert_eq!(buf.text(), "one\n>TWO\n>THREE");
}

#[tokio::test]
async fn hooks_do_not_run_when_disabled() {
    let saved = Arc::new(parking_lot::Mutex::new(None));
    // save_after stays false: the persister must never fire.
    let session =
        EditSession::new(options_no_reindent(), upcase_client()).with_hooks(SessionHooks {
            formatter: None,
            persister: Some(Box::new(RecordingPersister {
                saved: Arc::clone(&saved),
            })),
        });

    let mut buf = MemoryBuffer::from_text("quiet");
    rewrite(&session, &mut buf, Mark::new(1, 0), Mark::new(1, 0), VisualMode::Line)
        .await
        .unwrap();
    assert!(saved.lock().is_none());
}
