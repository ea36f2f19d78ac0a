//! Subprocess driver for the external transform command.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

use crate::text_utils::strip_code_fence;

use super::types::{CancelHandle, TransformError, TransformRequest};

/// Environment variable carrying the filetype hint to the child.
pub const ENV_FILETYPE: &str = "PAR_REVISE_FILETYPE";
/// Environment variable carrying the source path hint to the child.
pub const ENV_PATH: &str = "PAR_REVISE_PATH";

/// Invokes the configured external command for one [`TransformRequest`].
///
/// The client itself is stateless and reusable; each [`run`] call spawns a
/// fresh child process and owns its whole lifecycle, including the kill on
/// timeout or cancellation.
///
/// [`run`]: TransformClient::run
#[derive(Debug, Clone)]
pub struct TransformClient {
    /// Command to execute.
    pub command: String,
    /// Arguments placed before the instruction argument.
    pub args: Vec<String>,
    /// Deadline in milliseconds.
    pub timeout_ms: u64,
}

impl TransformClient {
    pub fn new(command: impl Into<String>, args: Vec<String>, timeout_ms: u64) -> Self {
        Self {
            command: command.into(),
            args,
            timeout_ms,
        }
    }

    /// Run the command to completion, returning its stdout with any outer
    /// code fence stripped and a single trailing newline removed.
    ///
    /// Exactly one terminal outcome is observed per call: `Ok`, `Failed`,
    /// `Timeout`, or `Cancelled`. On timeout and cancellation the child is
    /// killed; the kill is a no-op if the process already exited, and no
    /// orphan is left behind either way.
    pub async fn run(
        &self,
        req: &TransformRequest,
        cancel: &CancelHandle,
    ) -> Result<String, TransformError> {
        if cancel.is_cancelled() {
            return Err(TransformError::Cancelled);
        }

        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .arg(&req.instruction)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(ref ft) = req.hints.filetype {
            cmd.env(ENV_FILETYPE, ft);
        }
        if let Some(ref path) = req.hints.path {
            cmd.env(ENV_PATH, path);
        }

        log::info!(
            "spawning transform command '{}' ({} args, timeout {}ms)",
            self.command,
            self.args.len() + 1,
            self.timeout_ms
        );

        let mut child = cmd
            .spawn()
            .map_err(|e| TransformError::CommandNotFound(format!("{}: {e}", self.command)))?;

        // Feed stdin and drain stdout/stderr from their own tasks so a
        // chatty child can never deadlock against a full pipe.
        let mut stdin = child.stdin.take().ok_or_else(|| {
            TransformError::Io(std::io::Error::other("failed to capture child stdin"))
        })?;
        let input = req.text.clone().into_bytes();
        let stdin_task = tokio::spawn(async move {
            let _ = stdin.write_all(&input).await;
            // Dropping stdin closes the pipe and signals EOF to the child.
        });

        let mut stdout = child.stdout.take().ok_or_else(|| {
            TransformError::Io(std::io::Error::other("failed to capture child stdout"))
        })?;
        let stdout_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stdout.read_to_end(&mut buf).await;
            buf
        });

        let mut stderr = child.stderr.take().ok_or_else(|| {
            TransformError::Io(std::io::Error::other("failed to capture child stderr"))
        })?;
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            buf
        });

        let deadline = Duration::from_millis(self.timeout_ms);
        let status = tokio::select! {
            status = child.wait() => status?,
            _ = cancel.cancelled() => {
                log::info!("transform cancelled, killing child");
                let _ = child.kill().await;
                stdin_task.abort();
                return Err(TransformError::Cancelled);
            }
            _ = tokio::time::sleep(deadline) => {
                log::warn!("transform timed out after {}ms, killing child", self.timeout_ms);
                let _ = child.kill().await;
                stdin_task.abort();
                return Err(TransformError::Timeout(self.timeout_ms));
            }
        };

        let _ = stdin_task.await;
        let stdout_bytes = stdout_task.await.unwrap_or_default();
        let stderr_bytes = stderr_task.await.unwrap_or_default();

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes).trim().to_string();
            let stderr = if stderr.is_empty() {
                "transform command failed with no diagnostic output".to_string()
            } else {
                stderr
            };
            log::warn!("transform failed ({:?}): {}", status.code(), stderr);
            return Err(TransformError::Failed {
                code: status.code(),
                stderr,
            });
        }

        let raw = String::from_utf8_lossy(&stdout_bytes).into_owned();
        let mut out = strip_code_fence(&raw);
        // Commands almost always end their output with a newline that was
        // never part of the selection.
        if out.ends_with('\n') {
            out.pop();
        }
        log::debug!("transform returned {} bytes", out.len());
        Ok(out)
    }
}
