//! Invocation of the external optimizer executable.

use crate::command::InvocationCommand;
use crate::error::GatewayError;
use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Upper bound on bytes kept from each of stdout and stderr (10 MiB).
/// Output past the cap is drained and discarded so the child never blocks;
/// a successful run whose stdout overflowed fails with
/// [`GatewayError::OutputTooLarge`].
pub const MAX_OUTPUT_BYTES: u64 = 10 * 1024 * 1024;

/// What a finished (or killed) optimizer run left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// `None` when the process was killed by a signal or by the timeout.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    /// Stdout went past [`MAX_OUTPUT_BYTES`] and `stdout` holds only a prefix.
    pub stdout_truncated: bool,
}

/// Something that can run an [`InvocationCommand`] within a time budget.
///
/// Implementations report what happened; deciding whether that counts as
/// success is left to [`check_outcome`].
#[async_trait]
pub trait Optimizer: Send + Sync {
    async fn invoke(
        &self,
        command: &InvocationCommand,
        timeout: Duration,
    ) -> Result<ProcessOutcome, GatewayError>;
}

/// Runs the optimizer as a child process with no stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubprocessOptimizer;

#[async_trait]
impl Optimizer for SubprocessOptimizer {
    async fn invoke(
        &self,
        command: &InvocationCommand,
        timeout: Duration,
    ) -> Result<ProcessOutcome, GatewayError> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| GatewayError::ExecutableNotFound {
                path: command.program.clone(),
                source,
            })?;
        info!(pid = ?child.id(), "Optimizer spawned");

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let finished = tokio::time::timeout(timeout, async {
            let (status, stdout, stderr) =
                tokio::join!(child.wait(), read_capped(stdout), read_capped(stderr));
            Ok::<_, io::Error>((status?, stdout?, stderr?.0))
        })
        .await;

        match finished {
            Ok(Ok((status, (stdout, stdout_truncated), stderr))) => {
                info!(exit_code = ?status.code(), stdout_len = stdout.len(),
                      stdout_truncated, stderr_len = stderr.len(), "Optimizer exited");
                Ok(ProcessOutcome {
                    exit_code: status.code(),
                    stdout,
                    stderr,
                    timed_out: false,
                    stdout_truncated,
                })
            }
            Ok(Err(e)) => Err(GatewayError::Unexpected(format!(
                "failed to collect optimizer output: {e}"
            ))),
            Err(_) => {
                warn!(?timeout, "Optimizer timed out, killing process");
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "Failed to kill optimizer");
                }
                Ok(ProcessOutcome {
                    exit_code: None,
                    stdout: String::new(),
                    stderr: String::new(),
                    timed_out: true,
                    stdout_truncated: false,
                })
            }
        }
    }
}

/// Read a stream to the end, keeping at most [`MAX_OUTPUT_BYTES`]. The flag
/// reports whether anything was dropped.
async fn read_capped<R: AsyncRead + Unpin>(reader: Option<R>) -> io::Result<(String, bool)> {
    let mut buf = Vec::new();
    let mut dropped = 0;
    if let Some(mut reader) = reader {
        (&mut reader).take(MAX_OUTPUT_BYTES).read_to_end(&mut buf).await?;
        dropped = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await?;
    }
    Ok((String::from_utf8_lossy(&buf).into_owned(), dropped > 0))
}

/// Turn a raw outcome into the trimmed stdout of a successful run.
pub fn check_outcome(outcome: ProcessOutcome, timeout: Duration) -> Result<String, GatewayError> {
    if outcome.timed_out {
        return Err(GatewayError::Timeout(timeout));
    }

    debug!(stdout = %outcome.stdout.trim(), stderr = %outcome.stderr.trim(), "Optimizer output");

    match outcome.exit_code {
        Some(0) if outcome.stdout_truncated => Err(GatewayError::OutputTooLarge {
            limit: MAX_OUTPUT_BYTES,
        }),
        Some(0) => Ok(outcome.stdout.trim().to_string()),
        code => {
            let stderr = outcome.stderr.trim();
            let message = if !stderr.is_empty() {
                stderr.to_string()
            } else if let Some(code) = code {
                format!("optimizer exited with code {code}")
            } else {
                "optimizer was terminated by a signal".to_string()
            };
            Err(GatewayError::ProcessExit { code, message })
        }
    }
}
