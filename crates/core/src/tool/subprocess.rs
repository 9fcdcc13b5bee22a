//! Subprocess execution with output capture and a wall-clock deadline.

use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use super::command::{ToolError, ToolOutput};

/// Maximum stdout or stderr size captured per stream (10 MiB).
///
/// Output exceeding this limit is truncated.
const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Spawn `cmd`, capture stdout/stderr, and wait at most `timeout` for exit
/// and for both output streams to close.
///
/// The caller sets the program and arguments. A non-zero exit is returned as
/// a normal [`ToolOutput`]; interpreting the exit code is up to the caller.
pub async fn run_command(cmd: &mut Command, timeout: Duration) -> Result<ToolOutput, ToolError> {
    // `kill_on_drop(true)` ensures the child is killed when dropped (e.g. on timeout).
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let program = cmd.as_std().get_program().to_string_lossy().into_owned();
    let start = Instant::now();

    let mut child = cmd.spawn().map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ToolError::NotFound(program.clone()),
        _ => ToolError::Io(e),
    })?;

    // Read the pipes in separate tasks so `child.wait()` can borrow `child`.
    let stdout_handle = child.stdout.take();
    let stderr_handle = child.stderr.take();

    let stdout_task = tokio::spawn(async move { read_stream(stdout_handle).await });
    let stderr_task = tokio::spawn(async move { read_stream(stderr_handle).await });
    let readers = [stdout_task.abort_handle(), stderr_task.abort_handle()];

    // The deadline covers draining the pipes too: a background grandchild
    // can hold them open after the direct child has exited.
    let finished = tokio::time::timeout(timeout, async {
        let status = child.wait().await?;
        let stdout_bytes = stdout_task.await.unwrap_or_default();
        let stderr_bytes = stderr_task.await.unwrap_or_default();
        Ok::<_, std::io::Error>((status, stdout_bytes, stderr_bytes))
    })
    .await;

    match finished {
        Ok(Ok((status, stdout_bytes, stderr_bytes))) => Ok(ToolOutput {
            stdout: String::from_utf8_lossy(&stdout_bytes).into_owned(),
            stderr: String::from_utf8_lossy(&stderr_bytes).into_owned(),
            exit_code: status.code().unwrap_or(-1),
            duration_ms: start.elapsed().as_millis() as u64,
        }),
        Ok(Err(e)) => Err(ToolError::Io(e)),
        Err(_elapsed) => {
            for reader in &readers {
                reader.abort();
            }
            // `child` is dropped on return, which kills the process if it is
            // still running.
            Err(ToolError::Timeout {
                elapsed_ms: start.elapsed().as_millis() as u64,
            })
        }
    }
}

/// Read an entire output stream into a byte buffer, capped at [`MAX_OUTPUT_BYTES`].
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        let _ = (&mut h)
            .take(MAX_OUTPUT_BYTES as u64)
            .read_to_end(&mut buf)
            .await;
    }
    buf
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_both_streams() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo out; echo err >&2"]);

        let output = run_command(&mut cmd, Duration::from_secs(5)).await.unwrap();

        assert_eq!(output.exit_code, 0);
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn nonzero_exit_is_reported_not_raised() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "exit 42"]);

        let output = run_command(&mut cmd, Duration::from_secs(5)).await.unwrap();
        assert_eq!(output.exit_code, 42);
    }

    #[tokio::test]
    async fn missing_program_is_not_found() {
        let mut cmd = Command::new("/nonexistent/analyzer-binary");

        let err = run_command(&mut cmd, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[tokio::test]
    async fn slow_process_times_out() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "sleep 10"]);

        let started = Instant::now();
        let err = run_command(&mut cmd, Duration::from_millis(200))
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn background_child_holding_pipes_times_out() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "sleep 8 & exit 0"]);

        let started = Instant::now();
        let err = run_command(&mut cmd, Duration::from_millis(500))
            .await
            .unwrap_err();

        assert!(matches!(err, ToolError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
