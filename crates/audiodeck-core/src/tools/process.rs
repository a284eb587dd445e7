//! Shared child-process plumbing for tool adapters.

use std::process::{Output, Stdio};

use tokio::process::Command;

use super::ToolError;

/// Keep this many trailing bytes of stderr as the diagnostic.
const DIAGNOSTIC_TAIL_BYTES: usize = 2048;

/// Run `cmd` to completion, capturing output. The child is killed if the
/// returned future is dropped. Nonzero exit maps to [`ToolError`].
pub(super) async fn run_captured(tool: &str, mut cmd: Command) -> Result<Output, ToolError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = cmd
        .output()
        .await
        .map_err(|e| ToolError::new(tool, None, format!("could not start {tool}: {e}")))?;

    if output.status.success() {
        return Ok(output);
    }

    let diagnostic = diagnostic_tail(&output.stderr);
    tracing::debug!(tool, code = ?output.status.code(), %diagnostic, "tool exited with failure");
    Err(ToolError::new(tool, output.status.code(), diagnostic))
}

fn diagnostic_tail(stderr: &[u8]) -> String {
    let start = stderr.len().saturating_sub(DIAGNOSTIC_TAIL_BYTES);
    let text = String::from_utf8_lossy(&stderr[start..]);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        "no diagnostic output".to_string()
    } else {
        trimmed.to_string()
    }
}
