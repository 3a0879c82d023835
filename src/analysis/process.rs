use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use super::ToolOutcome;

/// Run `program args..` in `working_dir`, capturing stdout and stderr.
///
/// The child is killed if it outlives `limit`. Nothing here returns an
/// error; every failure mode becomes a [`ToolOutcome`] variant.
pub async fn run_command(
    program: &str,
    args: &[String],
    working_dir: &Path,
    limit: Duration,
) -> ToolOutcome {
    let child = Command::new(program)
        .args(args)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();

    let child = match child {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(program, "Tool not found on PATH");
            return ToolOutcome::Unavailable(format!("'{program}' not found ({e})"));
        }
        Err(e) => {
            tracing::warn!(program, error = %e, "Failed to spawn tool");
            return ToolOutcome::Unavailable(format!("failed to start '{program}': {e}"));
        }
    };

    let output = match timeout(limit, child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            tracing::warn!(program, error = %e, "Tool crashed");
            return ToolOutcome::Crashed(e.to_string());
        }
        Err(_) => {
            // Dropping the future drops the child, which kills it
            tracing::warn!(program, limit_secs = limit.as_secs(), "Tool timed out");
            return ToolOutcome::TimedOut(limit);
        }
    };

    let Some(exit_code) = output.status.code() else {
        return ToolOutcome::Crashed(format!("'{program}' was terminated by a signal"));
    };

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&stderr);
    }

    tracing::debug!(program, exit_code, "Tool finished");

    ToolOutcome::Completed {
        exit_code: Some(exit_code),
        output: text,
    }
}
