use std::process::Stdio;

use anyhow::bail;
use anyhow::Result;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Runs `program`, optionally feeding `input` on stdin, and returns stdout.
/// A non-zero exit becomes an error carrying stderr.
pub async fn run_command(program: &str, args: &[&str], input: Option<&str>) -> Result<String> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

    let mut child = cmd.spawn()?;
    if let Some(text) = input {
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await?;
        }
    }

    let output = child.wait_with_output().await?;
    let stdout = String::from_utf8(output.stdout)?;

    tracing::debug!(
        program = program,
        args = ?args,
        status = ?output.status,
        "Ran sink command"
    );

    if !output.status.success() {
        bail!(format!(
            "{program} exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    return Ok(stdout);
}
