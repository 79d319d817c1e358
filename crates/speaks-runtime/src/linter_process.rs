use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use speaks_config::SUPPORTED_LINTERS;
use speaks_core::{LinterInvocation, LinterRunner};
use tracing::debug;

/// Name the PR file is written under before the linter sees it. The output
/// parser strips it back out of every diagnostic line.
pub const SCRATCH_FILE_NAME: &str = "file_to_check.py";

/// Runs the linter as a subprocess against a scratch copy of the file.
/// Style checkers exit non-zero whenever they find issues, so the exit
/// status is ignored and only stdout is collected.
pub struct SubprocessLinter;

#[async_trait]
impl LinterRunner for SubprocessLinter {
    async fn run(&self, linter: &str, args: &[String], source: &str) -> Result<LinterInvocation> {
        if !SUPPORTED_LINTERS.contains(&linter) {
            bail!("unsupported linter: {linter}");
        }
        let workdir = tempfile::tempdir().context("failed to create linter scratch directory")?;
        let scratch_path = workdir.path().join(SCRATCH_FILE_NAME);
        tokio::fs::write(&scratch_path, source)
            .await
            .context("failed to write linter scratch file")?;

        let output = tokio::process::Command::new(linter)
            .args(args)
            .arg(SCRATCH_FILE_NAME)
            .current_dir(workdir.path())
            .output()
            .await
            .with_context(|| format!("failed to run {linter}"))?;
        debug!(linter, exit = ?output.status.code(), "linter finished");

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout_lines = stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(ToString::to_string)
            .collect();
        Ok(LinterInvocation {
            scratch_name: SCRATCH_FILE_NAME.to_string(),
            stdout_lines,
        })
    }
}
