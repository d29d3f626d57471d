//! Boundary abstraction over running composed commands in an isolated
//! execution environment.

use async_trait::async_trait;

use crate::{error::Error, types::FileRef};

/// Captured result of one completed run.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    /// Process exit status; -1 when the process was terminated by a signal.
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// A prepared execution environment scoped to a single operation call.
///
/// [`Sandbox::with_file`] returns a new value rather than mutating in place,
/// so sibling calls derived from the same session never observe each other's
/// staged files. Implementations run each command exactly once: every run is
/// presumed to have real-world effect and must not be silently retried.
///
/// Cancellation is the caller dropping the operation future. A cancelled
/// mutating call is an unknown outcome; nothing is rolled back.
#[async_trait]
pub trait Sandbox: Clone + Send + Sync {
    /// Derives a sandbox with `file` visible at `path`. Earlier mounts
    /// remain visible.
    fn with_file(&self, path: &str, file: &FileRef) -> Self;

    /// Runs the command to completion, capturing output and exit status.
    /// Fails only when the environment itself cannot execute the command.
    async fn exec(&self, args: &[String]) -> Result<ExecOutput, Error>;

    /// Runs the command, discarding output. Non-zero exit becomes
    /// [`Error::ExecutionFailure`] with the captured stderr.
    async fn run(&self, args: &[String]) -> Result<(), Error> {
        self.exec(args).await.and_then(check)?;
        Ok(())
    }

    /// Runs the command and returns captured stdout on success.
    async fn run_capture(&self, args: &[String]) -> Result<String, Error> {
        let output = self.exec(args).await.and_then(check)?;
        Ok(output.stdout)
    }
}

fn check(output: ExecOutput) -> Result<ExecOutput, Error> {
    if output.success() {
        Ok(output)
    } else {
        Err(Error::ExecutionFailure {
            status: output.status,
            stderr: output.stderr,
        })
    }
}
