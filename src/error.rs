//! Failure taxonomy for pull request operations.

use thiserror::Error;

/// Single outcome type for every operation call.
///
/// Precondition failures are reported before any execution is attempted.
/// `ExecutionFailure` carries the exit status and captured stderr of the one
/// command that ran; nothing here retries or interprets it further.
#[derive(Debug, Error)]
pub enum Error {
    #[error("\"{field}\" is required {reason}")]
    MissingRequiredField {
        field: &'static str,
        reason: &'static str,
    },

    #[error("{0}")]
    InvalidFieldCombination(&'static str),

    /// The execution environment itself could not be started, as opposed to
    /// a command that ran and exited non-zero.
    #[error("failed to start execution environment")]
    Spawn(#[source] std::io::Error),

    #[error("command exited with status {status}: {stderr}")]
    ExecutionFailure { status: i32, stderr: String },

    #[error("failed to parse pull request list")]
    Decode(#[source] serde_json::Error),

    #[error("invalid regex pattern")]
    InvalidPattern(#[source] regex::Error),

    #[error("no pull requests found matching the regex pattern")]
    NoMatch,

    #[error("no pull requests found")]
    EmptyResult,
}
