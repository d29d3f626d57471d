//! [`Sandbox`] implementation backed by a container engine CLI.
//!
//! Image provisioning and base-environment setup live outside this crate;
//! this adapter only composes and runs `<engine> run --rm …` for a prepared
//! image that carries the `gh` binary.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::{
    error::Error,
    sandbox::{ExecOutput, Sandbox},
    types::{FileRef, Repo},
};

/// Image used when the configuration does not name one.
pub const DEFAULT_IMAGE: &str = "maniator/gh:latest";

/// Path the repository source checkout is mounted at, and the working
/// directory commands run in when a checkout is configured.
pub const SOURCE_MOUNT: &str = "/work/repo";

/// Session-level configuration, bound once and reused by every operation.
#[derive(Debug, Clone, Default)]
pub struct GhConfig {
    /// GitHub token, injected as `GH_TOKEN` through the child environment.
    /// Never placed on the command line.
    pub token: Option<String>,
    /// Target repository, injected as `GH_REPO`.
    pub repo: Option<Repo>,
    /// Host path of a repository checkout to mount at [`SOURCE_MOUNT`].
    pub source: Option<PathBuf>,
    /// Container image to run; [`DEFAULT_IMAGE`] when unset.
    pub image: Option<String>,
    /// Engine binary; `docker` when unset (`podman` is argument-compatible).
    pub engine: Option<String>,
}

/// Runs composed commands in a disposable container.
///
/// Each operation call derives its own copy via [`Sandbox::with_file`], so
/// staged files never leak between sibling calls. The child process is
/// killed if the calling future is dropped; a dropped mutating call must be
/// treated as unknown outcome.
#[derive(Debug, Clone)]
pub struct ContainerRunner {
    config: GhConfig,
    mounts: Vec<(String, FileRef)>,
}

impl ContainerRunner {
    pub fn new(config: GhConfig) -> Self {
        Self {
            config,
            mounts: Vec::new(),
        }
    }

    /// Whether a repository checkout is mounted into the container.
    pub fn has_source(&self) -> bool {
        self.config.source.is_some()
    }

    fn engine(&self) -> &str {
        self.config.engine.as_deref().unwrap_or("docker")
    }

    /// Full argv handed to the engine binary for one run.
    fn engine_args(&self, args: &[String]) -> Vec<String> {
        let mut run = vec!["run".to_string(), "--rm".to_string()];

        if self.config.token.is_some() {
            // Bare -e NAME forwards the value from the client environment.
            run.push("-e".to_string());
            run.push("GH_TOKEN".to_string());
        }

        if let Some(repo) = &self.config.repo {
            run.push("-e".to_string());
            run.push(format!("GH_REPO={repo}"));
        }

        if let Some(source) = &self.config.source {
            run.push("-v".to_string());
            run.push(format!("{}:{SOURCE_MOUNT}", source.display()));
            run.push("-w".to_string());
            run.push(SOURCE_MOUNT.to_string());
        }

        for (path, file) in &self.mounts {
            run.push("-v".to_string());
            run.push(format!("{}:{path}:ro", file.path().display()));
        }

        run.push(
            self.config
                .image
                .clone()
                .unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
        );
        run.extend(args.iter().cloned());
        run
    }
}

#[async_trait]
impl Sandbox for ContainerRunner {
    fn with_file(&self, path: &str, file: &FileRef) -> Self {
        let mut derived = self.clone();
        derived.mounts.push((path.to_string(), file.clone()));
        derived
    }

    async fn exec(&self, args: &[String]) -> Result<ExecOutput, Error> {
        let engine_args = self.engine_args(args);
        debug!(engine = self.engine(), args = ?engine_args, "running container command");

        let mut command = Command::new(self.engine());
        command.args(&engine_args).kill_on_drop(true);
        if let Some(token) = &self.config.token {
            command.env("GH_TOKEN", token);
        }

        let output = command.output().await.map_err(Error::Spawn)?;

        Ok(ExecOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
