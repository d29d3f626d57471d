use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Deserialize;
use thiserror::Error;

/// GitHub repository coordinates in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repo {
    owner: String,
    name: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepoError {
    #[error("repository must be in format 'owner/repo', got: '{0}'")]
    Format(String),
}

impl Repo {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self, RepoError> {
        let owner = owner.into();
        let name = name.into();

        if owner.is_empty() || name.is_empty() || owner.contains('/') || name.contains('/') {
            return Err(RepoError::Format(format!("{owner}/{name}")));
        }

        Ok(Self { owner, name })
    }

    /// Parses an `owner/repo` string.
    pub fn parse(repo: &str) -> Result<Self, RepoError> {
        match repo.split_once('/') {
            Some((owner, name)) => {
                Repo::new(owner, name).map_err(|_| RepoError::Format(repo.to_string()))
            }
            None => Err(RepoError::Format(repo.to_string())),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Repo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Opaque handle to a host file staged into the execution environment.
///
/// The content is never inspected by this crate; the sandbox makes the file
/// visible at a fixed well-known path and the composed arguments reference
/// that path rather than the original location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef(PathBuf);

impl FileRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl From<PathBuf> for FileRef {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl From<&Path> for FileRef {
    fn from(path: &Path) -> Self {
        Self(path.to_path_buf())
    }
}

/// Pull request states accepted by the list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrState {
    Open,
    Closed,
    Merged,
    All,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown pull request state '{0}' (expected open|closed|merged|all)")]
pub struct ParseStateError(String);

impl PrState {
    pub fn as_str(self) -> &'static str {
        match self {
            PrState::Open => "open",
            PrState::Closed => "closed",
            PrState::Merged => "merged",
            PrState::All => "all",
        }
    }
}

impl FromStr for PrState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(PrState::Open),
            "closed" => Ok(PrState::Closed),
            "merged" => Ok(PrState::Merged),
            "all" => Ok(PrState::All),
            unknown => Err(ParseStateError(unknown.to_string())),
        }
    }
}

/// Review verbs exposed by the review delegate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewVerb {
    Approve,
    Comment,
    RequestChanges,
}

impl ReviewVerb {
    pub fn as_flag(self) -> &'static str {
        match self {
            ReviewVerb::Approve => "--approve",
            ReviewVerb::Comment => "--comment",
            ReviewVerb::RequestChanges => "--request-changes",
        }
    }
}

/// Decoded row from the list query's machine-readable output.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrSummary {
    pub number: u64,
    pub head_ref_name: String,
}
