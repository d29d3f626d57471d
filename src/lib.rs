//! Prbox: GitHub pull request operations in a disposable container.
//!
//! Translates structured, typed requests into `gh` CLI invocations and runs
//! them single-shot through a scoped execution sandbox. Composition is
//! deterministic and separated from execution, so every operation can be
//! exercised and tested without a container present.

pub mod compose;
pub mod container;
pub mod error;
pub mod list;
pub mod pr;
pub mod sandbox;
pub mod types;

pub use compose::{ArgSpec, BODY_MOUNT, Invocation, TEMPLATE_MOUNT};
pub use container::{ContainerRunner, DEFAULT_IMAGE, GhConfig, SOURCE_MOUNT};
pub use error::Error;
pub use pr::{
    CloseOpts, CreateOpts, Gh, ListOpts, PullRequests, Review, ReviewOpts, UpdateOpts,
};
pub use sandbox::{ExecOutput, Sandbox};
pub use types::{FileRef, PrState, PrSummary, Repo, RepoError, ReviewVerb};
