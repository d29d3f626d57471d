//! Pull request lifecycle operations over a prepared sandbox.

use tracing::debug;

use crate::{
    compose::{ArgSpec, BODY_MOUNT, Invocation, TEMPLATE_MOUNT, compose},
    container::{ContainerRunner, GhConfig},
    error::Error,
    list,
    sandbox::Sandbox,
    types::{FileRef, PrState, ReviewVerb},
};

/// Session handle binding a prepared sandbox to the pull request operations.
///
/// `has_source` records whether a repository checkout is present in the
/// execution workspace; the `create` preconditions depend on it. Every
/// operation derives its own scoped sandbox copy for staged files, so
/// concurrent calls from one session are independent.
#[derive(Debug, Clone)]
pub struct Gh<S> {
    sandbox: S,
    has_source: bool,
}

impl<S: Sandbox> Gh<S> {
    pub fn new(sandbox: S) -> Self {
        Self {
            sandbox,
            has_source: false,
        }
    }

    /// Marks the session as having a repository checkout available.
    pub fn with_source(mut self) -> Self {
        self.has_source = true;
        self
    }

    /// Work with GitHub pull requests.
    pub fn pr(&self) -> PullRequests<'_, S> {
        PullRequests { gh: self }
    }

    /// Runs an arbitrary pre-composed `gh` invocation in the sandbox and
    /// returns its stdout. Escape hatch for operations this crate does not
    /// model; the arguments are passed through untouched.
    pub async fn exec(&self, args: &[String]) -> Result<String, Error> {
        self.sandbox.run_capture(args).await
    }
}

impl Gh<ContainerRunner> {
    /// Session backed by a container engine, with source presence derived
    /// from the configured checkout.
    pub fn container(config: GhConfig) -> Self {
        let has_source = config.source.is_some();
        Self {
            sandbox: ContainerRunner::new(config),
            has_source,
        }
    }
}

/// Pull request operations bound to a session.
pub struct PullRequests<'a, S> {
    gh: &'a Gh<S>,
}

impl<'a, S: Sandbox> PullRequests<'a, S> {
    /// Creates a pull request.
    pub async fn create(&self, opts: &CreateOpts) -> Result<(), Error> {
        opts.validate(self.gh.has_source)?;
        run(self.gh, opts.invocation()).await
    }

    /// Closes a pull request. `pull_request` is a number, URL or branch
    /// name; a bad identifier is left to `gh` to reject.
    pub async fn close(&self, pull_request: &str, opts: &CloseOpts) -> Result<(), Error> {
        run(self.gh, opts.invocation(pull_request)).await
    }

    /// Finds the number of the first pull request matching the filter,
    /// returned as text.
    pub async fn list(&self, opts: &ListOpts) -> Result<String, Error> {
        let invocation = opts.invocation();
        debug!(args = ?invocation.args, "executing pull request query");
        let output = scoped(self.gh, &invocation)
            .run_capture(&invocation.args)
            .await?;
        let rows = list::decode(&output)?;
        list::select(&rows, &opts.head_regex)
    }

    /// Updates an existing pull request.
    pub async fn update(&self, pull_request: &str, opts: &UpdateOpts) -> Result<(), Error> {
        run(self.gh, opts.invocation(pull_request)).await
    }

    /// Builds the review delegate for one pull request. The body payload is
    /// shared by all three verbs.
    pub fn review(&self, pull_request: impl Into<String>, opts: ReviewOpts) -> Review<'a, S> {
        Review {
            gh: self.gh,
            pull_request: pull_request.into(),
            opts,
        }
    }
}

/// Derives the per-call sandbox with every staged file mounted.
fn scoped<S: Sandbox>(gh: &Gh<S>, invocation: &Invocation) -> S {
    let mut sandbox = gh.sandbox.clone();
    for (path, file) in &invocation.mounts {
        sandbox = sandbox.with_file(path, file);
    }
    sandbox
}

async fn run<S: Sandbox>(gh: &Gh<S>, invocation: Invocation) -> Result<(), Error> {
    debug!(args = ?invocation.args, "executing pull request command");
    scoped(gh, &invocation).run(&invocation.args).await
}

/// Options for [`PullRequests::create`].
///
/// Scalar fields treat the empty string as unset; list fields emit one flag
/// occurrence per element.
#[derive(Debug, Clone, Default)]
pub struct CreateOpts {
    /// Assign people by their login. Use "@me" to self-assign.
    pub assignees: Vec<String>,
    /// The branch into which you want your code merged.
    pub base: String,
    /// Body for the pull request.
    pub body: String,
    /// Read body text from a staged file.
    pub body_file: Option<FileRef>,
    /// Mark pull request as a draft.
    pub draft: bool,
    /// Use commit info for title and body. Requires a repository source.
    pub fill: bool,
    /// Use first commit info for title and body. Requires a repository
    /// source.
    pub fill_first: bool,
    /// Use commits msg+body for description. Requires a repository source.
    pub fill_verbose: bool,
    /// The branch that contains commits for your pull request. Required
    /// when no repository source is available.
    pub head: String,
    /// Add labels by name.
    pub labels: Vec<String>,
    /// Add the pull request to a milestone by name.
    pub milestone: String,
    /// Disable maintainer's ability to modify pull request.
    pub no_maintainer_edit: bool,
    /// Add the pull request to projects by name.
    pub projects: Vec<String>,
    /// Request reviews from people or teams by their handle.
    pub reviewers: Vec<String>,
    /// Template file to use as starting body text.
    pub template: Option<FileRef>,
    /// Title for the pull request.
    pub title: String,
}

impl CreateOpts {
    fn fill_requested(&self) -> bool {
        self.fill || self.fill_first || self.fill_verbose
    }

    fn validate(&self, has_source: bool) -> Result<(), Error> {
        if !has_source {
            if self.head.is_empty() {
                return Err(Error::MissingRequiredField {
                    field: "head",
                    reason: "when no git repository is available",
                });
            }

            if self.fill_requested() {
                return Err(Error::InvalidFieldCombination(
                    "\"fill\", \"fill-first\" and \"fill-verbose\" require a git repository source",
                ));
            }
        }

        if !self.fill_requested() && self.title.is_empty() {
            return Err(Error::MissingRequiredField {
                field: "title",
                reason: "when none of the fill options are configured",
            });
        }

        Ok(())
    }

    fn invocation(&self) -> Invocation {
        compose(
            &["gh", "pr", "create"],
            &[
                ArgSpec::Repeated("--assignee", &self.assignees),
                ArgSpec::Value("--base", &self.base),
                ArgSpec::Value("--body", &self.body),
                ArgSpec::Staged("--body-file", BODY_MOUNT, self.body_file.as_ref()),
                ArgSpec::Flag("--draft", self.draft),
                ArgSpec::Flag("--fill", self.fill),
                ArgSpec::Flag("--fill-first", self.fill_first),
                ArgSpec::Flag("--fill-verbose", self.fill_verbose),
                ArgSpec::Value("--head", &self.head),
                ArgSpec::Repeated("--label", &self.labels),
                ArgSpec::Value("--milestone", &self.milestone),
                ArgSpec::Flag("--no-maintainer-edit", self.no_maintainer_edit),
                ArgSpec::Repeated("--project", &self.projects),
                ArgSpec::Repeated("--reviewer", &self.reviewers),
                ArgSpec::Staged("--template", TEMPLATE_MOUNT, self.template.as_ref()),
                ArgSpec::Value("--title", &self.title),
            ],
        )
    }
}

/// Options for [`PullRequests::close`].
#[derive(Debug, Clone, Default)]
pub struct CloseOpts {
    /// Add a comment when closing the pull request.
    pub comment: String,
    /// Delete the local and remote branch after closing.
    pub delete_branch: bool,
}

impl CloseOpts {
    fn invocation(&self, pull_request: &str) -> Invocation {
        compose(
            &["gh", "pr", "close", pull_request],
            &[
                ArgSpec::Value("--comment", &self.comment),
                ArgSpec::Flag("--delete-branch", self.delete_branch),
            ],
        )
    }
}

/// Filter for [`PullRequests::list`]. All fields are optional and compose
/// independently.
#[derive(Debug, Clone, Default)]
pub struct ListOpts {
    /// Filter by pull request state.
    pub state: Option<PrState>,
    /// Filter by base branch.
    pub base: String,
    /// Filter by head branch (exact, applied server-side).
    pub head: String,
    /// Filter by head branch using a regex pattern, applied client-side to
    /// the returned rows.
    pub head_regex: String,
}

impl ListOpts {
    fn invocation(&self) -> Invocation {
        compose(
            &[
                "gh",
                "pr",
                "list",
                "--json",
                list::LIST_FIELDS,
                "--limit",
                list::LIST_LIMIT,
            ],
            &[
                ArgSpec::Value("--state", self.state.map_or("", PrState::as_str)),
                ArgSpec::Value("--base", &self.base),
                ArgSpec::Value("--head", &self.head),
            ],
        )
    }
}

/// Options for [`PullRequests::update`]. Assignees, labels, projects and
/// reviewers are additive; `gh pr edit` has no remove counterpart here.
#[derive(Debug, Clone, Default)]
pub struct UpdateOpts {
    pub assignees: Vec<String>,
    pub base: String,
    pub body: String,
    pub body_file: Option<FileRef>,
    pub labels: Vec<String>,
    pub milestone: String,
    pub projects: Vec<String>,
    pub reviewers: Vec<String>,
    pub title: String,
}

impl UpdateOpts {
    fn invocation(&self, pull_request: &str) -> Invocation {
        compose(
            &["gh", "pr", "edit", pull_request],
            &[
                ArgSpec::Repeated("--add-assignee", &self.assignees),
                ArgSpec::Value("--base", &self.base),
                ArgSpec::Value("--body", &self.body),
                ArgSpec::Staged("--body-file", BODY_MOUNT, self.body_file.as_ref()),
                ArgSpec::Repeated("--add-label", &self.labels),
                ArgSpec::Value("--milestone", &self.milestone),
                ArgSpec::Repeated("--add-project", &self.projects),
                ArgSpec::Repeated("--add-reviewer", &self.reviewers),
                ArgSpec::Value("--title", &self.title),
            ],
        )
    }
}

/// Shared body payload for the three review verbs.
#[derive(Debug, Clone, Default)]
pub struct ReviewOpts {
    /// Specify the body of a review.
    pub body: String,
    /// Read body text from a staged file.
    pub body_file: Option<FileRef>,
}

/// Review actions for one pull request.
///
/// Built once by [`PullRequests::review`] and reused across verbs; each verb
/// composes its own invocation from the immutable delegate state. The pull
/// request identifier is passed through opaquely.
pub struct Review<'a, S> {
    gh: &'a Gh<S>,
    pull_request: String,
    opts: ReviewOpts,
}

impl<S: Sandbox> Review<'_, S> {
    /// Approve a pull request.
    pub async fn approve(&self) -> Result<(), Error> {
        self.submit(ReviewVerb::Approve).await
    }

    /// Comment on a pull request.
    pub async fn comment(&self) -> Result<(), Error> {
        self.submit(ReviewVerb::Comment).await
    }

    /// Request changes on a pull request.
    pub async fn request_changes(&self) -> Result<(), Error> {
        self.submit(ReviewVerb::RequestChanges).await
    }

    async fn submit(&self, verb: ReviewVerb) -> Result<(), Error> {
        let invocation = compose(
            &["gh", "pr", "review", &self.pull_request, verb.as_flag()],
            &[
                ArgSpec::Value("--body", &self.opts.body),
                ArgSpec::Staged("--body-file", BODY_MOUNT, self.opts.body_file.as_ref()),
            ],
        );
        run(self.gh, invocation).await
    }
}
