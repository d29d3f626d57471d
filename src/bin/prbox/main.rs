use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use prbox::{
    CloseOpts, CreateOpts, FileRef, Gh, GhConfig, ListOpts, PrState, Repo, ReviewOpts, UpdateOpts,
};
use tracing::debug;

// Human-readable build info (for clap version display)
const BUILD_INFO_HUMAN: &str = env!("BUILD_INFO_HUMAN");

#[derive(Parser)]
#[command(name = "prbox")]
#[command(
    about = "Run GitHub pull request operations through the gh CLI in a disposable container"
)]
#[command(long_version = BUILD_INFO_HUMAN)]
struct Cli {
    /// GitHub repository in format 'owner/repo'
    #[arg(short = 'r', long = "repo", value_name = "OWNER/REPO", global = true)]
    repo: Option<String>,

    /// Host path of a repository checkout to mount into the container
    #[arg(long, value_name = "DIR", global = true)]
    source: Option<PathBuf>,

    /// Container image carrying the gh binary
    #[arg(long, value_name = "IMAGE", global = true)]
    image: Option<String>,

    /// Container engine binary (docker-compatible, e.g. podman)
    #[arg(long, value_name = "BIN", global = true)]
    engine: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a pull request
    Create {
        /// Assign people by their login; use "@me" to self-assign (can
        /// specify multiple)
        #[arg(long = "assignee", value_name = "LOGIN")]
        assignees: Vec<String>,

        /// The branch into which you want your code merged
        #[arg(long, value_name = "BRANCH")]
        base: Option<String>,

        /// Body for the pull request
        #[arg(long, value_name = "TEXT")]
        body: Option<String>,

        /// Read body text from file
        #[arg(long = "body-file", value_name = "FILE")]
        body_file: Option<PathBuf>,

        /// Mark pull request as a draft
        #[arg(long)]
        draft: bool,

        /// Use commit info for title and body (requires --source)
        #[arg(long)]
        fill: bool,

        /// Use first commit info for title and body (requires --source)
        #[arg(long = "fill-first")]
        fill_first: bool,

        /// Use commits msg+body for description (requires --source)
        #[arg(long = "fill-verbose")]
        fill_verbose: bool,

        /// The branch that contains commits for your pull request
        #[arg(long, value_name = "BRANCH")]
        head: Option<String>,

        /// Add labels by name (can specify multiple)
        #[arg(long = "label", value_name = "NAME")]
        labels: Vec<String>,

        /// Add the pull request to a milestone by name
        #[arg(long, value_name = "NAME")]
        milestone: Option<String>,

        /// Disable maintainer's ability to modify pull request
        #[arg(long = "no-maintainer-edit")]
        no_maintainer_edit: bool,

        /// Add the pull request to projects by name (can specify multiple)
        #[arg(long = "project", value_name = "NAME")]
        projects: Vec<String>,

        /// Request reviews from people or teams by their handle (can
        /// specify multiple)
        #[arg(long = "reviewer", value_name = "HANDLE")]
        reviewers: Vec<String>,

        /// Template file to use as starting body text
        #[arg(long, value_name = "FILE")]
        template: Option<PathBuf>,

        /// Title for the pull request
        #[arg(long, value_name = "TEXT")]
        title: Option<String>,
    },

    /// Close a pull request
    Close {
        /// Pull request number, URL or branch name
        #[arg(value_name = "PR")]
        pull_request: String,

        /// Add a comment when closing the pull request
        #[arg(long, value_name = "TEXT")]
        comment: Option<String>,

        /// Delete the local and remote branch after closing
        #[arg(long = "delete-branch")]
        delete_branch: bool,
    },

    /// Print the number of the first pull request matching the filter
    List {
        /// Filter by pull request state
        #[arg(long, value_name = "STATE")]
        state: Option<PrState>,

        /// Filter by base branch
        #[arg(long, value_name = "BRANCH")]
        base: Option<String>,

        /// Filter by head branch (exact match)
        #[arg(long, value_name = "BRANCH")]
        head: Option<String>,

        /// Filter by head branch using a regex pattern
        #[arg(long = "head-regex", value_name = "PATTERN")]
        head_regex: Option<String>,
    },

    /// Update an existing pull request
    Update {
        /// Pull request number, URL or branch name
        #[arg(value_name = "PR")]
        pull_request: String,

        /// Assign people by their login (can specify multiple)
        #[arg(long = "add-assignee", value_name = "LOGIN")]
        assignees: Vec<String>,

        /// The branch into which you want your code merged
        #[arg(long, value_name = "BRANCH")]
        base: Option<String>,

        /// Body for the pull request
        #[arg(long, value_name = "TEXT")]
        body: Option<String>,

        /// Read body text from file
        #[arg(long = "body-file", value_name = "FILE")]
        body_file: Option<PathBuf>,

        /// Add labels by name (can specify multiple)
        #[arg(long = "add-label", value_name = "NAME")]
        labels: Vec<String>,

        /// Add the pull request to a milestone by name
        #[arg(long, value_name = "NAME")]
        milestone: Option<String>,

        /// Add the pull request to projects by name (can specify multiple)
        #[arg(long = "add-project", value_name = "NAME")]
        projects: Vec<String>,

        /// Request reviews from people or teams by their handle (can
        /// specify multiple)
        #[arg(long = "add-reviewer", value_name = "HANDLE")]
        reviewers: Vec<String>,

        /// Title for the pull request
        #[arg(long, value_name = "TEXT")]
        title: Option<String>,
    },

    /// Add a review to a pull request
    Review {
        /// Pull request number, URL or branch name
        #[arg(value_name = "PR")]
        pull_request: String,

        #[arg(value_enum)]
        action: ReviewAction,

        /// Specify the body of the review
        #[arg(long, value_name = "TEXT")]
        body: Option<String>,

        /// Read body text from file
        #[arg(long = "body-file", value_name = "FILE")]
        body_file: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ReviewAction {
    Approve,
    Comment,
    RequestChanges,
}

/// Locates a GitHub token for the session.
fn github_token() -> Option<String> {
    // Prefer environment variables over gh CLI to avoid subprocess overhead.
    if let Ok(token) = std::env::var("GITHUB_TOKEN") {
        return Some(token);
    }

    if let Ok(token) = std::env::var("GH_TOKEN") {
        return Some(token);
    }

    let output = std::process::Command::new("gh")
        .args(["auth", "token"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let token = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (!token.is_empty()).then_some(token)
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn session_config(cli: &Cli) -> Result<GhConfig> {
    let repo = cli
        .repo
        .as_deref()
        .map(Repo::parse)
        .transpose()
        .context("Invalid repository")?;

    let token = github_token();
    if token.is_none() {
        debug!("no GitHub token found; relying on the container's own auth");
    }

    Ok(GhConfig {
        token,
        repo,
        source: cli.source.clone(),
        image: cli.image.clone(),
        engine: cli.engine.clone(),
    })
}

fn unwrap_or_empty(value: Option<String>) -> String {
    value.unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let session = Gh::container(session_config(&cli)?);
    let prs = session.pr();

    match cli.command {
        Command::Create {
            assignees,
            base,
            body,
            body_file,
            draft,
            fill,
            fill_first,
            fill_verbose,
            head,
            labels,
            milestone,
            no_maintainer_edit,
            projects,
            reviewers,
            template,
            title,
        } => {
            let opts = CreateOpts {
                assignees,
                base: unwrap_or_empty(base),
                body: unwrap_or_empty(body),
                body_file: body_file.map(FileRef::new),
                draft,
                fill,
                fill_first,
                fill_verbose,
                head: unwrap_or_empty(head),
                labels,
                milestone: unwrap_or_empty(milestone),
                no_maintainer_edit,
                projects,
                reviewers,
                template: template.map(FileRef::new),
                title: unwrap_or_empty(title),
            };
            prs.create(&opts).await.context("Failed to create pull request")?;
        }

        Command::Close {
            pull_request,
            comment,
            delete_branch,
        } => {
            let opts = CloseOpts {
                comment: unwrap_or_empty(comment),
                delete_branch,
            };
            prs.close(&pull_request, &opts)
                .await
                .context("Failed to close pull request")?;
        }

        Command::List {
            state,
            base,
            head,
            head_regex,
        } => {
            let opts = ListOpts {
                state,
                base: unwrap_or_empty(base),
                head: unwrap_or_empty(head),
                head_regex: unwrap_or_empty(head_regex),
            };
            let number = prs.list(&opts).await.context("Failed to list pull requests")?;
            println!("{number}");
        }

        Command::Update {
            pull_request,
            assignees,
            base,
            body,
            body_file,
            labels,
            milestone,
            projects,
            reviewers,
            title,
        } => {
            let opts = UpdateOpts {
                assignees,
                base: unwrap_or_empty(base),
                body: unwrap_or_empty(body),
                body_file: body_file.map(FileRef::new),
                labels,
                milestone: unwrap_or_empty(milestone),
                projects,
                reviewers,
                title: unwrap_or_empty(title),
            };
            prs.update(&pull_request, &opts)
                .await
                .context("Failed to update pull request")?;
        }

        Command::Review {
            pull_request,
            action,
            body,
            body_file,
        } => {
            let opts = ReviewOpts {
                body: unwrap_or_empty(body),
                body_file: body_file.map(FileRef::new),
            };
            let review = prs.review(pull_request, opts);
            let result = match action {
                ReviewAction::Approve => review.approve().await,
                ReviewAction::Comment => review.comment().await,
                ReviewAction::RequestChanges => review.request_changes().await,
            };
            result.context("Failed to submit review")?;
        }
    }

    Ok(())
}
