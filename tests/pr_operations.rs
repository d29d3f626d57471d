use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use prbox::{
    BODY_MOUNT, CloseOpts, CreateOpts, Error, ExecOutput, FileRef, Gh, ListOpts, ReviewOpts,
    Sandbox, TEMPLATE_MOUNT, UpdateOpts,
};

/// One recorded `exec` call: the argv plus the mounts visible to it.
#[derive(Debug, Clone)]
struct RecordedRun {
    args: Vec<String>,
    mounts: Vec<(String, FileRef)>,
}

/// Recording sandbox standing in for a real container.
///
/// Mounts are per-instance (so derived copies diverge, like the real
/// runner); the run log is shared across copies so tests can observe every
/// execution made through one session.
#[derive(Clone, Default)]
struct MockSandbox {
    mounts: Vec<(String, FileRef)>,
    runs: Arc<Mutex<Vec<RecordedRun>>>,
    stdout: String,
    status: i32,
    stderr: String,
}

impl MockSandbox {
    fn new() -> Self {
        Self::default()
    }

    fn with_stdout(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            ..Self::default()
        }
    }

    fn failing(status: i32, stderr: &str) -> Self {
        Self {
            status,
            stderr: stderr.to_string(),
            ..Self::default()
        }
    }

    fn runs(&self) -> Vec<RecordedRun> {
        self.runs.lock().unwrap().clone()
    }

    fn single_run(&self) -> RecordedRun {
        let runs = self.runs();
        assert_eq!(runs.len(), 1, "expected exactly one execution");
        runs.into_iter().next().unwrap()
    }
}

#[async_trait]
impl Sandbox for MockSandbox {
    fn with_file(&self, path: &str, file: &FileRef) -> Self {
        let mut derived = self.clone();
        derived.mounts.push((path.to_string(), file.clone()));
        derived
    }

    async fn exec(&self, args: &[String]) -> Result<ExecOutput, Error> {
        self.runs.lock().unwrap().push(RecordedRun {
            args: args.to_vec(),
            mounts: self.mounts.clone(),
        });
        Ok(ExecOutput {
            status: self.status,
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
        })
    }
}

fn titled_create(title: &str) -> CreateOpts {
    CreateOpts {
        title: title.to_string(),
        head: "feat/widget".to_string(),
        ..CreateOpts::default()
    }
}

#[tokio::test]
async fn create_executes_composed_arguments() {
    let sandbox = MockSandbox::new();
    let session = Gh::new(sandbox.clone());

    let opts = CreateOpts {
        labels: vec!["bug".to_string(), "urgent".to_string()],
        reviewers: vec!["alice".to_string()],
        ..titled_create("Fix leak")
    };
    session.pr().create(&opts).await.unwrap();

    assert_eq!(
        sandbox.single_run().args,
        [
            "gh",
            "pr",
            "create",
            "--head",
            "feat/widget",
            "--label",
            "bug",
            "--label",
            "urgent",
            "--reviewer",
            "alice",
            "--title",
            "Fix leak",
        ]
    );
}

#[tokio::test]
async fn create_preconditions_fail_before_any_execution() {
    let sandbox = MockSandbox::new();
    let session = Gh::new(sandbox.clone());
    let prs = session.pr();

    let headless = CreateOpts {
        title: "X".to_string(),
        ..CreateOpts::default()
    };
    assert!(matches!(
        prs.create(&headless).await,
        Err(Error::MissingRequiredField { field: "head", .. })
    ));

    let filled = CreateOpts {
        fill: true,
        head: "feat/widget".to_string(),
        ..CreateOpts::default()
    };
    assert!(matches!(
        prs.create(&filled).await,
        Err(Error::InvalidFieldCombination(_))
    ));

    let untitled = CreateOpts {
        head: "feat/widget".to_string(),
        ..CreateOpts::default()
    };
    assert!(matches!(
        prs.create(&untitled).await,
        Err(Error::MissingRequiredField { field: "title", .. })
    ));

    assert!(sandbox.runs().is_empty(), "validation must precede execution");
}

#[tokio::test]
async fn create_with_source_allows_fill_without_head() {
    let sandbox = MockSandbox::new();
    let session = Gh::new(sandbox.clone()).with_source();

    let opts = CreateOpts {
        fill: true,
        ..CreateOpts::default()
    };
    session.pr().create(&opts).await.unwrap();

    assert_eq!(sandbox.single_run().args, ["gh", "pr", "create", "--fill"]);
}

#[tokio::test]
async fn create_stages_body_file_and_template_distinctly() {
    let dir = tempfile::tempdir().unwrap();
    let body_path = dir.path().join("body.md");
    let template_path = dir.path().join("template.md");
    std::fs::write(&body_path, "body text").unwrap();
    std::fs::write(&template_path, "template text").unwrap();

    let sandbox = MockSandbox::new();
    let session = Gh::new(sandbox.clone());

    let opts = CreateOpts {
        body_file: Some(FileRef::new(&body_path)),
        template: Some(FileRef::new(&template_path)),
        ..titled_create("Docs")
    };
    session.pr().create(&opts).await.unwrap();

    let run = sandbox.single_run();
    assert_eq!(
        run.mounts,
        [
            (BODY_MOUNT.to_string(), FileRef::new(&body_path)),
            (TEMPLATE_MOUNT.to_string(), FileRef::new(&template_path)),
        ]
    );

    // Arguments reference the fixed staged paths, never the host paths.
    assert!(run.args.contains(&BODY_MOUNT.to_string()));
    assert!(run.args.contains(&TEMPLATE_MOUNT.to_string()));
    let host = body_path.display().to_string();
    assert!(!run.args.iter().any(|arg| arg.contains(&host)));
}

#[tokio::test]
async fn sibling_calls_do_not_share_staged_files() {
    let sandbox = MockSandbox::new();
    let session = Gh::new(sandbox.clone());
    let prs = session.pr();

    let opts = CreateOpts {
        body_file: Some(FileRef::new("/home/me/body.md")),
        ..titled_create("First")
    };
    prs.create(&opts).await.unwrap();
    prs.close("42", &CloseOpts::default()).await.unwrap();

    let runs = sandbox.runs();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].mounts.len(), 1);
    assert!(runs[1].mounts.is_empty(), "close saw create's mounts");
}

#[tokio::test]
async fn composition_is_byte_identical_across_calls() {
    let sandbox = MockSandbox::new();
    let session = Gh::new(sandbox.clone());
    let prs = session.pr();

    let opts = CreateOpts {
        assignees: vec!["@me".to_string()],
        labels: vec!["a".to_string(), "b".to_string()],
        draft: true,
        ..titled_create("Same")
    };
    prs.create(&opts).await.unwrap();
    prs.create(&opts).await.unwrap();

    let runs = sandbox.runs();
    assert_eq!(runs[0].args, runs[1].args);
}

#[tokio::test]
async fn close_passes_identifier_and_flags() {
    let sandbox = MockSandbox::new();
    let session = Gh::new(sandbox.clone());

    let opts = CloseOpts {
        comment: "superseded by #99".to_string(),
        delete_branch: true,
    };
    session.pr().close("42", &opts).await.unwrap();

    assert_eq!(
        sandbox.single_run().args,
        [
            "gh",
            "pr",
            "close",
            "42",
            "--comment",
            "superseded by #99",
            "--delete-branch",
        ]
    );
}

#[tokio::test]
async fn execution_failure_surfaces_status_and_stderr() {
    let sandbox = MockSandbox::failing(1, "pull request not found");
    let session = Gh::new(sandbox);

    let result = session.pr().close("999", &CloseOpts::default()).await;
    match result {
        Err(Error::ExecutionFailure { status, stderr }) => {
            assert_eq!(status, 1);
            assert_eq!(stderr, "pull request not found");
        }
        other => panic!("expected ExecutionFailure, got {other:?}"),
    }
}

#[tokio::test]
async fn list_returns_first_match_for_regex() {
    let sandbox = MockSandbox::with_stdout(
        r#"[{"number":7,"headRefName":"feat/x"},{"number":8,"headRefName":"feat/y"}]"#,
    );
    let session = Gh::new(sandbox.clone());

    let opts = ListOpts {
        head_regex: "^feat/".to_string(),
        ..ListOpts::default()
    };
    let number = session.pr().list(&opts).await.unwrap();
    assert_eq!(number, "7");

    // The regex is applied client-side only.
    let run = sandbox.single_run();
    assert_eq!(
        run.args,
        ["gh", "pr", "list", "--json", "number,headRefName", "--limit", "1000"]
    );
}

#[tokio::test]
async fn list_distinguishes_no_match_from_empty_result() {
    let populated = MockSandbox::with_stdout(r#"[{"number":1,"headRefName":"main"}]"#);
    let session = Gh::new(populated);
    let opts = ListOpts {
        head_regex: "^feat/".to_string(),
        ..ListOpts::default()
    };
    assert!(matches!(session.pr().list(&opts).await, Err(Error::NoMatch)));

    let empty = MockSandbox::with_stdout("[]");
    let session = Gh::new(empty);
    assert!(matches!(
        session.pr().list(&ListOpts::default()).await,
        Err(Error::EmptyResult)
    ));

    // A pattern against an empty list reports the filter outcome.
    let empty = MockSandbox::with_stdout("[]");
    let session = Gh::new(empty);
    assert!(matches!(session.pr().list(&opts).await, Err(Error::NoMatch)));
}

#[tokio::test]
async fn list_rejects_invalid_pattern() {
    let sandbox = MockSandbox::with_stdout(r#"[{"number":1,"headRefName":"main"}]"#);
    let session = Gh::new(sandbox);

    let opts = ListOpts {
        head_regex: "(".to_string(),
        ..ListOpts::default()
    };
    assert!(matches!(
        session.pr().list(&opts).await,
        Err(Error::InvalidPattern(_))
    ));
}

#[tokio::test]
async fn list_reports_malformed_output_as_decode_error() {
    let sandbox = MockSandbox::with_stdout("error: not logged in");
    let session = Gh::new(sandbox);

    assert!(matches!(
        session.pr().list(&ListOpts::default()).await,
        Err(Error::Decode(_))
    ));
}

#[tokio::test]
async fn update_composes_additive_flags_and_stages_body() {
    let sandbox = MockSandbox::new();
    let session = Gh::new(sandbox.clone());

    let opts = UpdateOpts {
        labels: vec!["backport".to_string()],
        body_file: Some(FileRef::new("/home/me/body.md")),
        title: "Better title".to_string(),
        ..UpdateOpts::default()
    };
    session.pr().update("7", &opts).await.unwrap();

    let run = sandbox.single_run();
    assert_eq!(
        run.args,
        [
            "gh",
            "pr",
            "edit",
            "7",
            "--body-file",
            BODY_MOUNT,
            "--add-label",
            "backport",
            "--title",
            "Better title",
        ]
    );
    assert_eq!(
        run.mounts,
        [(BODY_MOUNT.to_string(), FileRef::new("/home/me/body.md"))]
    );
}

#[tokio::test]
async fn review_verbs_share_one_delegate() {
    let sandbox = MockSandbox::new();
    let session = Gh::new(sandbox.clone());

    let review = session.pr().review(
        "42",
        ReviewOpts {
            body: "looks good".to_string(),
            ..ReviewOpts::default()
        },
    );
    review.approve().await.unwrap();
    review.comment().await.unwrap();
    review.request_changes().await.unwrap();

    let runs = sandbox.runs();
    let verbs: Vec<&str> = runs.iter().map(|run| run.args[4].as_str()).collect();
    assert_eq!(verbs, ["--approve", "--comment", "--request-changes"]);
    for run in &runs {
        assert_eq!(run.args[..4], ["gh", "pr", "review", "42"]);
        assert_eq!(run.args[5..], ["--body", "looks good"]);
    }
}

#[tokio::test]
async fn review_stages_body_file_at_fixed_path() {
    let sandbox = MockSandbox::new();
    let session = Gh::new(sandbox.clone());

    let review = session.pr().review(
        "42",
        ReviewOpts {
            body_file: Some(FileRef::new("/home/me/review.md")),
            ..ReviewOpts::default()
        },
    );
    review.request_changes().await.unwrap();

    let run = sandbox.single_run();
    assert_eq!(
        run.args,
        [
            "gh",
            "pr",
            "review",
            "42",
            "--request-changes",
            "--body-file",
            BODY_MOUNT,
        ]
    );
    assert_eq!(
        run.mounts,
        [(BODY_MOUNT.to_string(), FileRef::new("/home/me/review.md"))]
    );
}

#[tokio::test]
async fn exec_passes_arguments_through_untouched() {
    let sandbox = MockSandbox::with_stdout("gh version 2.62.0\n");
    let session = Gh::new(sandbox.clone());

    let args: Vec<String> = ["gh", "--version"].iter().map(|s| s.to_string()).collect();
    let output = session.exec(&args).await.unwrap();

    assert_eq!(output, "gh version 2.62.0\n");
    assert_eq!(sandbox.single_run().args, ["gh", "--version"]);
}
