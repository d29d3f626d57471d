//! Deterministic mapping from operation requests to `gh` argument lists.
//!
//! Each operation declares a fixed table of [`ArgSpec`] entries in the order
//! its flags are emitted. Composition is a pure fold over that table, so the
//! same request always yields an identical token sequence and can be tested
//! without an execution environment.

use crate::types::FileRef;

/// Path a body file is staged at inside the execution workspace.
pub const BODY_MOUNT: &str = "/work/tmp/body";

/// Path a template file is staged at inside the execution workspace.
///
/// Distinct from [`BODY_MOUNT`] so a request supplying both a body file and
/// a template does not overwrite one with the other.
pub const TEMPLATE_MOUNT: &str = "/work/tmp/template";

/// One entry in an operation's flag table.
#[derive(Debug)]
pub enum ArgSpec<'a> {
    /// Bare flag, emitted only when the field is true.
    Flag(&'static str, bool),
    /// `(flag, value)` pair, emitted only when the value is non-empty. An
    /// empty string is indistinguishable from unset.
    Value(&'static str, &'a str),
    /// One `(flag, value)` pair per element, input order preserved.
    Repeated(&'static str, &'a [String]),
    /// File staged at a fixed path. Emits `(flag, path)` and records the
    /// mount; the original file location never appears in the arguments.
    Staged(&'static str, &'static str, Option<&'a FileRef>),
}

/// A composed command: the argument vector plus the files it expects to
/// find staged in the execution environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub args: Vec<String>,
    pub mounts: Vec<(&'static str, FileRef)>,
}

/// Folds a flag table into an [`Invocation`], starting from the fixed
/// command tokens (e.g. `gh pr create`).
pub fn compose(command: &[&str], table: &[ArgSpec<'_>]) -> Invocation {
    let mut invocation = Invocation {
        args: command.iter().map(|token| token.to_string()).collect(),
        mounts: Vec::new(),
    };

    for entry in table {
        match entry {
            ArgSpec::Flag(flag, true) => invocation.args.push((*flag).to_string()),
            ArgSpec::Flag(_, false) => {}
            ArgSpec::Value(flag, value) => {
                if !value.is_empty() {
                    invocation.args.push((*flag).to_string());
                    invocation.args.push((*value).to_string());
                }
            }
            ArgSpec::Repeated(flag, values) => {
                for value in *values {
                    invocation.args.push((*flag).to_string());
                    invocation.args.push(value.clone());
                }
            }
            ArgSpec::Staged(flag, path, Some(file)) => {
                invocation.mounts.push((*path, (*file).clone()));
                invocation.args.push((*flag).to_string());
                invocation.args.push((*path).to_string());
            }
            ArgSpec::Staged(_, _, None) => {}
        }
    }

    invocation
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn false_flag_emits_nothing() {
        let with_false = compose(&["gh", "pr", "create"], &[ArgSpec::Flag("--draft", false)]);
        let without = compose(&["gh", "pr", "create"], &[]);
        assert_eq!(with_false.args, without.args);
    }

    #[test]
    fn empty_value_emits_nothing() {
        let invocation = compose(&["gh", "pr", "create"], &[ArgSpec::Value("--base", "")]);
        assert_eq!(invocation.args, ["gh", "pr", "create"]);
    }

    #[test]
    fn repeated_emits_one_pair_per_element_in_order() {
        let labels = vec!["a".to_string(), "b".to_string()];
        let invocation = compose(&["gh"], &[ArgSpec::Repeated("--label", &labels)]);
        assert_eq!(invocation.args, ["gh", "--label", "a", "--label", "b"]);
    }

    #[test]
    fn staged_emits_fixed_path_and_records_mount() {
        let body = FileRef::new("/home/me/notes.md");
        let invocation = compose(
            &["gh"],
            &[ArgSpec::Staged("--body-file", BODY_MOUNT, Some(&body))],
        );
        assert_eq!(invocation.args, ["gh", "--body-file", BODY_MOUNT]);
        assert_eq!(invocation.mounts, vec![(BODY_MOUNT, body)]);
    }

    #[test]
    fn absent_staged_file_emits_nothing() {
        let invocation = compose(&["gh"], &[ArgSpec::Staged("--body-file", BODY_MOUNT, None)]);
        assert_eq!(invocation.args, ["gh"]);
        assert!(invocation.mounts.is_empty());
    }

    #[test]
    fn composition_is_deterministic() {
        let labels = vec!["x".to_string(), "y".to_string()];
        let table = || {
            [
                ArgSpec::Repeated("--label", &labels),
                ArgSpec::Flag("--draft", true),
                ArgSpec::Value("--title", "T"),
            ]
        };
        assert_eq!(compose(&["gh"], &table()), compose(&["gh"], &table()));
    }
}
