use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::config::RootCommitDiff;
use crate::error::{AppError, Result};
use crate::git::backend::{Backend, ChangeStatus, Commit, RawDiff};
use crate::git::resolve;

pub const DEFAULT_CONTEXT_LINES: u32 = 3;

static FILE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\+\+\+ b/([^\n]*)\n").expect("file header pattern"));
static NEXT_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^diff").expect("diff line pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub status: ChangeStatus,
    pub old_path: String,
    pub new_path: String,
    pub old_sha: String,
    pub new_sha: String,
    pub additions: usize,
    pub deletions: usize,
    /// Hunks of the unified diff for this file, starting at the first `@@`.
    pub patch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    pub files: Vec<FileChange>,
    pub additions: usize,
    pub deletions: usize,
    /// The complete unified diff text.
    pub patch: String,
}

impl Diff {
    pub fn total(&self) -> usize {
        self.additions + self.deletions
    }

    fn from_raw(raw: RawDiff) -> Self {
        let fragments = split_patch(&raw.patch);
        let files: Vec<FileChange> = raw
            .files
            .into_iter()
            .map(|file| FileChange {
                patch: fragments.get(&file.new_path).cloned(),
                status: file.status,
                old_path: file.old_path,
                new_path: file.new_path,
                old_sha: file.old_sha,
                new_sha: file.new_sha,
                additions: file.additions,
                deletions: file.deletions,
            })
            .collect();

        let additions = files.iter().map(|f| f.additions).sum();
        let deletions = files.iter().map(|f| f.deletions).sum();

        Diff {
            files,
            additions,
            deletions,
            patch: raw.patch,
        }
    }
}

/// Diffs `commit` against `against`, or against its first parent when no
/// base is given. What happens for a root commit is decided by `root`.
pub fn diff_commit(
    backend: &dyn Backend,
    commit: &Commit,
    against: Option<&Commit>,
    context_lines: u32,
    root: RootCommitDiff,
) -> Result<Diff> {
    let old_tree = match (against, commit.first_parent()) {
        (Some(base), _) => Some(base.tree_sha.clone()),
        (None, Some(parent)) => Some(resolve::commit_by_sha(backend, parent)?.tree_sha),
        (None, None) => match root {
            RootCommitDiff::EmptyTree => None,
            RootCommitDiff::NotFound => return Err(AppError::not_found("commit has no parents")),
        },
    };

    let raw = backend.diff_trees(old_tree.as_deref(), &commit.tree_sha, context_lines)?;
    Ok(Diff::from_raw(raw))
}

/// Splits unified diff text into per-file fragments keyed by new path.
///
/// A fragment starts at the `@@` line following a `+++ b/<path>` header and
/// ends before the next top-level `diff` line or at the end of the text.
/// Files without hunks (binary, mode-only changes) have no fragment.
pub fn split_patch(patch: &str) -> HashMap<String, String> {
    let mut fragments = HashMap::new();

    for caps in FILE_HEADER.captures_iter(patch) {
        let (Some(header), Some(path)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let rest = &patch[header.end()..];
        if !rest.starts_with("@@") {
            continue;
        }

        let end = NEXT_FILE.find(rest).map_or(rest.len(), |m| m.start());
        let body = &rest[..end];
        let body = body.strip_suffix('\n').unwrap_or(body);
        fragments.insert(path.as_str().to_string(), body.to_string());
    }

    fragments
}
