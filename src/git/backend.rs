//! Version-control backend abstraction.
//!
//! The core (resolver, flattener, diff formatter, blame extractor, archive
//! builder, history queries) only talks to a repository through the
//! [`Backend`] trait and the owned object model defined here. The libgit2
//! binding lives in `repository.rs`.

use crate::error::Result;

/// Tree entry mode for a gitlink (submodule).
pub const SUBMODULE_MODE: i32 = 0o160000;
/// Tree entry mode for a symbolic link.
pub const SYMLINK_MODE: i32 = 0o120000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Commit,
    Tree,
    Blob,
    Tag,
}

impl ObjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Commit => "commit",
            ObjectKind::Tree => "tree",
            ObjectKind::Blob => "blob",
            ObjectKind::Tag => "tag",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub sha: String,
    pub kind: ObjectKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    /// Seconds since the unix epoch.
    pub time: i64,
    /// Offset from UTC in minutes.
    pub offset_minutes: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub sha: String,
    pub author: Signature,
    pub committer: Signature,
    pub message: String,
    pub tree_sha: String,
    pub parent_shas: Vec<String>,
}

impl Commit {
    pub fn first_parent(&self) -> Option<&str> {
        self.parent_shas.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Blob,
    Tree,
    Submodule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub name: String,
    pub sha: String,
    pub mode: i32,
    pub kind: EntryKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    pub sha: String,
    pub entries: Vec<TreeEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub sha: String,
    pub data: Vec<u8>,
}

impl Blob {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub sha: String,
    pub name: String,
    pub tagger: Option<Signature>,
    pub message: String,
    pub target: ObjectRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    Commit(Commit),
    Tree(Tree),
    Blob(Blob),
    Tag(Tag),
}

impl Object {
    pub fn sha(&self) -> &str {
        match self {
            Object::Commit(c) => &c.sha,
            Object::Tree(t) => &t.sha,
            Object::Blob(b) => &b.sha,
            Object::Tag(t) => &t.sha,
        }
    }

    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Commit(_) => ObjectKind::Commit,
            Object::Tree(_) => ObjectKind::Tree,
            Object::Blob(_) => ObjectKind::Blob,
            Object::Tag(_) => ObjectKind::Tag,
        }
    }
}

/// A direct reference. Symbolic references are resolved before they reach
/// this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ref {
    pub name: String,
    pub target: ObjectRef,
}

impl Ref {
    /// Name with the `refs/heads/` or `refs/tags/` prefix removed.
    pub fn shorthand(&self) -> &str {
        self.name
            .strip_prefix("refs/heads/")
            .or_else(|| self.name.strip_prefix("refs/tags/"))
            .unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sorting {
    /// Backend default order.
    Unsorted,
    /// Newest commit time first.
    Time,
    /// Parents before children.
    ReverseTopological,
    /// Oldest commit time first.
    ReverseTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeStatus {
    Added,
    Modified,
    Removed,
    Renamed,
}

/// Per-file entry of a backend diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePatch {
    pub status: ChangeStatus,
    pub old_path: String,
    pub new_path: String,
    pub old_sha: String,
    pub new_sha: String,
    pub additions: usize,
    pub deletions: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDiff {
    pub files: Vec<FilePatch>,
    /// Unified diff text for the whole change set.
    pub patch: String,
}

#[derive(Debug, Clone, Copy)]
pub struct BlameRequest<'a> {
    pub path: &'a str,
    pub newest: &'a str,
    pub oldest: Option<&'a str>,
    pub first_line: usize,
    pub last_line: Option<usize>,
}

/// A run of consecutive lines attributed to the same commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlameHunk {
    pub commit_sha: String,
    pub orig_path: String,
    /// 1-based line number in the blamed (newest) version of the file.
    pub start_line: usize,
    pub line_count: usize,
}

impl BlameHunk {
    pub fn covers(&self, line: usize) -> bool {
        line >= self.start_line && line < self.start_line + self.line_count
    }
}

pub type CommitWalk<'a> = Box<dyn Iterator<Item = Result<String>> + 'a>;

/// Read-only operations the core needs from a repository.
///
/// Lookups that can legitimately miss return `Ok(None)`; `Err` is reserved
/// for backend failures.
pub trait Backend {
    /// Looks up an object by full or abbreviated hex id. Ambiguous prefixes
    /// count as a miss.
    fn find_object(&self, sha: &str) -> Result<Option<Object>>;

    /// Size in bytes of the object with full hex id `sha`, read from its
    /// header without loading the contents.
    fn object_size(&self, sha: &str) -> Result<Option<u64>>;

    /// Exact reference lookup; symbolic references are followed to their
    /// direct target but keep the requested name.
    fn find_reference(&self, name: &str) -> Result<Option<Ref>>;

    /// All direct references, sorted by name.
    fn references(&self) -> Result<Vec<Ref>>;

    fn merge_base(&self, left: &str, right: &str) -> Result<Option<String>>;

    /// Walks commit ids reachable from `start`, excluding `hidden` and their
    /// ancestors.
    fn walk(&self, start: &str, sorting: Sorting, hidden: &[String]) -> Result<CommitWalk<'_>>;

    /// Diffs two trees; `old_tree` of `None` means the empty tree. Rename
    /// detection runs when both sides are present.
    fn diff_trees(&self, old_tree: Option<&str>, new_tree: &str, context_lines: u32) -> Result<RawDiff>;

    fn blame(&self, request: &BlameRequest<'_>) -> Result<Vec<BlameHunk>>;

    /// Contents of the repository's `description` file, if any.
    fn description(&self) -> Result<Option<String>>;
}
