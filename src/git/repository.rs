use git2::{
    BlameOptions, Delta, DiffFormat, DiffOptions, ErrorCode, ObjectType, Oid, Reference,
    ReferenceType, Repository, Sort,
};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::git::backend::{
    Backend, BlameHunk, BlameRequest, Blob, ChangeStatus, Commit, CommitWalk, EntryKind,
    FilePatch, Object, ObjectKind, ObjectRef, RawDiff, Ref, Signature, Sorting, Tag, Tree,
    TreeEntry, SUBMODULE_MODE,
};

const DEFAULT_DESCRIPTION: &str =
    "Unnamed repository; edit this file 'description' to name the repository.\n";

/// A libgit2 repository handle, opened for the duration of one request.
pub struct GitRepository {
    pub repo: Repository,
    pub path: PathBuf,
}

impl GitRepository {
    /// Opens the repository at exactly `path`. Unlike discovery this never
    /// walks up into parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let repo = Repository::open(&path).map_err(|e| {
            tracing::debug!(path = %path.display(), error = %e, "failed to open repository");
            AppError::not_found("repository not found")
        })?;

        Ok(Self { repo, path })
    }

    fn to_ref(&self, name: &str, reference: &Reference<'_>) -> Result<Option<Ref>> {
        let resolved = match reference.resolve() {
            Ok(r) => r,
            // unborn branch behind a symbolic ref
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let Some(oid) = resolved.target() else {
            return Ok(None);
        };
        let object = self.repo.find_object(oid, None)?;
        let Some(kind) = object.kind().and_then(object_kind) else {
            return Ok(None);
        };

        Ok(Some(Ref {
            name: name.to_string(),
            target: ObjectRef {
                sha: oid.to_string(),
                kind,
            },
        }))
    }
}

impl Backend for GitRepository {
    fn find_object(&self, sha: &str) -> Result<Option<Object>> {
        let object = match self.repo.find_object_by_prefix(sha, None) {
            Ok(object) => object,
            Err(e) if is_miss(&e) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let converted = match object.kind() {
            Some(ObjectType::Commit) => object.as_commit().map(|c| Object::Commit(to_commit(c))),
            Some(ObjectType::Tree) => object.as_tree().map(|t| Object::Tree(to_tree(t))),
            Some(ObjectType::Blob) => object.as_blob().map(|b| {
                Object::Blob(Blob {
                    sha: b.id().to_string(),
                    data: b.content().to_vec(),
                })
            }),
            Some(ObjectType::Tag) => object.as_tag().map(|t| Object::Tag(to_tag(t))),
            _ => None,
        };
        Ok(converted)
    }

    fn object_size(&self, sha: &str) -> Result<Option<u64>> {
        let Ok(oid) = Oid::from_str(sha) else {
            return Ok(None);
        };
        match self.repo.odb()?.read_header(oid) {
            Ok((size, _)) => Ok(Some(size as u64)),
            Err(e) if is_miss(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn find_reference(&self, name: &str) -> Result<Option<Ref>> {
        match self.repo.find_reference(name) {
            Ok(reference) => self.to_ref(name, &reference),
            Err(e) if is_miss(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn references(&self) -> Result<Vec<Ref>> {
        let mut refs = Vec::new();
        for reference in self.repo.references()? {
            let reference = reference?;
            if reference.kind() == Some(ReferenceType::Symbolic) {
                continue;
            }
            let Some(name) = reference.name() else {
                continue;
            };
            let name = name.to_string();
            if let Some(r) = self.to_ref(&name, &reference)? {
                refs.push(r);
            }
        }
        refs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(refs)
    }

    fn merge_base(&self, left: &str, right: &str) -> Result<Option<String>> {
        let left = Oid::from_str(left)?;
        let right = Oid::from_str(right)?;
        match self.repo.merge_base(left, right) {
            Ok(oid) => Ok(Some(oid.to_string())),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn walk(&self, start: &str, sorting: Sorting, hidden: &[String]) -> Result<CommitWalk<'_>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(match sorting {
            Sorting::Unsorted => Sort::NONE,
            Sorting::Time => Sort::TIME,
            Sorting::ReverseTopological => Sort::TOPOLOGICAL | Sort::REVERSE,
            Sorting::ReverseTime => Sort::TIME | Sort::REVERSE,
        })?;
        revwalk.push(Oid::from_str(start)?)?;
        for sha in hidden {
            revwalk.hide(Oid::from_str(sha)?)?;
        }

        Ok(Box::new(revwalk.map(|oid| {
            oid.map(|oid| oid.to_string()).map_err(AppError::from)
        })))
    }

    fn diff_trees(&self, old_tree: Option<&str>, new_tree: &str, context_lines: u32) -> Result<RawDiff> {
        let new_tree = self.repo.find_tree(Oid::from_str(new_tree)?)?;
        let old_tree = match old_tree {
            Some(sha) => Some(self.repo.find_tree(Oid::from_str(sha)?)?),
            None => None,
        };

        let mut opts = DiffOptions::new();
        opts.context_lines(context_lines);

        let mut diff = self
            .repo
            .diff_tree_to_tree(old_tree.as_ref(), Some(&new_tree), Some(&mut opts))?;
        if old_tree.is_some() {
            diff.find_similar(None)?;
        }

        let mut files = Vec::new();
        for (delta_idx, delta) in diff.deltas().enumerate() {
            let status = match delta.status() {
                Delta::Added | Delta::Copied => ChangeStatus::Added,
                Delta::Deleted => ChangeStatus::Removed,
                Delta::Renamed => ChangeStatus::Renamed,
                _ => ChangeStatus::Modified,
            };

            let (additions, deletions) = match git2::Patch::from_diff(&diff, delta_idx)? {
                Some(patch) => {
                    let (_, additions, deletions) = patch.line_stats()?;
                    (additions, deletions)
                }
                None => (0, 0),
            };

            files.push(FilePatch {
                status,
                old_path: delta_path(delta.old_file().path()),
                new_path: delta_path(delta.new_file().path()),
                old_sha: delta.old_file().id().to_string(),
                new_sha: delta.new_file().id().to_string(),
                additions,
                deletions,
            });
        }

        let mut patch = String::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            if matches!(line.origin(), '+' | '-' | ' ') {
                patch.push(line.origin());
            }
            patch.push_str(&String::from_utf8_lossy(line.content()));
            true
        })?;

        Ok(RawDiff { files, patch })
    }

    fn blame(&self, request: &BlameRequest<'_>) -> Result<Vec<BlameHunk>> {
        let mut opts = BlameOptions::new();
        opts.track_copies_same_commit_moves(true)
            .track_copies_same_commit_copies(true)
            .newest_commit(Oid::from_str(request.newest)?);
        if let Some(oldest) = request.oldest {
            opts.oldest_commit(Oid::from_str(oldest)?);
        }
        if request.first_line > 1 {
            opts.min_line(request.first_line);
        }
        if let Some(last) = request.last_line {
            opts.max_line(last);
        }

        let blame = match self.repo.blame_file(Path::new(request.path), Some(&mut opts)) {
            Ok(blame) => blame,
            Err(e) if e.code() == ErrorCode::NotFound => {
                return Err(AppError::not_found(e.message().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(blame
            .iter()
            .map(|hunk| BlameHunk {
                commit_sha: hunk.final_commit_id().to_string(),
                orig_path: hunk
                    .path()
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or_else(|| request.path.to_string()),
                start_line: hunk.final_start_line(),
                line_count: hunk.lines_in_hunk(),
            })
            .collect())
    }

    fn description(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(self.repo.path().join("description")) {
            Ok(text) if text == DEFAULT_DESCRIPTION => Ok(None),
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn is_miss(e: &git2::Error) -> bool {
    matches!(
        e.code(),
        ErrorCode::NotFound | ErrorCode::Ambiguous | ErrorCode::InvalidSpec
    )
}

fn delta_path(path: Option<&Path>) -> String {
    path.map(|p| p.to_string_lossy().into_owned()).unwrap_or_default()
}

fn object_kind(kind: ObjectType) -> Option<ObjectKind> {
    match kind {
        ObjectType::Commit => Some(ObjectKind::Commit),
        ObjectType::Tree => Some(ObjectKind::Tree),
        ObjectType::Blob => Some(ObjectKind::Blob),
        ObjectType::Tag => Some(ObjectKind::Tag),
        _ => None,
    }
}

fn to_signature(sig: &git2::Signature<'_>) -> Signature {
    Signature {
        name: String::from_utf8_lossy(sig.name_bytes()).into_owned(),
        email: String::from_utf8_lossy(sig.email_bytes()).into_owned(),
        time: sig.when().seconds(),
        offset_minutes: sig.when().offset_minutes(),
    }
}

fn to_commit(commit: &git2::Commit<'_>) -> Commit {
    Commit {
        sha: commit.id().to_string(),
        author: to_signature(&commit.author()),
        committer: to_signature(&commit.committer()),
        message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
        tree_sha: commit.tree_id().to_string(),
        parent_shas: commit.parent_ids().map(|id| id.to_string()).collect(),
    }
}

fn to_tree(tree: &git2::Tree<'_>) -> Tree {
    let entries = tree
        .iter()
        .map(|entry| {
            let mode = entry.filemode();
            let kind = match entry.kind() {
                _ if mode == SUBMODULE_MODE => EntryKind::Submodule,
                Some(ObjectType::Tree) => EntryKind::Tree,
                Some(ObjectType::Commit) => EntryKind::Submodule,
                _ => EntryKind::Blob,
            };
            TreeEntry {
                name: String::from_utf8_lossy(entry.name_bytes()).into_owned(),
                sha: entry.id().to_string(),
                mode,
                kind,
            }
        })
        .collect();

    Tree {
        sha: tree.id().to_string(),
        entries,
    }
}

fn to_tag(tag: &git2::Tag<'_>) -> Tag {
    let target_kind = tag
        .target_type()
        .and_then(object_kind)
        .unwrap_or(ObjectKind::Commit);

    Tag {
        sha: tag.id().to_string(),
        name: String::from_utf8_lossy(tag.name_bytes()).into_owned(),
        tagger: tag.tagger().map(|sig| to_signature(&sig)),
        message: tag
            .message_bytes()
            .map(|m| String::from_utf8_lossy(m).into_owned())
            .unwrap_or_default(),
        target: ObjectRef {
            sha: tag.target_id().to_string(),
            kind: target_kind,
        },
    }
}
