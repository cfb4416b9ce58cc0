//! Object resolution: SHAs, refspecs, refs and paths.
//!
//! Every failure a client can cause surfaces as `AppError::NotFound`; the
//! traversal modules built on top propagate these unchanged.

use crate::error::{AppError, Result};
use crate::git::backend::{Backend, Blob, Commit, Object, ObjectKind, ObjectRef, Ref, Tag, Tree};

const MAX_SHA_LEN: usize = 40;

/// Maximum depth of tag-to-tag chains followed while peeling.
const MAX_PEEL_DEPTH: usize = 32;

/// True for 1–40 hexadecimal characters, the accepted form of SHA path
/// segments.
pub fn is_valid_sha(sha: &str) -> bool {
    !sha.is_empty() && sha.len() <= MAX_SHA_LEN && sha.bytes().all(|b| b.is_ascii_hexdigit())
}

fn find(backend: &dyn Backend, sha: &str) -> Result<Option<Object>> {
    if !is_valid_sha(sha) {
        return Ok(None);
    }
    backend.find_object(sha)
}

/// Looks up `sha` and insists that it names an object of `expected` kind.
pub fn resolve_by_sha(backend: &dyn Backend, sha: &str, expected: ObjectKind) -> Result<Object> {
    let mismatch = format!("object not a {}", expected.as_str());
    resolve_checked(backend, sha, expected, &mismatch)
}

fn resolve_checked(backend: &dyn Backend, sha: &str, expected: ObjectKind, mismatch: &str) -> Result<Object> {
    let name = expected.as_str();
    let object = find(backend, sha)?.ok_or_else(|| AppError::not_found(format!("{name} not found")))?;
    if object.kind() != expected {
        return Err(AppError::not_found(mismatch));
    }
    Ok(object)
}

pub fn commit_by_sha(backend: &dyn Backend, sha: &str) -> Result<Commit> {
    match resolve_by_sha(backend, sha, ObjectKind::Commit)? {
        Object::Commit(commit) => Ok(commit),
        _ => Err(AppError::not_found("object not a commit")),
    }
}

pub fn blob_by_sha(backend: &dyn Backend, sha: &str) -> Result<Blob> {
    const MISMATCH: &str = "sha not a blob";
    match resolve_checked(backend, sha, ObjectKind::Blob, MISMATCH)? {
        Object::Blob(blob) => Ok(blob),
        _ => Err(AppError::not_found(MISMATCH)),
    }
}

pub fn tag_by_sha(backend: &dyn Backend, sha: &str) -> Result<Tag> {
    match resolve_by_sha(backend, sha, ObjectKind::Tag)? {
        Object::Tag(tag) => Ok(tag),
        _ => Err(AppError::not_found("object not a tag")),
    }
}

/// Looks up a tree, peeling commits and (chains of) tags down to their tree.
pub fn tree_by_sha(backend: &dyn Backend, sha: &str) -> Result<Tree> {
    let mut object = find(backend, sha)?.ok_or_else(|| AppError::not_found("tree not found"))?;
    for _ in 0..MAX_PEEL_DEPTH {
        object = match object {
            Object::Tree(tree) => return Ok(tree),
            Object::Commit(commit) => expect_object(backend, &commit.tree_sha)?,
            Object::Tag(tag) => expect_object(backend, &tag.target.sha)?,
            Object::Blob(_) => break,
        };
    }
    Err(AppError::not_found("object not a tree, a commit or a tag"))
}

fn expect_object(backend: &dyn Backend, sha: &str) -> Result<Object> {
    backend
        .find_object(sha)?
        .ok_or_else(|| AppError::Internal(format!("dangling object reference {sha}")))
}

/// Follows `target` through any number of annotated tags to a commit.
pub fn peel_to_commit(backend: &dyn Backend, target: &ObjectRef) -> Result<Option<Commit>> {
    let mut object = match backend.find_object(&target.sha)? {
        Some(object) => object,
        None => return Ok(None),
    };
    for _ in 0..MAX_PEEL_DEPTH {
        object = match object {
            Object::Commit(commit) => return Ok(Some(commit)),
            Object::Tag(tag) => match backend.find_object(&tag.target.sha)? {
                Some(next) => next,
                None => return Ok(None),
            },
            Object::Tree(_) | Object::Blob(_) => return Ok(None),
        };
    }
    Ok(None)
}

/// One way of interpreting a refspec. Strategies are tried in
/// [`REFSPEC_PRECEDENCE`] order and the first hit wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefspecStrategy {
    Branch,
    Tag,
    Sha,
}

pub const REFSPEC_PRECEDENCE: [RefspecStrategy; 3] =
    [RefspecStrategy::Branch, RefspecStrategy::Tag, RefspecStrategy::Sha];

impl RefspecStrategy {
    pub fn try_resolve(self, backend: &dyn Backend, name: &str) -> Result<Option<Commit>> {
        match self {
            RefspecStrategy::Branch => match backend.find_reference(&format!("refs/heads/{name}"))? {
                Some(branch) => peel_to_commit(backend, &branch.target),
                None => Ok(None),
            },
            RefspecStrategy::Tag => match backend.find_reference(&format!("refs/tags/{name}"))? {
                Some(tag) => peel_to_commit(backend, &tag.target),
                None => Ok(None),
            },
            RefspecStrategy::Sha => match find(backend, name)? {
                Some(Object::Commit(commit)) => Ok(Some(commit)),
                Some(Object::Tag(tag)) => peel_to_commit(backend, &tag.target),
                _ => Ok(None),
            },
        }
    }
}

/// Resolves a branch name, tag name or commit SHA to a commit.
pub fn commit_for_refspec(backend: &dyn Backend, refspec: &str) -> Result<Commit> {
    if !refspec.is_empty() {
        for strategy in REFSPEC_PRECEDENCE {
            if let Some(commit) = strategy.try_resolve(backend, refspec)? {
                tracing::debug!(refspec, ?strategy, sha = %commit.sha, "resolved refspec");
                return Ok(commit);
            }
        }
    }
    Err(AppError::not_found("no such branch, tag, or commit SHA"))
}

/// Reference lookup with the short-name fallbacks clients expect:
/// `tags/v1` becomes `refs/tags/v1`, `main` becomes `refs/heads/main`.
pub fn lookup_ref(backend: &dyn Backend, name: &str) -> Result<Option<Ref>> {
    if let Some(found) = backend.find_reference(name)? {
        return Ok(Some(found));
    }
    let fallback = if name.contains('/') && !name.starts_with("refs/") {
        format!("refs/{name}")
    } else {
        format!("refs/heads/{name}")
    };
    backend.find_reference(&fallback)
}

pub fn branch(backend: &dyn Backend, name: &str) -> Result<Ref> {
    backend
        .find_reference(&format!("refs/heads/{name}"))?
        .ok_or_else(|| AppError::not_found("branch not found"))
}

/// Walks `path` down from `tree`. A trailing `/` is allowed; an empty path
/// yields the tree itself.
pub fn object_at_path(backend: &dyn Backend, tree: Tree, path: &str) -> Result<Object> {
    let segments: Vec<&str> = path.split('/').collect();
    let last = segments.len() - 1;

    let mut current = Object::Tree(tree);
    for (i, segment) in segments.into_iter().enumerate() {
        let Object::Tree(dir) = &current else {
            return Err(AppError::not_found(
                "invalid path; traversal unexpectedly encountered a non-tree",
            ));
        };
        if segment.is_empty() && i == last {
            continue;
        }
        let entry = dir
            .entries
            .iter()
            .find(|entry| entry.name == segment)
            .ok_or_else(|| AppError::not_found("invalid path; no such object"))?;
        current = backend
            .find_object(&entry.sha)?
            .ok_or_else(|| AppError::not_found("invalid path; no such object"))?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha_segment_validation() {
        assert!(is_valid_sha("a"));
        assert!(is_valid_sha("DEADbeef"));
        assert!(is_valid_sha(&"f".repeat(40)));
        assert!(!is_valid_sha(""));
        assert!(!is_valid_sha(&"f".repeat(41)));
        assert!(!is_valid_sha("xyz123"));
    }

    #[test]
    fn branch_wins_over_tag() {
        assert_eq!(REFSPEC_PRECEDENCE[0], RefspecStrategy::Branch);
        assert_eq!(REFSPEC_PRECEDENCE[2], RefspecStrategy::Sha);
    }
}
