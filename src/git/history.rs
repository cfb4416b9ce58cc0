//! History queries: commit listing, merge bases, merged branches, commits
//! unique to a branch and the contributor leaderboard.

use std::collections::{BTreeSet, HashMap};

use crate::error::Result;
use crate::git::backend::{Backend, Commit, Ref, Sorting};
use crate::git::resolve;

/// Order of the commits returned by [`unique_commits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOrder {
    /// Parents before children.
    Topological,
    /// Oldest commit time first.
    Chronological,
}

impl CommitOrder {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "topological" => Some(CommitOrder::Topological),
            "chronological" => Some(CommitOrder::Chronological),
            _ => None,
        }
    }

    fn sorting(self) -> Sorting {
        match self {
            CommitOrder::Topological => Sorting::ReverseTopological,
            CommitOrder::Chronological => Sorting::ReverseTime,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contributor {
    pub name: String,
    pub email: String,
    pub contributions: usize,
}

/// Up to `limit` commits reachable from `start`, newest first.
pub fn list_commits(backend: &dyn Backend, start: &str, limit: usize) -> Result<Vec<Commit>> {
    backend
        .walk(start, Sorting::Time, &[])?
        .take(limit)
        .map(|sha| resolve::commit_by_sha(backend, &sha?))
        .collect()
}

pub fn merge_base_commit(backend: &dyn Backend, left: &Commit, right: &Commit) -> Result<Option<Commit>> {
    match backend.merge_base(&left.sha, &right.sha)? {
        Some(sha) => Ok(Some(resolve::commit_by_sha(backend, &sha)?)),
        None => Ok(None),
    }
}

/// Commits reachable from `branch` but from no other ref.
///
/// Each other ref contributes its merge base with the branch tip; those bases
/// and everything behind them are hidden from the walk.
pub fn unique_commits(backend: &dyn Backend, branch: &Ref, order: CommitOrder) -> Result<Vec<Commit>> {
    let mut hidden = BTreeSet::new();
    for other in backend.references()? {
        if other.name == branch.name {
            continue;
        }
        let Some(other_tip) = tip(backend, &other)? else {
            continue;
        };
        if let Some(base) = backend.merge_base(&branch.target.sha, &other_tip)? {
            hidden.insert(base);
        }
    }
    let hidden: Vec<String> = hidden.into_iter().collect();

    backend
        .walk(&branch.target.sha, order.sorting(), &hidden)?
        .map(|sha| resolve::commit_by_sha(backend, &sha?))
        .collect()
}

/// Local branches other than `branch` whose tip is already contained in it.
pub fn merged_branches(backend: &dyn Backend, branch: &Ref) -> Result<Vec<Ref>> {
    let mut merged = Vec::new();
    for other in backend.references()? {
        if !other.name.starts_with("refs/heads/") || other.name == branch.name {
            continue;
        }
        let Some(other_tip) = tip(backend, &other)? else {
            continue;
        };
        if backend.merge_base(&branch.target.sha, &other_tip)?.as_deref() == Some(other_tip.as_str()) {
            merged.push(other);
        }
    }
    Ok(merged)
}

/// Commit a ref ultimately points at; refs to trees or blobs have none.
fn tip(backend: &dyn Backend, reference: &Ref) -> Result<Option<String>> {
    Ok(resolve::peel_to_commit(backend, &reference.target)?.map(|commit| commit.sha))
}

/// Authors of every commit reachable from HEAD, most prolific first.
///
/// Authors are grouped by email; the first name seen for an email is kept.
pub fn contributors(backend: &dyn Backend) -> Result<Vec<Contributor>> {
    let Some(head) = backend.find_reference("HEAD")? else {
        return Ok(Vec::new());
    };

    let mut order: Vec<String> = Vec::new();
    let mut by_email: HashMap<String, Contributor> = HashMap::new();

    for sha in backend.walk(&head.target.sha, Sorting::Unsorted, &[])? {
        let commit = resolve::commit_by_sha(backend, &sha?)?;
        let author = commit.author;
        by_email
            .entry(author.email.clone())
            .and_modify(|c| c.contributions += 1)
            .or_insert_with(|| {
                order.push(author.email.clone());
                Contributor {
                    name: author.name,
                    email: author.email,
                    contributions: 1,
                }
            });
    }

    let mut leaderboard: Vec<Contributor> = order
        .into_iter()
        .filter_map(|email| by_email.remove(&email))
        .collect();
    // stable, so ties keep first-seen order
    leaderboard.sort_by(|a, b| b.contributions.cmp(&a.contributions));
    Ok(leaderboard)
}
