//! Convenience resources: repositories, branches, tags, porcelain commits,
//! blame and contents.

use crate::git::backend::{ChangeStatus, Commit, Object, Ref, Tag};
use crate::git::blame::BlameResult;
use crate::git::diff::{Diff, FileChange};
use crate::git::history::Contributor;
use crate::git::sandbox::RepoKey;
use crate::models::{
    BlameLineResource, BlameResource, BranchDetail, BranchSummary, CommitStats, ContentKind,
    ContentLinks, ContentsEntry, ContributorResource, FileResource, FileStatus, Link,
    PorcelainCommit, RepoResource, SelfLink, TagDetail, TagSummary,
};

use super::plumbing::{CommitLinks, convert_commit, convert_tag, encode_blob_data};
use super::Urls;

pub fn convert_repo(urls: &Urls, key: &RepoKey, description: Option<String>) -> RepoResource {
    RepoResource {
        name: key.to_string(),
        full_name: key.to_string(),
        description,
        url: urls.repo(),
        branches_url: urls.template("branches", "branch"),
        blobs_url: urls.template("git/blobs", "sha"),
        commits_url: urls.template("commits", "sha"),
        git_commits_url: urls.template("git/commits", "sha"),
        git_refs_url: urls.template("git/refs", "sha"),
        git_tags_url: urls.template("git/tags", "sha"),
        tags_url: urls.tags(),
        trees_url: urls.template("git/trees", "sha"),
    }
}

pub fn convert_branch_summary(urls: &Urls, branch: &Ref) -> BranchSummary {
    BranchSummary {
        name: branch.shorthand().to_string(),
        commit: Link {
            sha: branch.target.sha.clone(),
            url: urls.commit(&branch.target.sha),
        },
    }
}

/// `tip` is the commit the branch points at.
pub fn convert_branch(urls: &Urls, name: &str, tip: &Commit) -> BranchDetail {
    let url = urls.branch(name);
    BranchDetail {
        name: name.to_string(),
        commit: convert_porcelain_commit(urls, tip, None),
        links: SelfLink { self_url: url.clone() },
        url,
    }
}

pub fn convert_tag_summary(urls: &Urls, name: &str, commit_sha: &str) -> TagSummary {
    TagSummary {
        name: name.to_string(),
        commit: Link {
            sha: commit_sha.to_string(),
            url: urls.commit(commit_sha),
        },
        url: urls.named_tag(name),
    }
}

/// `annotated` is the tag object for annotated tags, `None` for lightweight
/// ones.
pub fn convert_tag_detail(urls: &Urls, name: &str, commit: &Commit, annotated: Option<&Tag>) -> TagDetail {
    TagDetail {
        name: name.to_string(),
        commit: convert_porcelain_commit(urls, commit, None),
        url: urls.named_tag(name),
        tag: annotated.map(|tag| convert_tag(urls, tag)),
    }
}

/// Porcelain commit; `diff` (against the first parent) adds `stats` and
/// `files`.
pub fn convert_porcelain_commit(urls: &Urls, commit: &Commit, diff: Option<&Diff>) -> PorcelainCommit {
    let plain = convert_commit(urls, commit, CommitLinks::Porcelain);

    let (stats, files) = match diff {
        Some(diff) => (
            Some(CommitStats {
                additions: diff.additions,
                deletions: diff.deletions,
                total: diff.total(),
            }),
            Some(
                diff.files
                    .iter()
                    .map(|change| convert_file_change(urls, commit, change))
                    .collect(),
            ),
        ),
        None => (None, None),
    };

    PorcelainCommit {
        sha: plain.sha.clone(),
        url: urls.commit(&commit.sha),
        author: plain.author.clone(),
        committer: plain.committer.clone(),
        parents: commit
            .parent_shas
            .iter()
            .map(|sha| Link {
                sha: sha.clone(),
                url: urls.commit(sha),
            })
            .collect(),
        commit: plain,
        stats,
        files,
    }
}

pub fn convert_file_change(urls: &Urls, commit: &Commit, change: &FileChange) -> FileResource {
    let removed = change.status == ChangeStatus::Removed;
    // a removed file only exists in the parent
    let at = if removed {
        commit.first_parent().unwrap_or(commit.sha.as_str())
    } else {
        commit.sha.as_str()
    };

    FileResource {
        sha: if removed { change.old_sha.clone() } else { change.new_sha.clone() },
        status: match change.status {
            ChangeStatus::Added => FileStatus::Added,
            ChangeStatus::Modified => FileStatus::Modified,
            ChangeStatus::Removed => FileStatus::Removed,
            ChangeStatus::Renamed => FileStatus::Renamed,
        },
        filename: change.new_path.clone(),
        old_filename: change.old_path.clone(),
        additions: change.additions,
        deletions: change.deletions,
        changes: change.additions + change.deletions,
        raw_url: urls.raw(at, &change.new_path),
        contents_url: urls.contents(&change.new_path, at),
        patch: change.patch.clone(),
    }
}

pub fn convert_blame(urls: &Urls, blame: &BlameResult) -> BlameResource {
    BlameResource {
        lines: blame
            .lines
            .iter()
            .map(|line| BlameLineResource {
                commit: line.commit_sha.clone(),
                orig_path: line.original_path.clone(),
                line_num: line.line_number,
                line: line.text.clone(),
            })
            .collect(),
        commits: blame
            .commits
            .iter()
            .map(|(sha, commit)| (sha.clone(), convert_commit(urls, commit, CommitLinks::Plumbing)))
            .collect(),
    }
}

/// One contents record. Content is embedded only when `with_content` is set
/// and `object` is a blob; commits and tags have no contents form.
pub fn convert_contents_entry(
    urls: &Urls,
    refspec: &str,
    path: &str,
    object: &Object,
    with_content: bool,
) -> Option<ContentsEntry> {
    let (kind, size, git_url) = match object {
        Object::Blob(blob) => (ContentKind::File, blob.size(), urls.blob(&blob.sha)),
        Object::Tree(tree) => (ContentKind::Dir, 0, urls.tree(&tree.sha)),
        Object::Commit(_) | Object::Tag(_) => return None,
    };

    let (encoding, content) = match object {
        Object::Blob(blob) if with_content => {
            let (encoding, content) = encode_blob_data(&blob.data);
            (Some(encoding), Some(content))
        }
        _ => (None, None),
    };

    let url = urls.contents(path, refspec);
    Some(ContentsEntry {
        kind,
        sha: object.sha().to_string(),
        name: base_name(path).to_string(),
        path: path.to_string(),
        size,
        links: ContentLinks {
            self_url: url.clone(),
            git: git_url.clone(),
        },
        url,
        git_url,
        encoding,
        content,
    })
}

pub fn convert_contributor(contributor: &Contributor) -> ContributorResource {
    ContributorResource {
        email: contributor.email.clone(),
        name: contributor.name.clone(),
        contributions: contributor.contributions,
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
