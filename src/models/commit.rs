use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CommitStats, FileResource};

/// `{sha, url}` pointer to another resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub sha: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub email: String,
    pub date: DateTime<Utc>,
}

/// Commit as stored in the object graph (`/git/commits/<sha>/`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlumbingCommit {
    pub sha: String,
    pub url: String,
    pub author: Person,
    pub committer: Person,
    pub message: String,
    pub tree: Link,
    pub parents: Vec<Link>,
}

/// Convenience view of a commit (`/commits/<refspec>/`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PorcelainCommit {
    pub commit: PlumbingCommit,
    pub sha: String,
    pub url: String,
    pub author: Person,
    pub committer: Person,
    pub parents: Vec<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<CommitStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileResource>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniqueCommitsResponse {
    pub commits: Vec<PorcelainCommit>,
}
