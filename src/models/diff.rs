//! Change records attached to porcelain commits.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStats {
    pub additions: usize,
    pub deletions: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResource {
    /// Blob of the new side; the old side for removed files.
    pub sha: String,
    pub status: FileStatus,
    pub filename: String,
    pub old_filename: String,
    pub additions: usize,
    pub deletions: usize,
    pub changes: usize,
    pub raw_url: String,
    pub contents_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
}
