use serde::{Deserialize, Serialize};

use super::BlobEncoding;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    File,
    Dir,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentLinks {
    #[serde(rename = "self")]
    pub self_url: String,
    pub git: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentsEntry {
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub sha: String,
    pub name: String,
    pub path: String,
    /// Zero for directories.
    pub size: u64,
    pub url: String,
    pub git_url: String,
    #[serde(rename = "_links")]
    pub links: ContentLinks,
    /// Only set on a requested file, not on directory listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<BlobEncoding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// A file yields one entry, a directory the list of its children.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Contents {
    File(ContentsEntry),
    Dir(Vec<ContentsEntry>),
}
