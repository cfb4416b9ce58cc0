use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeResource {
    pub sha: String,
    pub url: String,
    pub tree: Vec<TreeEntryResource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntryResource {
    pub path: String,
    pub sha: String,
    /// `blob`, `tree` or `submodule`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Six octal digits, e.g. `100644`.
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlobEncoding {
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "base64")]
    Base64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobResource {
    pub sha: String,
    pub url: String,
    pub size: u64,
    pub encoding: BlobEncoding,
    pub content: String,
}
