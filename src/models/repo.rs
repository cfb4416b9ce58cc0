use serde::{Deserialize, Serialize};

use super::{Link, PorcelainCommit, TagResource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoResource {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub url: String,
    pub branches_url: String,
    pub blobs_url: String,
    pub commits_url: String,
    pub git_commits_url: String,
    pub git_refs_url: String,
    pub git_tags_url: String,
    pub tags_url: String,
    pub trees_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfLink {
    #[serde(rename = "self")]
    pub self_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSummary {
    pub name: String,
    pub commit: Link,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchDetail {
    pub name: String,
    pub commit: PorcelainCommit,
    pub url: String,
    #[serde(rename = "_links")]
    pub links: SelfLink,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSummary {
    pub name: String,
    pub commit: Link,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagDetail {
    pub name: String,
    pub commit: PorcelainCommit,
    pub url: String,
    /// Present for annotated tags only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<TagResource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorResource {
    pub email: String,
    pub name: String,
    pub contributions: usize,
}
