use serde::{Deserialize, Serialize};

use super::Person;

/// `{type, sha, url}` pointer to an object of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectLink {
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefResource {
    pub url: String,
    #[serde(rename = "ref")]
    pub name: String,
    pub object: ObjectLink,
}

/// A ref listing collapses to the single ref when the path names it exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefListing {
    One(RefResource),
    Many(Vec<RefResource>),
}

/// Annotated tag object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagResource {
    pub url: String,
    pub sha: String,
    pub tag: String,
    pub tagger: Option<Person>,
    pub message: String,
    pub object: ObjectLink,
}
