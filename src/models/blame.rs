use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::PlumbingCommit;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlameLineResource {
    pub commit: String,
    pub orig_path: String,
    pub line_num: usize,
    pub line: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlameResource {
    pub lines: Vec<BlameLineResource>,
    pub commits: BTreeMap<String, PlumbingCommit>,
}
