//! Line attribution for a file at a commit.
//!
//! Attribution itself comes from the backend; this module validates the
//! requested line range against the file, pairs every line with the hunk that
//! covers it and collects the distinct commits involved.

use std::collections::BTreeMap;

use crate::error::{AppError, Result};
use crate::git::backend::{Backend, BlameRequest, Commit, Object};
use crate::git::resolve;

/// A 1-based, inclusive line range. `last` of `None` means end of file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub first: usize,
    pub last: Option<usize>,
}

impl Default for LineRange {
    fn default() -> Self {
        LineRange { first: 1, last: None }
    }
}

impl LineRange {
    /// Parses the `firstLine` / `lastLine` query values.
    pub fn parse(first: Option<&str>, last: Option<&str>) -> Result<Self> {
        let first = match first {
            Some(raw) => {
                let value: i64 = raw
                    .parse()
                    .map_err(|_| AppError::bad_request("firstLine was not a valid integer"))?;
                if value < 1 {
                    return Err(AppError::bad_request("firstLine must be positive"));
                }
                value as usize
            }
            None => 1,
        };

        let last = match last {
            Some(raw) => {
                let value: i64 = raw
                    .parse()
                    .map_err(|_| AppError::bad_request("lastLine was not a valid integer"))?;
                if value < 1 {
                    return Err(AppError::bad_request("lastLine must be positive"));
                }
                Some(value as usize)
            }
            None => None,
        };

        if let Some(last) = last {
            if first > last {
                return Err(AppError::bad_request("firstLine cannot be greater than lastLine"));
            }
        }

        Ok(LineRange { first, last })
    }

    fn check_bounds(&self, line_count: usize) -> Result<()> {
        if self.first > line_count {
            return Err(AppError::bad_request("firstLine out of bounds"));
        }
        if self.last.is_some_and(|last| last > line_count) {
            return Err(AppError::bad_request("lastLine out of bounds"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlamedLine {
    pub line_number: usize,
    pub text: String,
    pub commit_sha: String,
    /// Path of the file in the attributed commit; differs from the requested
    /// path when the line arrived through a rename or move.
    pub original_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlameResult {
    pub lines: Vec<BlamedLine>,
    /// Exactly the commits referenced by `lines`.
    pub commits: BTreeMap<String, Commit>,
}

/// Blames `path` as of `newest`, optionally stopping the walk at the commit
/// `oldest_refspec` resolves to.
pub fn blame_file(
    backend: &dyn Backend,
    path: &str,
    newest: &Commit,
    oldest_refspec: Option<&str>,
    range: LineRange,
) -> Result<BlameResult> {
    let tree = resolve::tree_by_sha(backend, &newest.tree_sha)?;
    let blob = match resolve::object_at_path(backend, tree, path)? {
        Object::Blob(blob) => blob,
        _ => return Err(AppError::bad_request("path resolved to non-blob object")),
    };

    let text = String::from_utf8_lossy(&blob.data);
    let raw_lines: Vec<&str> = text.lines().collect();
    range.check_bounds(raw_lines.len())?;
    let last = range.last.unwrap_or(raw_lines.len());

    let oldest = oldest_refspec
        .map(|refspec| resolve::commit_for_refspec(backend, refspec))
        .transpose()?;

    let hunks = backend.blame(&BlameRequest {
        path,
        newest: &newest.sha,
        oldest: oldest.as_ref().map(|c| c.sha.as_str()),
        first_line: range.first,
        last_line: range.last,
    })?;

    let mut lines = Vec::with_capacity(last + 1 - range.first);
    let mut commits = BTreeMap::new();

    for (offset, text) in raw_lines[range.first - 1..last].iter().enumerate() {
        let line_number = range.first + offset;
        let hunk = hunks
            .iter()
            .find(|hunk| hunk.covers(line_number))
            .ok_or_else(|| AppError::Internal(format!("no blame information for line {line_number}")))?;

        if !commits.contains_key(&hunk.commit_sha) {
            let commit = resolve::commit_by_sha(backend, &hunk.commit_sha)?;
            commits.insert(hunk.commit_sha.clone(), commit);
        }

        lines.push(BlamedLine {
            line_number,
            text: (*text).to_string(),
            commit_sha: hunk.commit_sha.clone(),
            original_path: hunk.orig_path.clone(),
        });
    }

    Ok(BlameResult { lines, commits })
}
