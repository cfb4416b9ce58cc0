use crate::error::{AppError, Result};
use crate::git::backend::{Backend, EntryKind, Object, Tree};

/// One row of a flattened tree listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatEntry {
    /// Path relative to the flattened tree, `/`-separated.
    pub path: String,
    pub sha: String,
    pub mode: i32,
    pub kind: EntryKind,
    /// Blob size in bytes; `None` for trees and submodules.
    pub size: Option<u64>,
}

impl FlatEntry {
    pub fn depth(&self) -> usize {
        self.path.matches('/').count() + 1
    }
}

/// Renders a git file mode the way tree listings show it: six octal digits,
/// zero padded (`100644`, `040000`).
pub fn format_mode(mode: i32) -> String {
    format!("{:06o}", mode)
}

/// Lists the entries of `tree`, descending into sub-trees when `recursive`.
///
/// The result is sorted once by full path, so with `recursive` set the
/// entries of different directories interleave by name.
pub fn flatten(backend: &dyn Backend, tree: &Tree, recursive: bool) -> Result<Vec<FlatEntry>> {
    let mut flat = Vec::new();
    let mut pending: Vec<(String, Tree)> = vec![(String::new(), tree.clone())];

    while let Some((prefix, current)) = pending.pop() {
        for entry in current.entries {
            let path = format!("{}{}", prefix, entry.name);

            let size = match entry.kind {
                EntryKind::Blob => Some(
                    backend
                        .object_size(&entry.sha)?
                        .ok_or_else(|| missing_entry(&entry.sha))?,
                ),
                EntryKind::Tree => {
                    if recursive {
                        match backend.find_object(&entry.sha)? {
                            Some(Object::Tree(subtree)) => pending.push((format!("{}/", path), subtree)),
                            _ => return Err(missing_entry(&entry.sha)),
                        }
                    }
                    None
                }
                EntryKind::Submodule => None,
            };

            flat.push(FlatEntry {
                path,
                sha: entry.sha,
                mode: entry.mode,
                kind: entry.kind,
                size,
            });
        }
    }

    flat.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(flat)
}

fn missing_entry(sha: &str) -> AppError {
    AppError::Internal(format!("missing tree entry object {}", sha))
}
