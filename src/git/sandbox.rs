//! Repository keys and the base-directory sandbox.
//!
//! A repository key is a path relative to the configured base directory, such
//! as `team/project.git`. In URLs the key occupies one path segment, so `/`
//! travels as `;` and a literal `;` as `;;`.

use serde::Deserialize;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::error::{AppError, Result};
use crate::git::repository::GitRepository;

/// How deep below the base directory repositories are searched for.
const DISCOVERY_DEPTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub struct RepoKey(String);

impl RepoKey {
    pub fn new(key: impl Into<String>) -> Self {
        RepoKey(key.into())
    }

    /// Decodes the URL segment form of a key.
    pub fn decode(segment: &str) -> Self {
        let mut key = String::with_capacity(segment.len());
        let mut chars = segment.chars().peekable();
        while let Some(c) = chars.next() {
            if c == ';' {
                if chars.peek() == Some(&';') {
                    chars.next();
                    key.push(';');
                } else {
                    key.push('/');
                }
            } else {
                key.push(c);
            }
        }
        RepoKey(key)
    }

    /// Encodes the key as a single URL path segment.
    pub fn encode(&self) -> String {
        self.0.replace(';', ";;").replace('/', ";")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RepoKey {
    fn from(segment: String) -> Self {
        RepoKey::decode(&segment)
    }
}

impl fmt::Display for RepoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Joins `key` onto `base`, refusing anything that could leave `base`.
pub fn safe_join(base: &Path, key: &str) -> Option<PathBuf> {
    let relative = Path::new(key);
    if key.is_empty() || relative.has_root() {
        return None;
    }

    let mut joined = base.to_path_buf();
    for component in relative.components() {
        match component {
            Component::Normal(part) => joined.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(joined)
}

/// Opens the repository named by `key` inside `base`.
pub fn open(base: &Path, key: &RepoKey) -> Result<GitRepository> {
    let path = safe_join(base, key.as_str()).ok_or_else(|| {
        tracing::debug!(key = %key, "rejected repository key outside the base directory");
        AppError::not_found("repository not found")
    })?;
    GitRepository::open(path)
}

/// Lists the keys of all repositories found below `base`, sorted.
pub fn list_repositories(base: &Path) -> Result<Vec<RepoKey>> {
    let mut found = Vec::new();
    detect_repos(base, DISCOVERY_DEPTH, &mut found)?;

    let mut keys: Vec<String> = found
        .iter()
        .filter_map(|path| path.strip_prefix(base).ok())
        .filter(|relative| !relative.as_os_str().is_empty())
        .map(|relative| relative.to_string_lossy().replace('\\', "/"))
        .collect();
    keys.sort();
    keys.dedup();

    Ok(keys.into_iter().map(RepoKey::new).collect())
}

fn detect_repos(dir: &Path, depth: usize, found: &mut Vec<PathBuf>) -> Result<()> {
    let mut subdirs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name == ".git" {
            // a working copy; nothing below it is interesting
            found.push(dir.to_path_buf());
            return Ok(());
        }
        if name.ends_with(".git") {
            found.push(entry.path());
            continue;
        }
        subdirs.push(entry.path());
    }

    if depth > 1 {
        for subdir in subdirs {
            detect_repos(&subdir, depth - 1, found)?;
        }
    }
    Ok(())
}
