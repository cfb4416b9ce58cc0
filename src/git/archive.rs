//! Zip and gzipped tar snapshots of a commit's tree.
//!
//! Archives are written to an anonymous temporary file which the caller
//! streams back and drops. Every entry lives below a wrapper directory named
//! `<repo key>-<commit sha>`.

use std::fs::File;
use std::io::{Seek, SeekFrom, Write};

use chrono::{DateTime, Datelike, Timelike, Utc};
use flate2::Compression;
use flate2::write::GzEncoder;
use tar::{EntryType, Header};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::config::ArchiveMtime;
use crate::error::{AppError, Result};
use crate::git::backend::{Backend, Commit, EntryKind, Object, SYMLINK_MODE, Tree, TreeEntry};
use crate::git::resolve;
use crate::git::sandbox::RepoKey;
use crate::git::tree::format_mode;

/// Entries at or above this size get zip64 extra fields.
const ZIP64_THRESHOLD: u64 = u32::MAX as u64;
const DIRECTORY_MODE: u32 = 0o755;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tarball,
}

impl ArchiveFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ArchiveFormat::Zip => ".zip",
            ArchiveFormat::Tarball => ".tar.gz",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "application/zip",
            ArchiveFormat::Tarball => "application/x-gzip",
        }
    }
}

/// Name of the directory every archive entry is placed under.
pub fn wrapper_dir(key: &RepoKey, commit_sha: &str) -> String {
    format!("{}-{}", key, commit_sha)
}

/// Download name offered to the client. Path separators from nested keys
/// and branch names become `-` so the name stays a single file name.
pub fn attachment_name(key: &RepoKey, refspec: &str, format: ArchiveFormat) -> String {
    format!("{}-{}{}", key, refspec, format.extension()).replace('/', "-")
}

/// A file or directory inside the archived tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path relative to the wrapper directory.
    pub path: String,
    pub mode: i32,
    /// File contents; `None` for directories.
    pub data: Option<Vec<u8>>,
}

/// Lazy pre-order walk over a tree. Submodules and symlinks are skipped.
pub struct TreeWalk<'a> {
    backend: &'a dyn Backend,
    pending: Vec<(String, TreeEntry)>,
}

impl<'a> TreeWalk<'a> {
    pub fn new(backend: &'a dyn Backend, tree: Tree) -> Self {
        let mut walk = TreeWalk {
            backend,
            pending: Vec::new(),
        };
        walk.push_children("", tree);
        walk
    }

    fn push_children(&mut self, prefix: &str, tree: Tree) {
        // reversed so that popping yields tree order
        for entry in tree.entries.into_iter().rev() {
            self.pending.push((format!("{}{}", prefix, entry.name), entry));
        }
    }
}

impl Iterator for TreeWalk<'_> {
    type Item = Result<ArchiveEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((path, entry)) = self.pending.pop() {
            if entry.kind == EntryKind::Submodule || entry.mode == SYMLINK_MODE {
                tracing::debug!(path, mode = %format_mode(entry.mode), "not archiving submodule or symlink");
                continue;
            }

            let object = match self.backend.find_object(&entry.sha) {
                Ok(Some(object)) => object,
                Ok(None) => {
                    return Some(Err(AppError::Internal(format!(
                        "missing object {} at {}",
                        entry.sha, path
                    ))));
                }
                Err(e) => return Some(Err(e)),
            };

            match object {
                Object::Blob(blob) => {
                    return Some(Ok(ArchiveEntry {
                        path,
                        mode: entry.mode,
                        data: Some(blob.data),
                    }));
                }
                Object::Tree(subtree) => {
                    self.push_children(&format!("{}/", path), subtree);
                    return Some(Ok(ArchiveEntry {
                        path,
                        mode: entry.mode,
                        data: None,
                    }));
                }
                Object::Commit(_) | Object::Tag(_) => {
                    tracing::debug!(path, sha = %entry.sha, "not archiving unexpected tree entry");
                }
            }
        }
        None
    }
}

/// Timestamp applied to every entry of an archive of `commit`.
pub fn archive_mtime(source: ArchiveMtime, commit: &Commit) -> u64 {
    let seconds = match source {
        ArchiveMtime::WallClock => Utc::now().timestamp(),
        ArchiveMtime::Commit => commit.committer.time,
    };
    seconds.max(0) as u64
}

/// Writes an archive of `commit` into a fresh temporary file and rewinds it.
pub fn build_archive(
    backend: &dyn Backend,
    key: &RepoKey,
    commit: &Commit,
    format: ArchiveFormat,
    mtime: u64,
) -> Result<File> {
    let tree = resolve::tree_by_sha(backend, &commit.tree_sha)?;
    let wrapper = wrapper_dir(key, &commit.sha);
    let walk = TreeWalk::new(backend, tree);

    // unlinked on creation; the handle is the only way back to the data
    let mut file = tempfile::tempfile()?;
    match format {
        ArchiveFormat::Zip => write_zip(&mut file, &wrapper, walk, mtime)?,
        ArchiveFormat::Tarball => write_tarball(&mut file, &wrapper, &commit.sha, walk, mtime)?,
    }
    file.seek(SeekFrom::Start(0))?;

    tracing::debug!(key = %key, sha = %commit.sha, ?format, "archive built");
    Ok(file)
}

fn write_zip<W: Write + Seek>(out: W, wrapper: &str, walk: TreeWalk<'_>, mtime: u64) -> Result<()> {
    let modified = zip_datetime(mtime);
    let mut zip = ZipWriter::new(out);

    for entry in walk {
        let entry = entry?;
        // directories stay implicit
        let Some(data) = entry.data else {
            continue;
        };

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions((entry.mode as u32) & 0o777)
            .last_modified_time(modified)
            .large_file(data.len() as u64 >= ZIP64_THRESHOLD);
        zip.start_file(format!("{}/{}", wrapper, entry.path), options)?;
        zip.write_all(&data)?;
    }

    zip.finish()?;
    Ok(())
}

fn zip_datetime(mtime: u64) -> zip::DateTime {
    let Some(when) = DateTime::<Utc>::from_timestamp(mtime as i64, 0) else {
        return zip::DateTime::default();
    };
    zip::DateTime::from_date_and_time(
        when.year().clamp(1980, 2107) as u16,
        when.month() as u8,
        when.day() as u8,
        when.hour() as u8,
        when.minute() as u8,
        when.second() as u8,
    )
    .unwrap_or_default()
}

fn write_tarball<W: Write>(
    out: W,
    wrapper: &str,
    commit_sha: &str,
    walk: TreeWalk<'_>,
    mtime: u64,
) -> Result<()> {
    let mut tar = tar::Builder::new(GzEncoder::new(out, Compression::default()));

    let comment = pax_record("comment", commit_sha);
    let mut header = Header::new_ustar();
    header.set_entry_type(EntryType::XGlobalHeader);
    header.set_mode(0o644);
    header.set_mtime(mtime);
    header.set_size(comment.len() as u64);
    tar.append_data(&mut header, "pax_global_header", comment.as_bytes())?;

    for entry in walk {
        let entry = entry?;
        let path = format!("{}/{}", wrapper, entry.path);

        let mut header = Header::new_gnu();
        header.set_mtime(mtime);
        match entry.data {
            Some(data) => {
                header.set_entry_type(EntryType::Regular);
                header.set_mode((entry.mode as u32) & 0o7777);
                header.set_size(data.len() as u64);
                tar.append_data(&mut header, &path, data.as_slice())?;
            }
            None => {
                // git keeps no directory permissions
                header.set_entry_type(EntryType::Directory);
                header.set_mode(DIRECTORY_MODE);
                header.set_size(0);
                tar.append_data(&mut header, format!("{}/", path), std::io::empty())?;
            }
        }
    }

    tar.into_inner()?.finish()?;
    Ok(())
}

/// One pax extended header record: `"<len> <key>=<value>\n"`, where `len`
/// counts the whole record including its own digits.
fn pax_record(key: &str, value: &str) -> String {
    let body = key.len() + value.len() + 3;
    let mut len = body;
    loop {
        let candidate = body + len.to_string().len();
        if candidate == len {
            break;
        }
        len = candidate;
    }
    format!("{} {}={}\n", len, key, value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pax_record_length_includes_itself() {
        let record = pax_record("comment", &"a".repeat(40));
        let (len, _) = record.split_once(' ').unwrap();
        assert_eq!(len.parse::<usize>().unwrap(), record.len());
        assert!(record.ends_with('\n'));

        // crossing a digit boundary
        let record = pax_record("k", &"v".repeat(94));
        let (len, _) = record.split_once(' ').unwrap();
        assert_eq!(len.parse::<usize>().unwrap(), record.len());
    }

    #[test]
    fn names() {
        let key = RepoKey::new("team/tool.git");
        assert_eq!(wrapper_dir(&key, "abc"), "team/tool.git-abc");
        assert_eq!(attachment_name(&key, "v1.0", ArchiveFormat::Tarball), "team-tool.git-v1.0.tar.gz");
        assert_eq!(
            attachment_name(&RepoKey::new("demo"), "feature/x", ArchiveFormat::Zip),
            "demo-feature-x.zip"
        );
        assert_eq!(ArchiveFormat::Zip.content_type(), "application/zip");
    }

    #[test]
    fn zip_timestamps_clamp_to_representable_range() {
        let epoch = zip_datetime(0);
        assert_eq!(epoch.year(), 1980);
        let later = zip_datetime(1_700_000_000);
        assert_eq!(later.year(), 2023);
    }
}
