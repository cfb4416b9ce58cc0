//! Object-graph resources: commits, trees, blobs, refs and tags.

use chrono::{DateTime, Utc};

use crate::git::backend::{Blob, Commit, EntryKind, Ref, Signature, Tag};
use crate::git::tree::{FlatEntry, format_mode};
use crate::models::{
    BlobEncoding, BlobResource, Link, ObjectLink, Person, PlumbingCommit, RefResource,
    TagResource, TreeEntryResource, TreeResource,
};

use super::Urls;

/// Which commit URL family parent links point into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitLinks {
    Plumbing,
    Porcelain,
}

pub fn convert_person(sig: &Signature) -> Person {
    Person {
        name: sig.name.clone(),
        email: sig.email.clone(),
        date: DateTime::<Utc>::from_timestamp(sig.time, 0).unwrap_or_default(),
    }
}

pub fn convert_commit(urls: &Urls, commit: &Commit, links: CommitLinks) -> PlumbingCommit {
    let parent_url = |sha: &str| match links {
        CommitLinks::Plumbing => urls.git_commit(sha),
        CommitLinks::Porcelain => urls.commit(sha),
    };

    PlumbingCommit {
        sha: commit.sha.clone(),
        url: urls.git_commit(&commit.sha),
        author: convert_person(&commit.author),
        committer: convert_person(&commit.committer),
        message: commit.message.trim_end().to_string(),
        tree: Link {
            sha: commit.tree_sha.clone(),
            url: urls.tree(&commit.tree_sha),
        },
        parents: commit
            .parent_shas
            .iter()
            .map(|sha| Link {
                sha: sha.clone(),
                url: parent_url(sha),
            })
            .collect(),
    }
}

/// `utf-8` when the bytes are valid UTF-8, `base64` otherwise.
pub fn encode_blob_data(data: &[u8]) -> (BlobEncoding, String) {
    match std::str::from_utf8(data) {
        Ok(text) => (BlobEncoding::Utf8, text.to_string()),
        Err(_) => (BlobEncoding::Base64, base64::encode(data)),
    }
}

pub fn convert_blob(urls: &Urls, blob: &Blob) -> BlobResource {
    let (encoding, content) = encode_blob_data(&blob.data);
    BlobResource {
        sha: blob.sha.clone(),
        url: urls.blob(&blob.sha),
        size: blob.size(),
        encoding,
        content,
    }
}

pub fn convert_tree_entry(urls: &Urls, entry: &FlatEntry) -> TreeEntryResource {
    let (kind, url) = match entry.kind {
        EntryKind::Blob => ("blob", Some(urls.blob(&entry.sha))),
        EntryKind::Tree => ("tree", Some(urls.tree(&entry.sha))),
        EntryKind::Submodule => ("submodule", None),
    };
    TreeEntryResource {
        path: entry.path.clone(),
        sha: entry.sha.clone(),
        kind: kind.to_string(),
        mode: format_mode(entry.mode),
        size: entry.size,
        url,
    }
}

/// `entries` are expected in flattened (path-sorted) order.
pub fn convert_tree(urls: &Urls, sha: &str, entries: &[FlatEntry]) -> TreeResource {
    TreeResource {
        sha: sha.to_string(),
        url: urls.tree(sha),
        tree: entries.iter().map(|entry| convert_tree_entry(urls, entry)).collect(),
    }
}

pub fn convert_ref(urls: &Urls, reference: &Ref) -> RefResource {
    RefResource {
        url: urls.git_ref(&reference.name),
        name: reference.name.clone(),
        object: ObjectLink {
            kind: reference.target.kind.as_str().to_string(),
            sha: reference.target.sha.clone(),
            url: urls.object(reference.target.kind, &reference.target.sha),
        },
    }
}

pub fn convert_tag(urls: &Urls, tag: &Tag) -> TagResource {
    TagResource {
        url: urls.tag(&tag.sha),
        sha: tag.sha.clone(),
        tag: tag.name.clone(),
        tagger: tag.tagger.as_ref().map(convert_person),
        message: tag.message.clone(),
        object: ObjectLink {
            kind: tag.target.kind.as_str().to_string(),
            sha: tag.target.sha.clone(),
            url: urls.object(tag.target.kind, &tag.target.sha),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::RepoKey;

    fn urls() -> Urls {
        Urls::new("http://localhost", &RepoKey::new("demo"))
    }

    #[test]
    fn blob_entry_shape() {
        let entry = FlatEntry {
            path: "api.py".into(),
            sha: "ab".repeat(20),
            mode: 0o100644,
            kind: EntryKind::Blob,
            size: Some(5543),
        };
        let json = serde_json::to_value(convert_tree_entry(&urls(), &entry)).unwrap();
        assert_eq!(json["mode"], "100644");
        assert_eq!(json["type"], "blob");
        assert_eq!(json["size"], 5543);
        assert_eq!(json["path"], "api.py");
        assert_eq!(json["sha"], "ab".repeat(20));
        assert_eq!(json["url"], format!("http://localhost/repos/demo/git/blobs/{}/", "ab".repeat(20)));
    }

    #[test]
    fn submodule_entry_has_no_size_or_url() {
        let entry = FlatEntry {
            path: "vendor/lib".into(),
            sha: "cd".repeat(20),
            mode: 0o160000,
            kind: EntryKind::Submodule,
            size: None,
        };
        let json = serde_json::to_value(convert_tree_entry(&urls(), &entry)).unwrap();
        assert_eq!(json["type"], "submodule");
        assert_eq!(json["mode"], "160000");
        assert!(json.get("size").is_none());
        assert!(json.get("url").is_none());
    }

    #[test]
    fn blob_encoding_falls_back_to_base64() {
        assert_eq!(encode_blob_data(b"hello"), (BlobEncoding::Utf8, "hello".to_string()));
        assert_eq!(encode_blob_data(&[0xff, 0x00]), (BlobEncoding::Base64, "/wA=".to_string()));
    }

    #[test]
    fn dates_render_in_utc() {
        let sig = Signature {
            name: "A".into(),
            email: "a@example.com".into(),
            time: 1_400_000_000,
            offset_minutes: -420,
        };
        let json = serde_json::to_value(convert_person(&sig)).unwrap();
        assert_eq!(json["date"], "2014-05-13T16:53:20Z");
    }
}
