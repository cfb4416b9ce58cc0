//! Shared fixtures: repositories built with git2 inside a temporary base
//! directory.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use git2::{Oid, Repository, RepositoryInitOptions, Signature, Time};
use tempfile::TempDir;

use gitrest::config::Config;
use gitrest::git::GitRepository;

/// Base time for fixture commits (2014-05-13T16:53:20Z); each commit made
/// through [`TestRepo::commit`] is one minute later than the previous one.
pub const BASE_TIME: i64 = 1_400_000_000;

/// A temporary directory holding any number of test repositories.
pub struct Fixture {
    dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Fixture {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> Config {
        let mut config = Config::with_base_path(self.path());
        config.public_url = Some("http://api.test".to_string());
        config
    }

    /// Initializes a working-copy repository at `<base>/<key>` with `master`
    /// as its initial branch.
    pub fn init(&self, key: &str) -> TestRepo {
        self.init_with(key, false)
    }

    pub fn init_bare(&self, key: &str) -> TestRepo {
        self.init_with(key, true)
    }

    fn init_with(&self, key: &str, bare: bool) -> TestRepo {
        let path = self.path().join(key);
        let mut options = RepositoryInitOptions::new();
        options.initial_head("master").bare(bare).mkpath(true);
        let repo = Repository::init_opts(&path, &options).expect("failed to init repository");
        TestRepo {
            repo,
            path,
            clock: std::cell::Cell::new(BASE_TIME),
        }
    }
}

/// A repository under construction.
pub struct TestRepo {
    pub repo: Repository,
    pub path: PathBuf,
    clock: std::cell::Cell<i64>,
}

/// File contents keyed by `/`-separated path; the full snapshot of a commit.
pub type Files<'a> = &'a [(&'a str, &'a str)];

impl TestRepo {
    pub fn backend(&self) -> GitRepository {
        GitRepository::open(&self.path).expect("failed to open test repo")
    }

    fn signature(&self, name: &str, email: &str) -> Signature<'static> {
        let time = self.clock.get() + 60;
        self.clock.set(time);
        Signature::new(name, email, &Time::new(time, 0)).expect("signature")
    }

    /// Commits `files` as the complete tree on `branch`, with the branch's
    /// current tip (if any) as the only parent.
    pub fn commit(&self, branch: &str, files: Files<'_>, message: &str) -> Oid {
        let parents: Vec<Oid> = self.tip(branch).into_iter().collect();
        self.commit_as(branch, &parents, files, message, "Test User", "test@example.com")
    }

    /// Commits with explicit parents and author; `branch` is moved to the
    /// new commit.
    pub fn commit_as(
        &self,
        branch: &str,
        parents: &[Oid],
        files: Files<'_>,
        message: &str,
        name: &str,
        email: &str,
    ) -> Oid {
        let tree_oid = self.write_tree(files);
        self.commit_tree_as(branch, parents, tree_oid, message, name, email)
    }

    /// Commits a prebuilt tree (see [`TestRepo::write_tree_with_modes`]) on
    /// top of `branch`.
    pub fn commit_tree(&self, branch: &str, tree_oid: Oid, message: &str) -> Oid {
        let parents: Vec<Oid> = self.tip(branch).into_iter().collect();
        self.commit_tree_as(branch, &parents, tree_oid, message, "Test User", "test@example.com")
    }

    fn commit_tree_as(
        &self,
        branch: &str,
        parents: &[Oid],
        tree_oid: Oid,
        message: &str,
        name: &str,
        email: &str,
    ) -> Oid {
        let sig = self.signature(name, email);
        let tree = self.repo.find_tree(tree_oid).expect("tree");
        let parents: Vec<git2::Commit<'_>> = parents
            .iter()
            .map(|oid| self.repo.find_commit(*oid).expect("parent"))
            .collect();
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

        let oid = self
            .repo
            .commit(None, &sig, &sig, message, &tree, &parent_refs)
            .expect("commit");
        self.set_branch(branch, oid);
        oid
    }

    /// Merge commit of `branch` and `other` with the given snapshot.
    pub fn merge(&self, branch: &str, other: &str, files: Files<'_>, message: &str) -> Oid {
        let parents = [
            self.tip(branch).expect("branch tip"),
            self.tip(other).expect("other tip"),
        ];
        self.commit_as(branch, &parents, files, message, "Test User", "test@example.com")
    }

    pub fn set_branch(&self, branch: &str, oid: Oid) {
        self.repo
            .reference(&format!("refs/heads/{}", branch), oid, true, "fixture")
            .expect("update branch");
    }

    pub fn tip(&self, branch: &str) -> Option<Oid> {
        self.repo
            .find_reference(&format!("refs/heads/{}", branch))
            .ok()
            .and_then(|r| r.target())
    }

    pub fn lightweight_tag(&self, name: &str, target: Oid) {
        let object = self.repo.find_object(target, None).expect("tag target");
        self.repo.tag_lightweight(name, &object, false).expect("lightweight tag");
    }

    /// Annotated tag on any object, including another annotated tag.
    pub fn annotated_tag(&self, name: &str, target: Oid, message: &str) -> Oid {
        let object = self.repo.find_object(target, None).expect("tag target");
        let sig = self.signature("Tagger", "tagger@example.com");
        self.repo.tag(name, &object, &sig, message, false).expect("annotated tag")
    }

    pub fn blob_id(&self, data: &str) -> Oid {
        Oid::hash_object(git2::ObjectType::Blob, data.as_bytes()).expect("hash")
    }

    pub fn tree_of(&self, commit: Oid) -> Oid {
        self.repo.find_commit(commit).expect("commit").tree_id()
    }

    pub fn write_tree(&self, files: Files<'_>) -> Oid {
        let entries: Vec<(String, Oid, i32)> = files
            .iter()
            .map(|(path, data)| {
                let oid = self.repo.blob(data.as_bytes()).expect("blob");
                (path.to_string(), oid, BLOB_MODE)
            })
            .collect();
        write_tree(&self.repo, &entries)
    }

    /// Builds a tree from `(path, oid, mode)` leaves, for symlinks
    /// (`0o120000`), executables (`0o100755`) and submodules (`0o160000`).
    pub fn write_tree_with_modes(&self, entries: &[(&str, Oid, i32)]) -> Oid {
        let owned: Vec<(String, Oid, i32)> = entries
            .iter()
            .map(|(path, oid, mode)| (path.to_string(), *oid, *mode))
            .collect();
        write_tree(&self.repo, &owned)
    }

    pub fn blob(&self, data: &str) -> Oid {
        self.repo.blob(data.as_bytes()).expect("blob")
    }

    pub fn set_description(&self, text: &str) {
        std::fs::write(self.repo.path().join("description"), text).expect("description");
    }
}

const BLOB_MODE: i32 = 0o100644;
const TREE_MODE: i32 = 0o040000;

fn write_tree(repo: &Repository, entries: &[(String, Oid, i32)]) -> Oid {
    let mut leaves: BTreeMap<&str, (Oid, i32)> = BTreeMap::new();
    let mut dirs: BTreeMap<&str, Vec<(String, Oid, i32)>> = BTreeMap::new();
    for (path, oid, mode) in entries {
        match path.split_once('/') {
            Some((dir, rest)) => dirs.entry(dir).or_default().push((rest.to_string(), *oid, *mode)),
            None => {
                leaves.insert(path, (*oid, *mode));
            }
        }
    }

    let mut builder = repo.treebuilder(None).expect("treebuilder");
    for (name, (oid, mode)) in leaves {
        builder.insert(name, oid, mode).expect("insert entry");
    }
    for (name, children) in dirs {
        let oid = write_tree(repo, &children);
        builder.insert(name, oid, TREE_MODE).expect("insert tree");
    }
    builder.write().expect("write tree")
}
