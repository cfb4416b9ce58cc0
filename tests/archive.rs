//! Archive round trips: every blob comes back byte for byte below the
//! wrapper directory.

mod common;

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

use common::Fixture;
use flate2::read::GzDecoder;
use gitrest::config::ArchiveMtime;
use gitrest::git::RepoKey;
use gitrest::git::archive::{ArchiveFormat, archive_mtime, build_archive};
use gitrest::git::resolve;

const FILES: &[(&str, &str)] = &[
    ("README.md", "# demo\n"),
    ("src/lib.rs", "pub fn demo() {}\n"),
    ("src/bin/main.rs", "fn main() {}\n"),
    ("docs/guide.md", "guide\n"),
];

fn expected_files(wrapper: &str) -> BTreeMap<String, Vec<u8>> {
    FILES
        .iter()
        .map(|(path, data)| (format!("{}/{}", wrapper, path), data.as_bytes().to_vec()))
        .collect()
}

#[test]
fn tarball_round_trip() {
    let fixture = Fixture::new();
    let repo = fixture.init("demo");
    let oid = repo.commit("master", FILES, "initial");
    let backend = repo.backend();
    let commit = resolve::commit_by_sha(&backend, &oid.to_string()).unwrap();
    let key = RepoKey::new("demo");

    let file = build_archive(&backend, &key, &commit, ArchiveFormat::Tarball, 1_400_000_000).unwrap();
    let mut archive = tar::Archive::new(GzDecoder::new(file));

    let wrapper = format!("demo-{}", commit.sha);
    let mut files = BTreeMap::new();
    let mut dirs = BTreeSet::new();
    let mut global_header = None;

    for entry in archive.entries().unwrap() {
        let mut entry = entry.unwrap();
        let kind = entry.header().entry_type();
        let mode = entry.header().mode().unwrap();
        let mtime = entry.header().mtime().unwrap();
        let path = entry.path().unwrap().to_string_lossy().trim_end_matches('/').to_string();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();

        match kind {
            tar::EntryType::XGlobalHeader => global_header = Some(String::from_utf8(data).unwrap()),
            tar::EntryType::Directory => {
                assert_eq!(mode, 0o755, "mode of {}", path);
                dirs.insert(path);
            }
            tar::EntryType::Regular => {
                assert_eq!(mode, 0o644, "mode of {}", path);
                assert_eq!(mtime, 1_400_000_000);
                files.insert(path, data);
            }
            other => panic!("unexpected entry type {:?} for {}", other, path),
        }
    }

    assert_eq!(files, expected_files(&wrapper));
    let expected_dirs: BTreeSet<String> = ["docs", "src", "src/bin"]
        .iter()
        .map(|dir| format!("{}/{}", wrapper, dir))
        .collect();
    assert_eq!(dirs, expected_dirs);

    let header = global_header.expect("pax global header");
    assert!(header.ends_with(&format!(" comment={}\n", commit.sha)));
}

#[test]
fn zipball_round_trip() {
    let fixture = Fixture::new();
    let repo = fixture.init("demo");
    let oid = repo.commit("master", FILES, "initial");
    let backend = repo.backend();
    let commit = resolve::commit_by_sha(&backend, &oid.to_string()).unwrap();
    let key = RepoKey::new("demo");

    let file = build_archive(&backend, &key, &commit, ArchiveFormat::Zip, 1_400_000_000).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();

    let mut files = BTreeMap::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        if entry.is_dir() {
            continue;
        }
        assert_eq!(entry.unix_mode().map(|m| m & 0o777), Some(0o644));
        assert_eq!(entry.compression(), zip::CompressionMethod::Deflated);
        let name = entry.name().to_string();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        files.insert(name, data);
    }

    assert_eq!(files, expected_files(&format!("demo-{}", commit.sha)));
}

#[test]
fn nested_keys_appear_in_the_wrapper_directory() {
    let fixture = Fixture::new();
    let repo = fixture.init("team/tool");
    let oid = repo.commit("master", &[("a.txt", "a\n")], "initial");
    let backend = repo.backend();
    let commit = resolve::commit_by_sha(&backend, &oid.to_string()).unwrap();

    let file = build_archive(&backend, &RepoKey::new("team/tool"), &commit, ArchiveFormat::Zip, 0).unwrap();
    let archive = zip::ZipArchive::new(file).unwrap();
    let names: Vec<&str> = archive.file_names().collect();
    assert_eq!(names, [format!("team/tool-{}/a.txt", commit.sha)]);
}

#[test]
fn archive_timestamps_follow_the_configured_source() {
    let fixture = Fixture::new();
    let repo = fixture.init("demo");
    let oid = repo.commit("master", &[("a.txt", "a\n")], "initial");
    let backend = repo.backend();
    let commit = resolve::commit_by_sha(&backend, &oid.to_string()).unwrap();

    assert_eq!(archive_mtime(ArchiveMtime::Commit, &commit), commit.committer.time as u64);
    assert!(archive_mtime(ArchiveMtime::WallClock, &commit) > commit.committer.time as u64);
}

/// `a.txt`, an executable `bin/run.sh`, a submodule at `bin/mod` and a
/// symlink `link`.
fn mixed_modes(fixture: &Fixture) -> (common::TestRepo, git2::Oid) {
    let repo = fixture.init("demo");
    let upstream = repo.commit("upstream", &[("lib.rs", "// vendored\n")], "upstream");
    let tree = repo.write_tree_with_modes(&[
        ("a.txt", repo.blob("a\n"), 0o100644),
        ("bin/run.sh", repo.blob("#!/bin/sh\n"), 0o100755),
        ("bin/mod", upstream, 0o160000),
        ("link", repo.blob("a.txt"), 0o120000),
    ]);
    let oid = repo.commit_tree("master", tree, "modes");
    (repo, oid)
}

#[test]
fn tarballs_skip_symlinks_and_submodules() {
    let fixture = Fixture::new();
    let (repo, oid) = mixed_modes(&fixture);
    let backend = repo.backend();
    let commit = resolve::commit_by_sha(&backend, &oid.to_string()).unwrap();

    let file = build_archive(&backend, &RepoKey::new("demo"), &commit, ArchiveFormat::Tarball, 0).unwrap();
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    let wrapper = format!("demo-{}/", commit.sha);

    let mut modes = BTreeMap::new();
    for entry in archive.entries().unwrap() {
        let entry = entry.unwrap();
        if entry.header().entry_type() == tar::EntryType::XGlobalHeader {
            continue;
        }
        let path = entry.path().unwrap().to_string_lossy().into_owned();
        let relative = path.strip_prefix(&wrapper).unwrap().trim_end_matches('/').to_string();
        modes.insert(relative, entry.header().mode().unwrap());
    }

    let expected: BTreeMap<String, u32> = [("a.txt", 0o644), ("bin", 0o755), ("bin/run.sh", 0o755)]
        .into_iter()
        .map(|(path, mode)| (path.to_string(), mode))
        .collect();
    assert_eq!(modes, expected);
}

#[test]
fn zipballs_skip_symlinks_and_submodules() {
    let fixture = Fixture::new();
    let (repo, oid) = mixed_modes(&fixture);
    let backend = repo.backend();
    let commit = resolve::commit_by_sha(&backend, &oid.to_string()).unwrap();

    let file = build_archive(&backend, &RepoKey::new("demo"), &commit, ArchiveFormat::Zip, 0).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let wrapper = format!("demo-{}/", commit.sha);

    let mut modes = BTreeMap::new();
    for i in 0..archive.len() {
        let entry = archive.by_index(i).unwrap();
        let relative = entry.name().strip_prefix(&wrapper).unwrap().to_string();
        modes.insert(relative, entry.unix_mode().map(|m| m & 0o777));
    }

    let expected: BTreeMap<String, Option<u32>> = [("a.txt", Some(0o644)), ("bin/run.sh", Some(0o755))]
        .into_iter()
        .map(|(path, mode)| (path.to_string(), mode))
        .collect();
    assert_eq!(modes, expected);
}
