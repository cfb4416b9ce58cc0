//! Commit lists, unique commits, merged branches and contributors.

mod common;

use common::Fixture;
use gitrest::git::backend::{Backend, Ref};
use gitrest::git::history::{self, CommitOrder};
use gitrest::git::resolve;

fn branch(backend: &dyn Backend, name: &str) -> Ref {
    resolve::branch(backend, name).unwrap()
}

fn shas(commits: &[gitrest::git::backend::Commit]) -> Vec<String> {
    commits.iter().map(|c| c.sha.clone()).collect()
}

#[test]
fn linear_history_is_unique_to_its_only_branch() {
    let fixture = Fixture::new();
    let repo = fixture.init("demo");
    let a = repo.commit("master", &[("f", "a\n")], "A");
    let b = repo.commit("master", &[("f", "b\n")], "B");
    let c = repo.commit("master", &[("f", "c\n")], "C");
    let backend = repo.backend();

    let master = branch(&backend, "master");
    let expected = vec![a.to_string(), b.to_string(), c.to_string()];
    assert_eq!(shas(&history::unique_commits(&backend, &master, CommitOrder::Topological).unwrap()), expected);
    assert_eq!(shas(&history::unique_commits(&backend, &master, CommitOrder::Chronological).unwrap()), expected);
}

#[test]
fn identical_branches_have_no_unique_commits() {
    let fixture = Fixture::new();
    let repo = fixture.init("demo");
    repo.commit("master", &[("f", "a\n")], "A");
    let b = repo.commit("master", &[("f", "b\n")], "B");
    repo.set_branch("copy", b);
    let backend = repo.backend();

    let master = branch(&backend, "master");
    assert!(history::unique_commits(&backend, &master, CommitOrder::Topological).unwrap().is_empty());
}

#[test]
fn unique_commits_stop_at_other_refs() {
    let fixture = Fixture::new();
    let repo = fixture.init("demo");
    let a = repo.commit("master", &[("f", "a\n")], "A");
    repo.set_branch("feature", a);
    let f1 = repo.commit("feature", &[("f", "a\n"), ("g", "1\n")], "F1");
    let f2 = repo.commit("feature", &[("f", "a\n"), ("g", "2\n")], "F2");
    repo.commit("master", &[("f", "b\n")], "B");
    // an annotated tag on the shared base hides nothing new but must peel
    repo.annotated_tag("base", a, "base");
    let backend = repo.backend();

    let feature = branch(&backend, "feature");
    let unique = history::unique_commits(&backend, &feature, CommitOrder::Topological).unwrap();
    assert_eq!(shas(&unique), vec![f1.to_string(), f2.to_string()]);
}

#[test]
fn merged_branches_are_contained_in_the_branch() {
    let fixture = Fixture::new();
    let repo = fixture.init("demo");
    let a = repo.commit("master", &[("f", "a\n")], "A");
    repo.set_branch("done", a);
    repo.set_branch("open", a);
    repo.commit("done", &[("f", "a\n"), ("d", "done\n")], "D");
    repo.commit("open", &[("f", "a\n"), ("o", "open\n")], "O");
    repo.merge("master", "done", &[("f", "a\n"), ("d", "done\n")], "merge done");
    let backend = repo.backend();

    let master = branch(&backend, "master");
    let merged: Vec<String> = history::merged_branches(&backend, &master)
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(merged, ["refs/heads/done"]);
}

#[test]
fn commit_lists_are_newest_first_and_limited() {
    let fixture = Fixture::new();
    let repo = fixture.init("demo");
    let a = repo.commit("master", &[("f", "a\n")], "A");
    let b = repo.commit("master", &[("f", "b\n")], "B");
    let c = repo.commit("master", &[("f", "c\n")], "C");
    let backend = repo.backend();

    let all = history::list_commits(&backend, &c.to_string(), 50).unwrap();
    assert_eq!(shas(&all), vec![c.to_string(), b.to_string(), a.to_string()]);

    let two = history::list_commits(&backend, &c.to_string(), 2).unwrap();
    assert_eq!(two.len(), 2);
    assert!(history::list_commits(&backend, &c.to_string(), 0).unwrap().is_empty());
}

#[test]
fn merge_base_of_diverged_commits() {
    let fixture = Fixture::new();
    let repo = fixture.init("demo");
    let a = repo.commit("master", &[("f", "a\n")], "A");
    repo.set_branch("side", a);
    let left = repo.commit("master", &[("f", "b\n")], "B");
    let right = repo.commit("side", &[("f", "c\n")], "C");
    let orphan = repo.commit_as("orphan", &[], &[("x", "x\n")], "X", "Test User", "test@example.com");
    let backend = repo.backend();

    let commit = |oid: git2::Oid| resolve::commit_by_sha(&backend, &oid.to_string()).unwrap();
    let base = history::merge_base_commit(&backend, &commit(left), &commit(right)).unwrap();
    assert_eq!(base.map(|c| c.sha), Some(a.to_string()));
    assert!(history::merge_base_commit(&backend, &commit(left), &commit(orphan)).unwrap().is_none());
}

#[test]
fn contributors_are_grouped_by_email() {
    let fixture = Fixture::new();
    let repo = fixture.init("demo");
    let files: &[(&str, &str)] = &[("f", "x\n")];
    let mut parents = Vec::new();
    for (name, email) in [
        ("Ann", "ann@example.com"),
        ("Bob", "bob@example.com"),
        ("Ann Again", "ann@example.com"),
        ("Ann", "ann@example.com"),
    ] {
        let oid = repo.commit_as("master", &parents, files, "work", name, email);
        parents = vec![oid];
    }
    let backend = repo.backend();

    let contributors = history::contributors(&backend).unwrap();
    assert_eq!(contributors.len(), 2);
    assert_eq!(contributors[0].email, "ann@example.com");
    assert_eq!(contributors[0].contributions, 3);
    assert_eq!(contributors[1].email, "bob@example.com");
    assert_eq!(contributors[1].contributions, 1);
}

#[test]
fn contributors_of_an_empty_repository() {
    let fixture = Fixture::new();
    let repo = fixture.init("empty");
    assert!(history::contributors(&repo.backend()).unwrap().is_empty());
}

#[test]
fn commit_orders_parse() {
    assert_eq!(CommitOrder::parse("topological"), Some(CommitOrder::Topological));
    assert_eq!(CommitOrder::parse("chronological"), Some(CommitOrder::Chronological));
    assert_eq!(CommitOrder::parse("random"), None);
}
