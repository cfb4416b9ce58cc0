//! Object-graph endpoints.
//!
//! - GET /repos/{key}/git/commits/?ref_name=&start_sha=&limit=
//!   Time-ordered commit list starting at a ref (default HEAD) or a SHA.
//! - GET /repos/{key}/git/commits/{sha}/
//! - GET /repos/{key}/git/commits/{sha}/merge-base/{other}/
//!   Nearest common ancestor, `null` for unrelated histories.
//! - GET /repos/{key}/git/trees/{sha}/?recursive=1
//!   Accepts tree, commit and tag SHAs.
//! - GET /repos/{key}/git/blobs/{sha}/
//! - GET /repos/{key}/git/tags/{sha}/
//! - GET /repos/{key}/git/refs/ and /repos/{key}/git/refs/{*path}
//!   A path naming exactly one ref returns that ref instead of a list.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::extract::{non_empty, parse_limit, sha_segment, BaseUrl};
use crate::convert::{convert_blob, convert_commit, convert_ref, convert_tag, convert_tree, CommitLinks};
use crate::error::{AppError, Result};
use crate::git::backend::Backend;
use crate::git::{history, resolve, tree, RepoKey};
use crate::models::{BlobResource, PlumbingCommit, RefListing, TagResource, TreeResource};
use crate::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/repos/{key}/git/commits/", get(list_commits))
        .route("/repos/{key}/git/commits/{sha}/", get(get_commit))
        .route("/repos/{key}/git/commits/{sha}/merge-base/{other}/", get(get_merge_base))
        .route("/repos/{key}/git/trees/{sha}/", get(get_tree))
        .route("/repos/{key}/git/blobs/{sha}/", get(get_blob))
        .route("/repos/{key}/git/tags/{sha}/", get(get_tag))
        .route("/repos/{key}/git/refs/", get(list_all_refs))
        .route("/repos/{key}/git/refs/{*path}", get(list_refs))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct CommitsQuery {
    ref_name: Option<String>,
    start_sha: Option<String>,
    limit: Option<String>,
}

async fn list_commits(
    State(state): State<AppState>,
    base: BaseUrl,
    Path(key): Path<RepoKey>,
    Query(query): Query<CommitsQuery>,
) -> Result<Json<Vec<PlumbingCommit>>> {
    let limit = parse_limit(query.limit.as_deref(), state.config.default_commit_limit)?;
    let repo = state.open_repo(&key)?;

    let start = match non_empty(&query.start_sha) {
        Some(sha) => {
            if !resolve::is_valid_sha(sha) {
                return Err(AppError::bad_request("invalid start_sha"));
            }
            resolve::commit_by_sha(&repo, sha)?.sha
        }
        None => {
            let ref_name = non_empty(&query.ref_name).unwrap_or("HEAD");
            let tip = match resolve::lookup_ref(&repo, ref_name)? {
                Some(found) => resolve::peel_to_commit(&repo, &found.target)?,
                None => None,
            };
            match tip {
                Some(commit) => commit.sha,
                // unborn HEAD: nothing committed yet
                None if ref_name == "HEAD" => return Ok(Json(Vec::new())),
                None => return Err(AppError::not_found("reference not found")),
            }
        }
    };

    let urls = base.urls(&key);
    let commits = history::list_commits(&repo, &start, limit)?;
    Ok(Json(
        commits
            .iter()
            .map(|commit| convert_commit(&urls, commit, CommitLinks::Plumbing))
            .collect(),
    ))
}

async fn get_commit(
    State(state): State<AppState>,
    base: BaseUrl,
    Path((key, sha)): Path<(RepoKey, String)>,
) -> Result<Json<PlumbingCommit>> {
    let sha = sha_segment(&sha)?;
    let repo = state.open_repo(&key)?;
    let commit = resolve::commit_by_sha(&repo, sha)?;
    Ok(Json(convert_commit(&base.urls(&key), &commit, CommitLinks::Plumbing)))
}

async fn get_merge_base(
    State(state): State<AppState>,
    base: BaseUrl,
    Path((key, left, right)): Path<(RepoKey, String, String)>,
) -> Result<Json<Option<PlumbingCommit>>> {
    let (left, right) = (sha_segment(&left)?, sha_segment(&right)?);
    let repo = state.open_repo(&key)?;
    let left = resolve::commit_by_sha(&repo, left)?;
    let right = resolve::commit_by_sha(&repo, right)?;

    let merge_base = history::merge_base_commit(&repo, &left, &right)?;
    let urls = base.urls(&key);
    Ok(Json(merge_base.map(|commit| convert_commit(&urls, &commit, CommitLinks::Plumbing))))
}

#[derive(Debug, Deserialize)]
struct TreeQuery {
    recursive: Option<String>,
}

async fn get_tree(
    State(state): State<AppState>,
    base: BaseUrl,
    Path((key, sha)): Path<(RepoKey, String)>,
    Query(query): Query<TreeQuery>,
) -> Result<Json<TreeResource>> {
    let sha = sha_segment(&sha)?;
    let recursive = query.recursive.as_deref() == Some("1");
    let repo = state.open_repo(&key)?;

    let found = resolve::tree_by_sha(&repo, sha)?;
    let entries = tree::flatten(&repo, &found, recursive)?;
    Ok(Json(convert_tree(&base.urls(&key), &found.sha, &entries)))
}

async fn get_blob(
    State(state): State<AppState>,
    base: BaseUrl,
    Path((key, sha)): Path<(RepoKey, String)>,
) -> Result<Json<BlobResource>> {
    let sha = sha_segment(&sha)?;
    let repo = state.open_repo(&key)?;
    let blob = resolve::blob_by_sha(&repo, sha)?;
    Ok(Json(convert_blob(&base.urls(&key), &blob)))
}

async fn get_tag(
    State(state): State<AppState>,
    base: BaseUrl,
    Path((key, sha)): Path<(RepoKey, String)>,
) -> Result<Json<TagResource>> {
    let sha = sha_segment(&sha)?;
    let repo = state.open_repo(&key)?;
    let tag = resolve::tag_by_sha(&repo, sha)?;
    Ok(Json(convert_tag(&base.urls(&key), &tag)))
}

async fn list_all_refs(
    State(state): State<AppState>,
    base: BaseUrl,
    Path(key): Path<RepoKey>,
) -> Result<Json<RefListing>> {
    refs_under(&state, &base, &key, "")
}

async fn list_refs(
    State(state): State<AppState>,
    base: BaseUrl,
    Path((key, path)): Path<(RepoKey, String)>,
) -> Result<Json<RefListing>> {
    refs_under(&state, &base, &key, &format!("refs/{}", path))
}

fn refs_under(state: &AppState, base: &BaseUrl, key: &RepoKey, prefix: &str) -> Result<Json<RefListing>> {
    let repo = state.open_repo(key)?;
    let urls = base.urls(key);

    let mut refs: Vec<_> = repo
        .references()?
        .iter()
        .filter(|r| r.name.starts_with(prefix))
        .map(|r| convert_ref(&urls, r))
        .collect();

    if refs.len() == 1 && refs[0].name == prefix {
        return Ok(Json(RefListing::One(refs.remove(0))));
    }
    Ok(Json(RefListing::Many(refs)))
}
