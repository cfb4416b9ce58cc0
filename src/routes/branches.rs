//! Branch endpoints.
//!
//! - GET /repos/{key}/branches/
//! - GET /repos/{key}/branches/{name}/
//! - GET /repos/{key}/branches/{name}/merged/
//!   Other local branches already fully merged into this one.
//! - GET /repos/{key}/branches/{name}/unique-commits/sorted/{order}/
//!   Commits reachable from this branch and from no other ref, `order` being
//!   `topological` or `chronological`.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::extract::BaseUrl;
use crate::convert::{convert_branch, convert_branch_summary, convert_porcelain_commit};
use crate::error::{AppError, Result};
use crate::git::backend::Backend;
use crate::git::history::{self, CommitOrder};
use crate::git::{resolve, RepoKey};
use crate::models::{BranchDetail, BranchSummary, UniqueCommitsResponse};
use crate::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/repos/{key}/branches/", get(list_branches))
        .route("/repos/{key}/branches/{name}/", get(get_branch))
        .route("/repos/{key}/branches/{name}/merged/", get(list_merged))
        .route(
            "/repos/{key}/branches/{name}/unique-commits/sorted/{order}/",
            get(list_unique_commits),
        )
        .with_state(state)
}

async fn list_branches(
    State(state): State<AppState>,
    base: BaseUrl,
    Path(key): Path<RepoKey>,
) -> Result<Json<Vec<BranchSummary>>> {
    let repo = state.open_repo(&key)?;
    let urls = base.urls(&key);

    let branches = repo
        .references()?
        .iter()
        .filter(|r| r.name.starts_with("refs/heads/"))
        .map(|r| convert_branch_summary(&urls, r))
        .collect();
    Ok(Json(branches))
}

async fn get_branch(
    State(state): State<AppState>,
    base: BaseUrl,
    Path((key, name)): Path<(RepoKey, String)>,
) -> Result<Json<BranchDetail>> {
    let repo = state.open_repo(&key)?;
    let branch = resolve::branch(&repo, &name)?;
    let tip = resolve::commit_by_sha(&repo, &branch.target.sha)?;
    Ok(Json(convert_branch(&base.urls(&key), &name, &tip)))
}

async fn list_merged(
    State(state): State<AppState>,
    base: BaseUrl,
    Path((key, name)): Path<(RepoKey, String)>,
) -> Result<Json<Vec<BranchSummary>>> {
    let repo = state.open_repo(&key)?;
    let branch = resolve::branch(&repo, &name)?;
    let urls = base.urls(&key);

    let merged = history::merged_branches(&repo, &branch)?;
    Ok(Json(merged.iter().map(|r| convert_branch_summary(&urls, r)).collect()))
}

async fn list_unique_commits(
    State(state): State<AppState>,
    base: BaseUrl,
    Path((key, name, order)): Path<(RepoKey, String, String)>,
) -> Result<Json<UniqueCommitsResponse>> {
    let order = CommitOrder::parse(&order).ok_or_else(|| AppError::not_found("not found"))?;
    let repo = state.open_repo(&key)?;
    let branch = resolve::branch(&repo, &name)?;
    let urls = base.urls(&key);

    let commits = history::unique_commits(&repo, &branch, order)?;
    Ok(Json(UniqueCommitsResponse {
        commits: commits
            .iter()
            .map(|commit| convert_porcelain_commit(&urls, commit, None))
            .collect(),
    }))
}
