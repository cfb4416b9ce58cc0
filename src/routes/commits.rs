//! Porcelain commit and diff endpoints.
//!
//! - GET /repos/{key}/commits/{refspec}/
//!   Commit with `stats` and per-file `files` derived from its diff.
//! - GET /repos/{key}/commit/{refspec}.diff
//!   Unified diff against the first parent, as `text/x-diff`.
//! - GET /repos/{key}/compare/{old}...{new}.diff?context=
//!   Unified diff between two refspecs.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::extract::{parse_context, BaseUrl};
use crate::convert::convert_porcelain_commit;
use crate::error::{AppError, Result};
use crate::git::diff::{self, DEFAULT_CONTEXT_LINES};
use crate::git::{resolve, RepoKey};
use crate::models::PorcelainCommit;
use crate::AppState;

const DIFF_CONTENT_TYPE: &str = "text/x-diff";
const DIFF_SUFFIX: &str = ".diff";

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/repos/{key}/commits/{refspec}/", get(get_commit))
        .route("/repos/{key}/commit/{spec}", get(get_commit_diff))
        .route("/repos/{key}/compare/{spec}", get(get_compare_diff))
        .with_state(state)
}

async fn get_commit(
    State(state): State<AppState>,
    base: BaseUrl,
    Path((key, refspec)): Path<(RepoKey, String)>,
) -> Result<Json<PorcelainCommit>> {
    let repo = state.open_repo(&key)?;
    let commit = resolve::commit_for_refspec(&repo, &refspec)?;
    let diff = diff::diff_commit(&repo, &commit, None, DEFAULT_CONTEXT_LINES, state.config.root_commit_diff)?;
    Ok(Json(convert_porcelain_commit(&base.urls(&key), &commit, Some(&diff))))
}

async fn get_commit_diff(
    State(state): State<AppState>,
    Path((key, spec)): Path<(RepoKey, String)>,
) -> Result<impl IntoResponse> {
    let refspec = spec
        .strip_suffix(DIFF_SUFFIX)
        .ok_or_else(|| AppError::not_found("not found"))?;

    let repo = state.open_repo(&key)?;
    let commit = resolve::commit_for_refspec(&repo, refspec)?;
    let diff = diff::diff_commit(&repo, &commit, None, DEFAULT_CONTEXT_LINES, state.config.root_commit_diff)?;
    Ok(([(header::CONTENT_TYPE, DIFF_CONTENT_TYPE)], diff.patch))
}

#[derive(Debug, Deserialize)]
struct CompareQuery {
    context: Option<String>,
}

async fn get_compare_diff(
    State(state): State<AppState>,
    Path((key, spec)): Path<(RepoKey, String)>,
    Query(query): Query<CompareQuery>,
) -> Result<impl IntoResponse> {
    let (old, new) = spec
        .strip_suffix(DIFF_SUFFIX)
        .and_then(|range| range.split_once("..."))
        .ok_or_else(|| AppError::not_found("not found"))?;
    let context = parse_context(query.context.as_deref(), DEFAULT_CONTEXT_LINES)?;

    let repo = state.open_repo(&key)?;
    let old = resolve::commit_for_refspec(&repo, old)?;
    let new = resolve::commit_for_refspec(&repo, new)?;
    let diff = diff::diff_commit(&repo, &new, Some(&old), context, state.config.root_commit_diff)?;
    Ok(([(header::CONTENT_TYPE, DIFF_CONTENT_TYPE)], diff.patch))
}
