//! API route handlers - map HTTP endpoints to git operations.
//!
//! Each submodule defines routes for a feature area:
//! - `repos`: repository list and info, contributors, route index
//! - `git`: object-graph resources (commits, trees, blobs, tags, refs)
//! - `branches`: branches, merged branches, commits unique to a branch
//! - `tags`: tag list and tag detail
//! - `commits`: porcelain commits, commit and compare diffs
//! - `contents`: file contents and raw files
//! - `blame`: per-line attribution
//! - `archives`: zip and tar.gz snapshots
//!
//! Unknown routes answer a JSON 404.

pub mod archives;
pub mod blame;
pub mod branches;
pub mod commits;
pub mod contents;
pub mod extract;
pub mod git;
pub mod repos;
pub mod tags;

use axum::Router;

use crate::error::AppError;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(repos::routes(state.clone()))
        .merge(git::routes(state.clone()))
        .merge(branches::routes(state.clone()))
        .merge(tags::routes(state.clone()))
        .merge(commits::routes(state.clone()))
        .merge(contents::routes(state.clone()))
        .merge(blame::routes(state.clone()))
        .merge(archives::routes(state))
        .fallback(not_found)
}

async fn not_found() -> AppError {
    AppError::not_found("not found")
}
