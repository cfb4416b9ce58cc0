//! Blame endpoint.
//!
//! GET /repos/{key}/blame/{refspec}/{*path}?firstLine=&lastLine=&oldest=
//!
//! Returns every line in the requested range with the commit that last
//! touched it and the file's path in that commit, plus the referenced
//! commits keyed by SHA.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::extract::{non_empty, BaseUrl};
use crate::convert::convert_blame;
use crate::error::Result;
use crate::git::blame::{blame_file, LineRange};
use crate::git::{resolve, RepoKey};
use crate::models::BlameResource;
use crate::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/repos/{key}/blame/{refspec}/{*path}", get(get_blame))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct BlameQuery {
    #[serde(rename = "firstLine")]
    first_line: Option<String>,
    #[serde(rename = "lastLine")]
    last_line: Option<String>,
    oldest: Option<String>,
}

async fn get_blame(
    State(state): State<AppState>,
    base: BaseUrl,
    Path((key, refspec, path)): Path<(RepoKey, String, String)>,
    Query(query): Query<BlameQuery>,
) -> Result<Json<BlameResource>> {
    let range = LineRange::parse(query.first_line.as_deref(), query.last_line.as_deref())?;

    let repo = state.open_repo(&key)?;
    let newest = resolve::commit_for_refspec(&repo, &refspec)?;
    let blame = blame_file(&repo, &path, &newest, non_empty(&query.oldest), range)?;
    Ok(Json(convert_blame(&base.urls(&key), &blame)))
}
