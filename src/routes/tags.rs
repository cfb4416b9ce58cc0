//! Tag endpoints.
//!
//! - GET /repos/{key}/tags/          Every tag with the commit it points at
//! - GET /repos/{key}/tags/{name}/   One tag; annotated tags include the tag object

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::extract::BaseUrl;
use crate::convert::{convert_tag_detail, convert_tag_summary};
use crate::error::{AppError, Result};
use crate::git::backend::{Backend, ObjectKind};
use crate::git::{resolve, RepoKey};
use crate::models::{TagDetail, TagSummary};
use crate::AppState;

const TAG_PREFIX: &str = "refs/tags/";

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/repos/{key}/tags/", get(list_tags))
        .route("/repos/{key}/tags/{name}/", get(get_tag))
        .with_state(state)
}

async fn list_tags(
    State(state): State<AppState>,
    base: BaseUrl,
    Path(key): Path<RepoKey>,
) -> Result<Json<Vec<TagSummary>>> {
    let repo = state.open_repo(&key)?;
    let urls = base.urls(&key);

    let mut tags = Vec::new();
    for tag in repo.references()?.iter().filter(|r| r.name.starts_with(TAG_PREFIX)) {
        match resolve::peel_to_commit(&repo, &tag.target)? {
            Some(commit) => tags.push(convert_tag_summary(&urls, tag.shorthand(), &commit.sha)),
            None => tracing::debug!(tag = %tag.name, "skipping tag that does not point at a commit"),
        }
    }
    Ok(Json(tags))
}

async fn get_tag(
    State(state): State<AppState>,
    base: BaseUrl,
    Path((key, name)): Path<(RepoKey, String)>,
) -> Result<Json<TagDetail>> {
    let repo = state.open_repo(&key)?;
    let tag = resolve::lookup_ref(&repo, &format!("{}{}", TAG_PREFIX, name))?
        .ok_or_else(|| AppError::not_found("tag not found"))?;
    let commit = resolve::peel_to_commit(&repo, &tag.target)?
        .ok_or_else(|| AppError::not_found("tag not found"))?;

    let annotated = match tag.target.kind {
        ObjectKind::Tag => Some(resolve::tag_by_sha(&repo, &tag.target.sha)?),
        _ => None,
    };

    Ok(Json(convert_tag_detail(
        &base.urls(&key),
        tag.shorthand(),
        &commit,
        annotated.as_ref(),
    )))
}
