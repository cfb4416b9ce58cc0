//! Repository-level endpoints.
//!
//! - GET /                              Route templates served by this API
//! - GET /repos/                        Every repository below the base path
//! - GET /repos/{key}/                  Repository info
//! - GET /repos/{key}/contributors/     Authors reachable from HEAD by commit count

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::extract::BaseUrl;
use crate::convert::{convert_contributor, convert_repo};
use crate::error::Result;
use crate::git::backend::Backend;
use crate::git::{history, sandbox, RepoKey};
use crate::models::{ContributorResource, RepoResource};
use crate::AppState;

const ROUTE_TEMPLATES: &[&str] = &[
    "/repos/",
    "/repos/{key}/",
    "/repos/{key}/git/commits/",
    "/repos/{key}/git/commits/{sha}/",
    "/repos/{key}/git/commits/{sha}/merge-base/{sha}/",
    "/repos/{key}/git/trees/{sha}/",
    "/repos/{key}/git/blobs/{sha}/",
    "/repos/{key}/git/tags/{sha}/",
    "/repos/{key}/git/refs/",
    "/repos/{key}/git/refs/{ref_path}",
    "/repos/{key}/branches/",
    "/repos/{key}/branches/{name}/",
    "/repos/{key}/branches/{name}/merged/",
    "/repos/{key}/branches/{name}/unique-commits/sorted/{topological|chronological}/",
    "/repos/{key}/tags/",
    "/repos/{key}/tags/{name}/",
    "/repos/{key}/commits/{refspec}/",
    "/repos/{key}/commit/{refspec}.diff",
    "/repos/{key}/compare/{old}...{new}.diff",
    "/repos/{key}/contents/{path}",
    "/repos/{key}/raw/{refspec}/{path}",
    "/repos/{key}/blame/{refspec}/{path}",
    "/repos/{key}/contributors/",
    "/repos/{key}/zipball/{refspec}/",
    "/repos/{key}/tarball/{refspec}/",
];

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/repos/", get(list_repos))
        .route("/repos/{key}/", get(get_repo))
        .route("/repos/{key}/contributors/", get(get_contributors))
        .with_state(state)
}

async fn index() -> Json<&'static [&'static str]> {
    Json(ROUTE_TEMPLATES)
}

async fn list_repos(State(state): State<AppState>, base: BaseUrl) -> Result<Json<Vec<RepoResource>>> {
    let keys = sandbox::list_repositories(&state.config.repo_base_path)?;

    let repos = keys
        .iter()
        .map(|key| -> Result<RepoResource> {
            let description = match state.open_repo(key) {
                Ok(repo) => repo.description()?,
                Err(e) => {
                    tracing::debug!(key = %key, error = %e, "listing repository without description");
                    None
                }
            };
            Ok(convert_repo(&base.urls(key), key, description))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Json(repos))
}

async fn get_repo(
    State(state): State<AppState>,
    base: BaseUrl,
    Path(key): Path<RepoKey>,
) -> Result<Json<RepoResource>> {
    let repo = state.open_repo(&key)?;
    let description = repo.description()?;
    Ok(Json(convert_repo(&base.urls(&key), &key, description)))
}

async fn get_contributors(
    State(state): State<AppState>,
    Path(key): Path<RepoKey>,
) -> Result<Json<Vec<ContributorResource>>> {
    let repo = state.open_repo(&key)?;
    let contributors = history::contributors(&repo)?;
    Ok(Json(contributors.iter().map(convert_contributor).collect()))
}
