//! File contents endpoints.
//!
//! - GET /repos/{key}/contents/{*path}?ref=
//!   A file with its content, or a directory listing sorted by name. `ref`
//!   defaults to the configured contents ref.
//! - GET /repos/{key}/raw/{refspec}/{*path}
//!   Raw file bytes with a MIME type guessed from the file name.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::extract::{non_empty, BaseUrl};
use crate::convert::{convert_contents_entry, Urls};
use crate::error::{AppError, Result};
use crate::git::backend::{Backend, EntryKind, Object, Tree};
use crate::git::{resolve, GitRepository, RepoKey};
use crate::models::{Contents, ContentsEntry};
use crate::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/repos/{key}/contents/", get(get_root_contents))
        .route("/repos/{key}/contents/{*path}", get(get_contents))
        .route("/repos/{key}/raw/{refspec}/{*path}", get(get_raw))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ContentsQuery {
    #[serde(rename = "ref")]
    refspec: Option<String>,
}

async fn get_root_contents(
    State(state): State<AppState>,
    base: BaseUrl,
    Path(key): Path<RepoKey>,
    Query(query): Query<ContentsQuery>,
) -> Result<Json<Contents>> {
    contents_at(&state, &base, &key, "", &query)
}

async fn get_contents(
    State(state): State<AppState>,
    base: BaseUrl,
    Path((key, path)): Path<(RepoKey, String)>,
    Query(query): Query<ContentsQuery>,
) -> Result<Json<Contents>> {
    contents_at(&state, &base, &key, &path, &query)
}

fn contents_at(
    state: &AppState,
    base: &BaseUrl,
    key: &RepoKey,
    path: &str,
    query: &ContentsQuery,
) -> Result<Json<Contents>> {
    let refspec = non_empty(&query.refspec).unwrap_or(&state.config.default_contents_ref);
    let repo = state.open_repo(key)?;
    let commit = resolve::commit_for_refspec(&repo, refspec)?;
    let tree = resolve::tree_by_sha(&repo, &commit.tree_sha)?;
    let object = resolve::object_at_path(&repo, tree, path)?;
    let urls = base.urls(key);

    match object {
        Object::Tree(dir) => Ok(Json(Contents::Dir(list_dir(&repo, &urls, refspec, path, dir)?))),
        other => convert_contents_entry(&urls, refspec, path, &other, true)
            .map(|entry| Json(Contents::File(entry)))
            .ok_or_else(|| AppError::not_found("invalid path; no such object")),
    }
}

fn list_dir(
    repo: &GitRepository,
    urls: &Urls,
    refspec: &str,
    path: &str,
    dir: Tree,
) -> Result<Vec<ContentsEntry>> {
    let mut entries = Vec::with_capacity(dir.entries.len());
    for entry in dir.entries {
        let child_path = join(path, &entry.name);
        if entry.kind == EntryKind::Submodule {
            tracing::debug!(path = %child_path, "submodules have no contents entry");
            continue;
        }
        let Some(object) = repo.find_object(&entry.sha)? else {
            return Err(AppError::Internal(format!("missing object {}", entry.sha)));
        };
        if let Some(converted) = convert_contents_entry(urls, refspec, &child_path, &object, false) {
            entries.push(converted);
        }
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn join(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

async fn get_raw(
    State(state): State<AppState>,
    Path((key, refspec, path)): Path<(RepoKey, String, String)>,
) -> Result<impl IntoResponse> {
    let repo = state.open_repo(&key)?;
    let commit = resolve::commit_for_refspec(&repo, &refspec)?;
    let tree = resolve::tree_by_sha(&repo, &commit.tree_sha)?;
    let Object::Blob(blob) = resolve::object_at_path(&repo, tree, &path)? else {
        return Err(AppError::bad_request("path resolved to non-blob object"));
    };

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    Ok(([(header::CONTENT_TYPE, mime.to_string())], blob.data))
}
