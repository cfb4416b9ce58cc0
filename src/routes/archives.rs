//! Archive endpoints.
//!
//! - GET /repos/{key}/zipball/{refspec}/
//! - GET /repos/{key}/tarball/{refspec}/
//!
//! Archives are generated from scratch on every request on the blocking
//! pool, into an unlinked temporary file that is streamed back as an
//! attachment. Nothing is cached.

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio_util::io::ReaderStream;

use crate::error::{AppError, Result};
use crate::git::archive::{archive_mtime, attachment_name, build_archive, ArchiveFormat};
use crate::git::{resolve, RepoKey};
use crate::AppState;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/repos/{key}/zipball/{refspec}/", get(get_zipball))
        .route("/repos/{key}/tarball/{refspec}/", get(get_tarball))
        .with_state(state)
}

async fn get_zipball(
    State(state): State<AppState>,
    Path((key, refspec)): Path<(RepoKey, String)>,
) -> Result<Response> {
    serve_archive(state, key, refspec, ArchiveFormat::Zip).await
}

async fn get_tarball(
    State(state): State<AppState>,
    Path((key, refspec)): Path<(RepoKey, String)>,
) -> Result<Response> {
    serve_archive(state, key, refspec, ArchiveFormat::Tarball).await
}

async fn serve_archive(state: AppState, key: RepoKey, refspec: String, format: ArchiveFormat) -> Result<Response> {
    let filename = attachment_name(&key, &refspec, format);

    let file = tokio::task::spawn_blocking(move || {
        let repo = state.open_repo(&key)?;
        let commit = resolve::commit_for_refspec(&repo, &refspec)?;
        let mtime = archive_mtime(state.config.archive_mtime, &commit);
        build_archive(&repo, &key, &commit, format, mtime)
    })
    .await
    .map_err(|e| AppError::Internal(format!("archive task failed: {}", e)))??;

    let length = file.metadata()?.len();
    let body = Body::from_stream(ReaderStream::new(tokio::fs::File::from_std(file)));

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (header::CONTENT_LENGTH, length.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename.replace('"', "")),
            ),
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate".to_string()),
            (header::EXPIRES, "0".to_string()),
        ],
        body,
    )
        .into_response())
}
