//! gitrest - a read-only HTTP/JSON API over the object graphs of the git
//! repositories below a base directory.
//!
//! Layers, from the outside in:
//! - `routes`: axum handlers, one router per feature area
//! - `convert` / `models`: JSON resources and the links inside them
//! - `git`: sandboxing, object resolution, tree flattening, diffs, blame,
//!   archives and history queries, all over the `Backend` trait
//! - `git::repository`: the libgit2 binding of that trait

pub mod config;
pub mod convert;
pub mod error;
pub mod git;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::Result;
use crate::git::{GitRepository, RepoKey, sandbox};

/// Process-wide state handed to every handler. Repositories are opened per
/// request; only the configuration is shared.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        AppState {
            config: Arc::new(config),
        }
    }

    pub fn open_repo(&self, key: &RepoKey) -> Result<GitRepository> {
        sandbox::open(&self.config.repo_base_path, key)
    }
}

/// Builds the full application: routes, tracing and (if enabled) CORS.
pub fn app(config: Config) -> anyhow::Result<Router> {
    let cors = config.cors_layer()?;
    let state = AppState::new(config);

    let mut app = routes::create_router(state).layer(TraceLayer::new_for_http());
    if let Some(cors) = cors {
        app = app.layer(cors);
    }
    Ok(app)
}
