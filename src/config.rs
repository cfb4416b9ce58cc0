//! Command-line and environment configuration.
//!
//! Every option can also be supplied through a `GITREST_*` environment
//! variable. The parsed `Config` is immutable and shared behind an `Arc`.

use std::path::PathBuf;
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method};
use clap::{Parser, ValueEnum};
use tower_http::cors::{AllowOrigin, CorsLayer};

const THIRTY_DAYS_SECS: u64 = 30 * 24 * 60 * 60;

/// What a commit diff does for a commit without parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RootCommitDiff {
    /// Diff against the empty tree, so every file shows up as added.
    #[default]
    EmptyTree,
    /// Answer 404 "commit has no parents".
    NotFound,
}

/// Timestamp stamped on every entry of a generated archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ArchiveMtime {
    /// Time the archive is generated.
    #[default]
    WallClock,
    /// Committer time of the archived commit.
    Commit,
}

/// gitrest - read-only HTTP/JSON API over git repositories
#[derive(Debug, Clone, Parser)]
#[command(name = "gitrest")]
#[command(about = "Serve git repositories as a read-only HTTP/JSON API", long_about = None)]
pub struct Config {
    /// Directory containing the repositories to expose
    #[arg(value_name = "REPO_BASE_PATH", env = "GITREST_REPO_BASE_PATH")]
    pub repo_base_path: PathBuf,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "GITREST_HOST")]
    pub host: String,

    /// Port to run the server on
    #[arg(short, long, default_value_t = 3001, env = "GITREST_PORT")]
    pub port: u16,

    /// Absolute base URL used in resource links (default: http://<Host header>)
    #[arg(long, env = "GITREST_PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Number of commits returned by the commit list when no limit is given
    #[arg(long, default_value_t = 50, env = "GITREST_DEFAULT_COMMIT_LIMIT")]
    pub default_commit_limit: usize,

    /// Refspec used by the contents endpoint when no `ref` is given
    #[arg(long, default_value = "master", env = "GITREST_DEFAULT_CONTENTS_REF")]
    pub default_contents_ref: String,

    /// Behaviour of commit diffs for root commits
    #[arg(long, value_enum, default_value_t = RootCommitDiff::EmptyTree, env = "GITREST_ROOT_COMMIT_DIFF")]
    pub root_commit_diff: RootCommitDiff,

    /// Source of the timestamp written into archives
    #[arg(long, value_enum, default_value_t = ArchiveMtime::WallClock, env = "GITREST_ARCHIVE_MTIME")]
    pub archive_mtime: ArchiveMtime,

    /// Add CORS headers to responses
    #[arg(long, env = "GITREST_ENABLE_CORS")]
    pub enable_cors: bool,

    #[arg(long, default_value = "*", env = "GITREST_CORS_ALLOWED_ORIGIN")]
    pub cors_allowed_origin: String,

    #[arg(long, env = "GITREST_CORS_ALLOW_CREDENTIALS")]
    pub cors_allow_credentials: bool,

    /// Comma separated list of request headers clients may send
    #[arg(long, value_delimiter = ',', env = "GITREST_CORS_ALLOWED_HEADERS")]
    pub cors_allowed_headers: Vec<String>,

    /// Preflight cache lifetime in seconds
    #[arg(long, default_value_t = THIRTY_DAYS_SECS, env = "GITREST_CORS_MAX_AGE")]
    pub cors_max_age: u64,
}

impl Config {
    /// Defaults for everything except the base path.
    pub fn with_base_path(repo_base_path: impl Into<PathBuf>) -> Self {
        Config {
            repo_base_path: repo_base_path.into(),
            host: "127.0.0.1".into(),
            port: 3001,
            public_url: None,
            default_commit_limit: 50,
            default_contents_ref: "master".into(),
            root_commit_diff: RootCommitDiff::default(),
            archive_mtime: ArchiveMtime::default(),
            enable_cors: false,
            cors_allowed_origin: "*".into(),
            cors_allow_credentials: false,
            cors_allowed_headers: Vec::new(),
            cors_max_age: THIRTY_DAYS_SECS,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the CORS layer, or `None` when CORS is disabled.
    pub fn cors_layer(&self) -> anyhow::Result<Option<CorsLayer>> {
        if !self.enable_cors {
            return Ok(None);
        }

        // wildcard origins cannot be combined with credentials
        let origin = match (self.cors_allowed_origin.as_str(), self.cors_allow_credentials) {
            ("*", false) => AllowOrigin::any(),
            ("*", true) => AllowOrigin::mirror_request(),
            (origin, _) => AllowOrigin::exact(HeaderValue::from_str(origin)?),
        };

        let mut cors = CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
            .allow_credentials(self.cors_allow_credentials)
            .max_age(Duration::from_secs(self.cors_max_age));

        let headers = self
            .cors_allowed_headers
            .iter()
            .filter(|h| !h.trim().is_empty())
            .map(|h| HeaderName::from_bytes(h.trim().as_bytes()))
            .collect::<Result<Vec<_>, _>>()?;
        if !headers.is_empty() {
            cors = cors.allow_headers(headers);
        }

        Ok(Some(cors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults() {
        let config = Config::try_parse_from(["gitrest", "/srv/git"]).unwrap();
        assert_eq!(config.repo_base_path, PathBuf::from("/srv/git"));
        assert_eq!(config.port, 3001);
        assert_eq!(config.default_commit_limit, 50);
        assert_eq!(config.default_contents_ref, "master");
        assert_eq!(config.root_commit_diff, RootCommitDiff::EmptyTree);
        assert_eq!(config.archive_mtime, ArchiveMtime::WallClock);
        assert_eq!(config.cors_max_age, THIRTY_DAYS_SECS);
        assert!(!config.enable_cors);
    }

    #[test]
    fn parses_enum_options() {
        let config = Config::try_parse_from([
            "gitrest",
            "/srv/git",
            "--root-commit-diff",
            "not-found",
            "--archive-mtime",
            "commit",
            "--cors-allowed-headers",
            "X-Requested-With,Authorization",
        ])
        .unwrap();
        assert_eq!(config.root_commit_diff, RootCommitDiff::NotFound);
        assert_eq!(config.archive_mtime, ArchiveMtime::Commit);
        assert_eq!(config.cors_allowed_headers, vec!["X-Requested-With", "Authorization"]);
    }

    #[test]
    fn cors_layer_only_when_enabled() {
        let mut config = Config::with_base_path("/srv/git");
        assert!(config.cors_layer().unwrap().is_none());

        config.enable_cors = true;
        config.cors_allow_credentials = true;
        assert!(config.cors_layer().unwrap().is_some());

        config.cors_allowed_origin = "bad\norigin".into();
        assert!(config.cors_layer().is_err());
    }
}
