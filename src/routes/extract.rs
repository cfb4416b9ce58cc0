//! Request helpers shared by the handlers: the link base URL and parsing of
//! path and query parameters.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use crate::AppState;
use crate::convert::Urls;
use crate::error::{AppError, Result};
use crate::git::RepoKey;
use crate::git::resolve::is_valid_sha;

/// Base that absolute resource links are built from: the configured public
/// URL, otherwise `http://<Host header>`.
#[derive(Debug, Clone)]
pub struct BaseUrl(pub String);

impl BaseUrl {
    pub fn urls(&self, key: &RepoKey) -> Urls {
        Urls::new(&self.0, key)
    }
}

impl FromRequestParts<AppState> for BaseUrl {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        if let Some(public) = &state.config.public_url {
            return Ok(BaseUrl(public.trim_end_matches('/').to_string()));
        }

        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .or_else(|| parts.uri.authority().map(|a| a.to_string()))
            .unwrap_or_else(|| "localhost".to_string());
        Ok(BaseUrl(format!("http://{}", host)))
    }
}

/// SHA path segments must be 1-40 hex characters; anything else is a 404
/// before any lookup happens.
pub fn sha_segment(sha: &str) -> Result<&str> {
    if is_valid_sha(sha) {
        Ok(sha)
    } else {
        Err(AppError::not_found("not found"))
    }
}

/// Commit list `limit`: absent or empty means `default`.
pub fn parse_limit(raw: Option<&str>, default: usize) -> Result<usize> {
    match raw {
        None | Some("") => Ok(default),
        Some(raw) => match raw.parse::<i64>() {
            Ok(limit) if limit >= 0 => Ok(limit as usize),
            _ => Err(AppError::bad_request("invalid limit")),
        },
    }
}

/// Diff `context` lines: absent means `default`.
pub fn parse_context(raw: Option<&str>, default: u32) -> Result<u32> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let context: i64 = raw
        .parse()
        .map_err(|_| AppError::bad_request("context was not a valid integer"))?;
    if context < 0 {
        return Err(AppError::bad_request("context must not be negative"));
    }
    u32::try_from(context).map_err(|_| AppError::bad_request("context was not a valid integer"))
}

/// Empty query values count as absent.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits() {
        assert_eq!(parse_limit(None, 50).unwrap(), 50);
        assert_eq!(parse_limit(Some(""), 50).unwrap(), 50);
        assert_eq!(parse_limit(Some("0"), 50).unwrap(), 0);
        assert_eq!(parse_limit(Some("7"), 50).unwrap(), 7);
        assert_eq!(parse_limit(Some("-1"), 50).unwrap_err().to_string(), "invalid limit");
        assert_eq!(parse_limit(Some("ten"), 50).unwrap_err().to_string(), "invalid limit");
    }

    #[test]
    fn contexts() {
        assert_eq!(parse_context(None, 3).unwrap(), 3);
        assert_eq!(parse_context(Some("0"), 3).unwrap(), 0);
        assert!(matches!(parse_context(Some("-2"), 3), Err(AppError::BadRequest(_))));
        assert!(matches!(parse_context(Some("x"), 3), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn sha_segments() {
        assert!(sha_segment("abc123").is_ok());
        assert!(matches!(sha_segment("master"), Err(AppError::NotFound(_))));
        assert!(matches!(sha_segment(&"a".repeat(41)), Err(AppError::NotFound(_))));
    }
}
