use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

pub const DEFAULT_TOKEN_ENV: &str = "GT_ACCESS_TOKEN";
const TOKEN_FILE: &str = "token.json";

/// Token file written by an OAuth login flow.
#[derive(Debug, Deserialize)]
struct StoredToken {
    access_token: String,
    expiry: Option<DateTime<Utc>>,
}

/// Default token location, `<user config dir>/gt/token.json`.
pub fn default_token_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gt").join(TOKEN_FILE))
}

/// Resolve the access token: env var first, then the stored token file.
pub fn resolve_token(token_env: &str, token_path: Option<&Path>) -> Result<String> {
    resolve_token_with(token_env, token_path, Utc::now(), |key| std::env::var(key).ok())
}

fn resolve_token_with(
    token_env: &str,
    token_path: Option<&Path>,
    now: DateTime<Utc>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<String> {
    if let Some(token) = lookup(token_env)
        && !token.trim().is_empty()
    {
        debug!(var = token_env, "using access token from environment");
        return Ok(token.trim().to_string());
    }

    if let Some(path) = token_path
        && let Ok(contents) = std::fs::read_to_string(path)
    {
        let stored: StoredToken = serde_json::from_str(&contents)
            .map_err(|e| Error::Auth(format!("invalid token file {}: {e}", path.display())))?;

        // A zero year is how some writers spell "no expiry".
        if let Some(expiry) = stored.expiry
            && expiry.year() > 1
            && expiry <= now
        {
            return Err(Error::Auth(format!(
                "stored access token in {} expired at {expiry}; set ${token_env} or log in again",
                path.display()
            )));
        }

        debug!(path = %path.display(), "using access token from token file");
        return Ok(stored.access_token);
    }

    let location = token_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "the token file".to_string());
    Err(Error::Auth(format!(
        "no access token found in ${token_env} or {location}"
    )))
}

/// Delete the stored token. Returns whether a file was removed.
pub fn remove_token(token_path: Option<&Path>) -> Result<bool> {
    let Some(path) = token_path else {
        return Ok(false);
    };
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::Io(e)),
    }
}
