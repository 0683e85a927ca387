use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::auth::{DEFAULT_TOKEN_ENV, default_token_path};
use crate::cli::Cli;
use crate::error::{Error, Result};
use crate::mirror::{DEFAULT_TTL, MirrorStore};
use crate::sources::google::DEFAULT_API_URL;

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub api_url: Option<String>,
    pub token_env: Option<String>,
    pub token_path: Option<String>,
    pub cache_dir: Option<String>,
    pub cache_ttl: Option<u64>,
    pub cache: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub token_env: String,
    pub token_path: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub cache_ttl: u64,
    pub cache_enabled: bool,
}

impl Config {
    /// Read the config file (explicit `--config`, else the default location)
    /// and apply CLI overrides. Only an explicit path has to exist.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file_config = match &cli.config {
            Some(path) => {
                let path = Path::new(path);
                if !path.exists() {
                    return Err(Error::ConfigNotFound(path.to_path_buf()));
                }
                parse_config(&std::fs::read_to_string(path)?)?
            }
            None => match default_config_path() {
                Some(path) if path.exists() => parse_config(&std::fs::read_to_string(&path)?)?,
                _ => ConfigFile::default(),
            },
        };

        let config = merge(file_config, cli);
        validate_api_url(&config.api_url)?;
        Ok(config)
    }

    /// The mirror store this configuration describes. Without a usable cache
    /// location the store is disabled rather than failing the command.
    pub fn mirror_store(&self) -> MirrorStore {
        match (&self.cache_dir, self.cache_enabled) {
            (Some(dir), true) => MirrorStore::new(dir, Duration::from_secs(self.cache_ttl)),
            _ => MirrorStore::disabled(),
        }
    }
}

/// Default config file, `<user config dir>/gt/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gt").join("config.toml"))
}

pub fn parse_config(content: &str) -> Result<ConfigFile> {
    let config: ConfigFile = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ConfigFile) -> Result<()> {
    if let Some(ttl) = config.cache_ttl
        && ttl == 0
    {
        return Err(Error::ConfigValidation("cache_ttl must be > 0".to_string()));
    }
    if let Some(ref url) = config.api_url {
        validate_api_url(url)?;
    }
    if let Some(ref var) = config.token_env
        && var.trim().is_empty()
    {
        return Err(Error::ConfigValidation("token_env must not be empty".to_string()));
    }
    Ok(())
}

fn validate_api_url(url: &str) -> Result<()> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(Error::ConfigValidation(format!(
            "api_url must start with http:// or https:// (got: {url})"
        )))
    }
}

pub fn merge(file: ConfigFile, cli: &Cli) -> Config {
    Config {
        api_url: cli
            .api_url
            .clone()
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        token_env: file
            .token_env
            .unwrap_or_else(|| DEFAULT_TOKEN_ENV.to_string()),
        token_path: file
            .token_path
            .map(PathBuf::from)
            .or_else(default_token_path),
        cache_dir: cli
            .cache_dir
            .clone()
            .or(file.cache_dir)
            .map(PathBuf::from)
            .or_else(MirrorStore::default_dir),
        cache_ttl: file.cache_ttl.unwrap_or(DEFAULT_TTL.as_secs()),
        cache_enabled: !cli.no_cache && file.cache.unwrap_or(true),
    }
}
