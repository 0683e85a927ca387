use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    ConfigValidation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error(
        "task ID '{prefix}' matches multiple tasks in list '{scope}' ({}), please use a longer ID",
        .matches.join(", ")
    )]
    AmbiguousId {
        prefix: String,
        scope: String,
        matches: Vec<String>,
    },

    #[error("remote error: {0}")]
    Transport(String),

    #[error("cache error: {0}")]
    Persistence(String),

    #[error("auth error: {0}")]
    Auth(String),

    #[error("{0}")]
    Selection(String),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
