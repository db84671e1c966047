//! Error types for ytdlcmd-core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, YtDlCmdError>;

#[derive(Error, Debug)]
pub enum YtDlCmdError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Execution failed: {0}")]
    Exec(#[from] ExecError),

    #[error("Invalid request: {0}")]
    Request(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(String),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),

    #[error("Cannot prepare directory {path}: {source}")]
    Directory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("yt-dlp not found. Install it or set paths.yt_dlp in the config")]
    YtDlpNotFound,

    #[error("Failed to write config file {path}: {source}")]
    ConfigFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("yt-dlp failed with exit code {code:?}: {tail}")]
    Failed { code: Option<i32>, tail: String },

    #[error("Failed to parse video info: {0}")]
    InfoParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
