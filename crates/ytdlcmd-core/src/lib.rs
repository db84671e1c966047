//! ytdlcmd-core: yt-dlp command construction from structured download requests

pub mod args;
mod audio;
pub mod builder;
pub mod config;
pub mod error;
pub mod executor;
pub mod info;
pub mod keys;
pub mod preferences;
pub mod providers;
pub mod quality;
pub mod request;
pub mod url;
mod video;

#[cfg(test)]
mod testing;

pub use builder::{BuiltCommand, CommandBuilder};
pub use config::Config;
pub use error::{Result, YtDlCmdError};
pub use request::DownloadRequest;
