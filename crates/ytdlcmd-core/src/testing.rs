//! Fixtures shared by the builder tests.

use crate::builder::CommandBuilder;
use crate::providers::PathResolver;
use crate::request::AudioPreferences;

pub use crate::preferences::Preferences;
pub use crate::providers::Catalog;
pub use crate::request::{DownloadRequest, Format, Payload};

pub const CACHE: &str = "/cache";
pub const DOWNLOADS: &str = "/home/me/Downloads";
pub const COOKIES: &str = "/app/cookies.txt";
pub const ARCHIVE: &str = "/app/download_archive.txt";
pub const REQUEST_ID: i64 = 42;

/// In-memory path resolver with fixed locations.
#[derive(Debug, Clone)]
pub struct FakePaths {
    pub writable: bool,
    pub cookies: Option<String>,
}

impl Default for FakePaths {
    fn default() -> Self {
        Self {
            writable: true,
            cookies: Some(COOKIES.to_string()),
        }
    }
}

impl PathResolver for FakePaths {
    fn cache_path(&self) -> String {
        CACHE.to_string()
    }

    fn format_path(&self, path: &str) -> String {
        path.to_string()
    }

    fn can_write(&self, _path: &str) -> bool {
        self.writable
    }

    fn cookie_file_path(&self) -> Option<String> {
        self.cookies.clone()
    }

    fn download_archive_path(&self) -> String {
        ARCHIVE.to_string()
    }
}

pub fn builder(prefs: Preferences) -> CommandBuilder<Preferences, FakePaths, Catalog> {
    CommandBuilder::new(prefs, FakePaths::default(), Catalog::default())
}

pub fn video_request(url: &str) -> DownloadRequest {
    DownloadRequest {
        id: REQUEST_ID,
        url: url.to_string(),
        download_path: DOWNLOADS.to_string(),
        ..Default::default()
    }
}

pub fn audio_request(url: &str) -> DownloadRequest {
    DownloadRequest {
        payload: Payload::Audio(AudioPreferences::default()),
        ..video_request(url)
    }
}
