//! Read-only capabilities the command builder depends on, plus the
//! filesystem and English-catalog implementations used by the CLI.

use crate::config::PathsConfig;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Typed access to stored user preferences.
///
/// Implementations return `default` for missing keys and for values that
/// cannot be read as the requested type.
pub trait ConfigAccessor {
    fn get_bool(&self, key: &str, default: bool) -> bool;
    fn get_string(&self, key: &str, default: &str) -> String;
    fn get_int(&self, key: &str, default: i64) -> i64;
    fn get_string_set(&self, key: &str, default: &[&str]) -> BTreeSet<String>;
}

/// Storage locations used while building a command.
pub trait PathResolver {
    fn cache_path(&self) -> String;
    fn format_path(&self, path: &str) -> String;
    fn can_write(&self, path: &str) -> bool;
    fn cookie_file_path(&self) -> Option<String>;
    fn download_archive_path(&self) -> String;
}

/// Localized labels and fixed option lists.
pub trait OptionCatalog {
    fn string(&self, key: &str) -> String;
    fn string_array(&self, key: &str) -> Vec<String>;
}

impl<T: ConfigAccessor + ?Sized> ConfigAccessor for &T {
    fn get_bool(&self, key: &str, default: bool) -> bool {
        (**self).get_bool(key, default)
    }

    fn get_string(&self, key: &str, default: &str) -> String {
        (**self).get_string(key, default)
    }

    fn get_int(&self, key: &str, default: i64) -> i64 {
        (**self).get_int(key, default)
    }

    fn get_string_set(&self, key: &str, default: &[&str]) -> BTreeSet<String> {
        (**self).get_string_set(key, default)
    }
}

impl<T: PathResolver + ?Sized> PathResolver for &T {
    fn cache_path(&self) -> String {
        (**self).cache_path()
    }

    fn format_path(&self, path: &str) -> String {
        (**self).format_path(path)
    }

    fn can_write(&self, path: &str) -> bool {
        (**self).can_write(path)
    }

    fn cookie_file_path(&self) -> Option<String> {
        (**self).cookie_file_path()
    }

    fn download_archive_path(&self) -> String {
        (**self).download_archive_path()
    }
}

impl<T: OptionCatalog + ?Sized> OptionCatalog for &T {
    fn string(&self, key: &str) -> String {
        (**self).string(key)
    }

    fn string_array(&self, key: &str) -> Vec<String> {
        (**self).string_array(key)
    }
}

/// Application directories on the local filesystem.
///
/// Directories and the archive file are created up front, so a path that
/// cannot be prepared fails here instead of during a build.
#[derive(Debug, Clone)]
pub struct AppPaths {
    app_dir: PathBuf,
    cache_dir: PathBuf,
}

impl AppPaths {
    pub fn new(app_dir: PathBuf, cache_dir: PathBuf) -> Result<Self, ConfigError> {
        ensure_dir(&app_dir)?;
        ensure_dir(&cache_dir)?;

        let archive = app_dir.join(ARCHIVE_FILE);
        if !archive.exists() {
            fs::File::create(&archive).map_err(|source| ConfigError::Directory {
                path: archive.display().to_string(),
                source,
            })?;
        }

        debug!("App directory: {}", app_dir.display());
        Ok(Self { app_dir, cache_dir })
    }

    pub fn from_config(paths: &PathsConfig) -> Result<Self, ConfigError> {
        let app_dir = match paths.app_dir {
            Some(ref dir) => dir.clone(),
            None => dirs::config_dir()
                .map(|d| d.join("ytdlcmd"))
                .ok_or_else(|| ConfigError::InvalidValue("no config directory available".to_string()))?,
        };
        let cache_dir = paths
            .cache_dir
            .clone()
            .unwrap_or_else(|| app_dir.join("cache"));

        Self::new(app_dir, cache_dir)
    }
}

const ARCHIVE_FILE: &str = "download_archive.txt";
const COOKIE_FILE: &str = "cookies.txt";

fn ensure_dir(path: &Path) -> Result<(), ConfigError> {
    fs::create_dir_all(path).map_err(|source| ConfigError::Directory {
        path: path.display().to_string(),
        source,
    })
}

impl PathResolver for AppPaths {
    fn cache_path(&self) -> String {
        self.format_path(&self.cache_dir.to_string_lossy())
    }

    fn format_path(&self, path: &str) -> String {
        path.replace('\\', "/")
    }

    fn can_write(&self, path: &str) -> bool {
        // Permission bits say nothing about ACLs or read-only mounts
        Path::new(path).is_dir() && tempfile::tempfile_in(path).is_ok()
    }

    fn cookie_file_path(&self) -> Option<String> {
        let cookies = self.app_dir.join(COOKIE_FILE);
        cookies
            .exists()
            .then(|| self.format_path(&cookies.to_string_lossy()))
    }

    fn download_archive_path(&self) -> String {
        self.format_path(&self.app_dir.join(ARCHIVE_FILE).to_string_lossy())
    }
}

/// Label catalog. Unknown string keys resolve to the key itself and unknown
/// arrays to an empty list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub strings: BTreeMap<String, String>,
    #[serde(default)]
    pub arrays: BTreeMap<String, Vec<String>>,
}

impl Catalog {
    pub const BEST_QUALITY: &'static str = "best_quality";
    pub const WORST_QUALITY: &'static str = "worst_quality";
    pub const AUDIO_CONTAINERS: &'static str = "audio_containers";
    pub const VIDEO_CONTAINERS: &'static str = "video_containers";
}

impl Default for Catalog {
    fn default() -> Self {
        let strings = [
            (Self::BEST_QUALITY, "Best Quality"),
            (Self::WORST_QUALITY, "Worst Quality"),
        ];

        let arrays: [(&str, &[&str]); 2] = [
            (Self::AUDIO_CONTAINERS, &["Default", "mp3", "m4a", "aac", "alac", "flac", "opus", "wav"]),
            (Self::VIDEO_CONTAINERS, &["Default", "mp4", "webm", "mkv", "mov", "avi", "flv", "gif"]),
        ];

        Self {
            strings: strings
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            arrays: arrays
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
                .collect(),
        }
    }
}

impl OptionCatalog for Catalog {
    fn string(&self, key: &str) -> String {
        self.strings
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    fn string_array(&self, key: &str) -> Vec<String> {
        self.arrays.get(key).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_fallbacks() {
        let catalog = Catalog::default();
        assert_eq!(catalog.string(Catalog::BEST_QUALITY), "Best Quality");
        assert_eq!(catalog.string("missing_label"), "missing_label");
        assert!(catalog.string_array("missing_array").is_empty());
        assert!(catalog
            .string_array(Catalog::AUDIO_CONTAINERS)
            .contains(&"opus".to_string()));
    }

    #[test]
    fn test_app_paths_prepares_layout() {
        let root = tempfile::tempdir().unwrap();
        let app_dir = root.path().join("app");
        let paths = AppPaths::new(app_dir.clone(), app_dir.join("cache")).unwrap();

        assert!(app_dir.join("cache").is_dir());
        assert!(app_dir.join(ARCHIVE_FILE).is_file());
        assert!(paths.download_archive_path().ends_with("download_archive.txt"));
        assert!(paths.can_write(&paths.cache_path()));
        assert!(!paths.can_write(&root.path().join("missing").to_string_lossy()));
    }

    #[test]
    fn test_can_write_needs_a_directory() {
        let root = tempfile::tempdir().unwrap();
        let paths = AppPaths::new(root.path().to_path_buf(), root.path().join("cache")).unwrap();
        let file = root.path().join(ARCHIVE_FILE);

        assert!(paths.can_write(&root.path().to_string_lossy()));
        assert!(!paths.can_write(&file.to_string_lossy()));
    }

    #[test]
    fn test_cookie_file_only_when_present() {
        let root = tempfile::tempdir().unwrap();
        let paths = AppPaths::new(root.path().to_path_buf(), root.path().join("cache")).unwrap();
        assert_eq!(paths.cookie_file_path(), None);

        fs::write(root.path().join(COOKIE_FILE), "# Netscape HTTP Cookie File\n").unwrap();
        assert!(paths.cookie_file_path().unwrap().ends_with("cookies.txt"));
    }

    #[test]
    fn test_format_path_normalizes_separators() {
        let root = tempfile::tempdir().unwrap();
        let paths = AppPaths::new(root.path().to_path_buf(), root.path().join("cache")).unwrap();
        assert_eq!(paths.format_path(r"C:\Users\me\Music"), "C:/Users/me/Music");
    }
}
