//! Configuration management for ytdlcmd

use crate::error::ConfigError;
use crate::preferences::Preferences;
use crate::providers::Catalog;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    /// Download preferences, keyed as in [`crate::keys`]
    pub preferences: Preferences,
    /// Labels and option lists, overridable for localization
    pub catalog: Catalog,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Path to yt-dlp binary (looked up on PATH if not set)
    pub yt_dlp: Option<PathBuf>,
    /// Application data directory (cookies, archive, default cache)
    pub app_dir: Option<PathBuf>,
    /// Staging directory for in-progress downloads
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum parallel downloads
    pub max_parallel: usize,
    /// Continue on error
    pub continue_on_error: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_parallel: 1,
            continue_on_error: true,
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Load from default config directory
        if let Some(config_dir) = dirs::config_dir() {
            let default_config = config_dir.join("ytdlcmd/config.toml");
            if default_config.exists() {
                figment = figment.merge(Toml::file(&default_config));
            }
        }

        // Load from specified config file
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }

        // Preference keys contain underscores, so nesting uses a double underscore
        figment = figment.merge(Env::prefixed("YTDLCMD_").split("__"));

        figment.extract().map_err(|e| ConfigError::LoadError(e.to_string()))
    }

    /// Get yt-dlp path, looking it up on PATH if not configured
    pub fn yt_dlp_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.paths.yt_dlp {
            Ok(path.clone())
        } else {
            which::which("yt-dlp")
                .map_err(|_| ConfigError::InvalidValue("yt-dlp not found in PATH".to_string()))
        }
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ConfigAccessor, OptionCatalog};
    use std::io::Write;

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [paths]
            cache_dir = "/tmp/ytdlcmd-cache"

            [preferences]
            cache_downloads = false
            thumbnail_format = "png"

            [catalog.strings]
            best_quality = "Beste Qualität"

            [batch]
            max_parallel = 3
            "#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.paths.cache_dir, Some(PathBuf::from("/tmp/ytdlcmd-cache")));
        assert!(!config.preferences.get_bool("cache_downloads", true));
        assert_eq!(config.preferences.get_string("thumbnail_format", "jpg"), "png");
        assert_eq!(config.catalog.string("best_quality"), "Beste Qualität");
        // Untouched catalog entries keep their defaults
        assert_eq!(config.catalog.string("worst_quality"), "Worst Quality");
        assert_eq!(config.batch.max_parallel, 3);
    }

    #[test]
    fn test_configured_yt_dlp_path_wins() {
        let mut config = Config::default();
        config.paths.yt_dlp = Some(PathBuf::from("/opt/bin/yt-dlp"));
        assert_eq!(config.yt_dlp_path().unwrap(), PathBuf::from("/opt/bin/yt-dlp"));
    }

    #[test]
    fn test_renders_as_toml() {
        let config = Config::default();
        let rendered = config.to_toml_string().unwrap();
        assert!(rendered.contains("[batch]"));
        assert!(rendered.contains("max_parallel = 1"));
    }
}
