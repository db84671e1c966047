pub mod batch;
pub mod build;
pub mod config;
pub mod info;
pub mod run;

use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use ytdlcmd_core::{
    executor::{promote_staged, ExecEvent, Executor},
    providers::AppPaths,
    BuiltCommand, CommandBuilder, Config, DownloadRequest, Result,
};

/// Configuration plus the filesystem layout derived from it.
pub struct Session {
    pub config: Config,
    pub paths: AppPaths,
}

impl Session {
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load(config_path)?;
        let paths = AppPaths::from_config(&config.paths)?;
        Ok(Self { config, paths })
    }

    /// Build a request, assigning it an id first if it has none.
    pub fn build(&self, request: &mut DownloadRequest) -> BuiltCommand {
        request.ensure_id();
        CommandBuilder::new(&self.config.preferences, &self.paths, &self.config.catalog).build(request)
    }
}

pub async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Run a built command and move staged output into the request's destination.
pub async fn execute(
    executor: &Executor,
    request: &DownloadRequest,
    built: &BuiltCommand,
    events: Option<mpsc::Sender<ExecEvent>>,
) -> Result<Vec<PathBuf>> {
    let outcome = executor.run(built, events).await?;

    if !built.staged {
        return Ok(outcome.final_paths);
    }

    let destination = if request.download_path.trim().is_empty() {
        std::env::current_dir()?
    } else {
        PathBuf::from(&request.download_path)
    };
    Ok(promote_staged(Path::new(&built.download_dir), &destination).await?)
}

pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
