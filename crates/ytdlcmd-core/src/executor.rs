//! Runs built commands through yt-dlp.

use crate::builder::BuiltCommand;
use crate::config::Config;
use crate::error::ExecError;
use crate::info::VideoInfo;
use regex::Regex;
use std::collections::VecDeque;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::OnceLock;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Lines of output kept for error reports.
const TAIL_LINES: usize = 20;

/// Suffixes of files yt-dlp leaves behind while a download is unfinished.
const PARTIAL_SUFFIXES: &[&str] = &[".part", ".ytdl", ".temp"];

#[derive(Debug, Clone, PartialEq)]
pub enum ExecEvent {
    /// Download progress in percent
    Progress(f32),
    Line(String),
}

#[derive(Debug, Clone)]
pub struct ExecOutcome {
    pub exit_code: Option<i32>,
    /// Final file paths printed by yt-dlp after moving them into place
    pub final_paths: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Executor {
    yt_dlp_path: PathBuf,
}

fn progress_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\[download\]\s+(\d+(?:\.\d+)?)%").expect("progress pattern is valid")
    })
}

/// Percentage from a `[download]  42.0% of ...` line.
pub fn parse_progress(line: &str) -> Option<f32> {
    progress_pattern()
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Existing file named by an `after_move` print line.
///
/// The print template wraps the path in single quotes, which yt-dlp
/// outputs verbatim.
pub fn printed_path(line: &str) -> Option<PathBuf> {
    let line = line.trim();
    if line.starts_with('[') {
        return None;
    }
    let path = Path::new(line.trim_matches('\''));
    path.is_file().then(|| path.to_path_buf())
}

/// Next output line without its terminator. Invalid UTF-8 is replaced
/// rather than ending the stream.
async fn next_line_lossy<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    while matches!(buf.last(), Some(b'\n' | b'\r')) {
        buf.pop();
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

fn push_tail(tail: &mut VecDeque<String>, line: String) {
    if tail.len() == TAIL_LINES {
        tail.pop_front();
    }
    tail.push_back(line);
}

fn last_lines(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    lines[lines.len().saturating_sub(TAIL_LINES)..].join("\n")
}

/// Write the option text to the path the command expects.
pub async fn write_config_file(built: &BuiltCommand) -> Result<PathBuf, ExecError> {
    let path = PathBuf::from(&built.config_path);
    let io_error = |source| ExecError::ConfigFile {
        path: built.config_path.clone(),
        source,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
    }
    tokio::fs::write(&path, built.config_text())
        .await
        .map_err(io_error)?;

    debug!("Wrote config file: {}", path.display());
    Ok(path)
}

impl Executor {
    pub fn new(yt_dlp_path: PathBuf) -> Self {
        Self { yt_dlp_path }
    }

    pub fn from_config(config: &Config) -> Result<Self, ExecError> {
        let path = config.yt_dlp_path().map_err(|_| ExecError::YtDlpNotFound)?;
        Ok(Self::new(path))
    }

    fn spawn_error(e: std::io::Error) -> ExecError {
        match e.kind() {
            ErrorKind::NotFound => ExecError::YtDlpNotFound,
            _ => ExecError::Io(e),
        }
    }

    /// Fetch metadata and available formats without downloading.
    pub async fn fetch_info(&self, url: &str) -> Result<VideoInfo, ExecError> {
        info!("Fetching info for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["-J", "--flat-playlist", url])
            .output()
            .await
            .map_err(Self::spawn_error)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr: {}", stderr);
            return Err(ExecError::Failed {
                code: output.status.code(),
                tail: last_lines(&stderr),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let info: VideoInfo =
            serde_json::from_str(&stdout).map_err(|e| ExecError::InfoParse(e.to_string()))?;

        debug!("Fetched: {} ({} formats)", info.title, info.formats.len());
        Ok(info)
    }

    /// Write the config file, run yt-dlp in the download directory and
    /// stream its output to `events`.
    pub async fn run(
        &self,
        built: &BuiltCommand,
        events: Option<mpsc::Sender<ExecEvent>>,
    ) -> Result<ExecOutcome, ExecError> {
        let config_file = write_config_file(built).await?;
        let result = self.spawn_and_wait(built, events).await;

        if let Err(e) = tokio::fs::remove_file(&config_file).await {
            debug!("Could not remove {}: {}", config_file.display(), e);
        }
        result
    }

    async fn spawn_and_wait(
        &self,
        built: &BuiltCommand,
        events: Option<mpsc::Sender<ExecEvent>>,
    ) -> Result<ExecOutcome, ExecError> {
        let working_dir = Path::new(&built.download_dir);
        tokio::fs::create_dir_all(working_dir).await?;

        info!(
            "Running yt-dlp for {}",
            built.url.as_deref().unwrap_or("list file")
        );

        let mut child = Command::new(&self.yt_dlp_path)
            .args(built.argv())
            .current_dir(working_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(Self::spawn_error)?;

        let stderr = child.stderr.take().map(|stderr| {
            tokio::spawn(async move {
                let mut reader = BufReader::new(stderr);
                let mut buf = Vec::new();
                let mut collected = Vec::new();
                while let Ok(Some(line)) = next_line_lossy(&mut reader, &mut buf).await {
                    collected.push(line);
                }
                collected
            })
        });

        let mut tail: VecDeque<String> = VecDeque::with_capacity(TAIL_LINES);
        let mut final_paths = Vec::new();

        if let Some(stdout) = child.stdout.take() {
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            while let Some(line) = next_line_lossy(&mut reader, &mut buf).await? {
                let event = match parse_progress(&line) {
                    Some(percent) => ExecEvent::Progress(percent),
                    None => {
                        if !built.staged {
                            final_paths.extend(printed_path(&line));
                        }
                        ExecEvent::Line(line.clone())
                    }
                };
                push_tail(&mut tail, line);

                if let Some(ref tx) = events {
                    // The receiver may have gone away; keep draining output regardless
                    let _ = tx.send(event).await;
                }
            }
        }

        let status = child.wait().await?;

        if let Some(handle) = stderr {
            if let Ok(lines) = handle.await {
                for line in lines {
                    push_tail(&mut tail, line);
                }
            }
        }

        if !status.success() {
            warn!("yt-dlp exited with {}", status);
            return Err(ExecError::Failed {
                code: status.code(),
                tail: Vec::from(tail).join("\n"),
            });
        }

        info!("yt-dlp finished ({} files reported)", final_paths.len());
        Ok(ExecOutcome {
            exit_code: status.code(),
            final_paths,
        })
    }
}

/// Move finished files out of a staging directory into `destination`.
///
/// Renames when possible and falls back to copy and remove across
/// filesystems. Unfinished fragments are left in place.
pub async fn promote_staged(staging: &Path, destination: &Path) -> Result<Vec<PathBuf>, ExecError> {
    tokio::fs::create_dir_all(destination).await?;

    let mut moved = Vec::new();
    let mut entries = tokio::fs::read_dir(staging).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let name_str = name.to_string_lossy();
        if PARTIAL_SUFFIXES.iter().any(|s| name_str.ends_with(s)) {
            debug!("Skipping unfinished file: {}", name_str);
            continue;
        }

        let from = entry.path();
        let to = destination.join(&name);
        if tokio::fs::rename(&from, &to).await.is_err() {
            if !entry.file_type().await?.is_file() {
                warn!("Cannot move directory {} across filesystems", from.display());
                continue;
            }
            tokio::fs::copy(&from, &to).await?;
            tokio::fs::remove_file(&from).await?;
        }
        moved.push(to);
    }

    // Only succeeds once the directory is empty
    if tokio::fs::remove_dir(staging).await.is_ok() {
        debug!("Removed staging directory: {}", staging.display());
    }

    moved.sort();
    Ok(moved)
}
