use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tokio::sync::mpsc;
use ytdlcmd_core::{
    executor::{ExecEvent, Executor},
    DownloadRequest,
};

use super::{execute, read_json, truncate, Session};

pub async fn run(request_path: &Path, config_path: Option<&Path>) -> Result<()> {
    let session = Session::load(config_path)?;
    let mut request: DownloadRequest = read_json(request_path)
        .await
        .with_context(|| format!("Invalid request file {}", request_path.display()))?;
    let executor = Executor::from_config(&session.config)?;

    let built = session.build(&mut request);
    let label = if request.title.trim().is_empty() {
        request.url.clone()
    } else {
        request.title.clone()
    };

    let (tx, mut rx) = mpsc::channel(32);

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}% {msg}",
        )?
        .progress_chars("=>-"),
    );
    pb.set_message(truncate(&label, 40));

    let progress_pb = pb.clone();
    let progress_handle = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                ExecEvent::Progress(percent) => progress_pb.set_position(percent as u64),
                ExecEvent::Line(line) => tracing::debug!("{}", line),
            }
        }
    });

    let result = execute(&executor, &request, &built, Some(tx)).await;
    progress_handle.await?;

    match result {
        Ok(files) => {
            pb.finish_with_message(format!("Done: {}", truncate(&label, 40)));
            for file in &files {
                println!("Output: {}", file.display());
            }
            Ok(())
        }
        Err(e) => {
            pb.abandon_with_message(format!("Failed: {}", truncate(&label, 40)));
            eprintln!("\nError: {:#}", e);
            Err(e.into())
        }
    }
}
