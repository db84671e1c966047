use anyhow::{anyhow, Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use ytdlcmd_core::{
    executor::{ExecEvent, Executor},
    DownloadRequest,
};

use super::{execute, read_json, truncate, Session};

pub async fn run(input: &Path, parallel: Option<usize>, config_path: Option<&Path>) -> Result<()> {
    let session = Arc::new(Session::load(config_path)?);
    let requests: Vec<DownloadRequest> = read_json(input)
        .await
        .with_context(|| format!("Invalid request file {}", input.display()))?;

    if requests.is_empty() {
        println!("No requests found in input file");
        return Ok(());
    }

    let executor = Arc::new(Executor::from_config(&session.config)?);
    let parallel = parallel.unwrap_or(session.config.batch.max_parallel).max(1);
    let continue_on_error = session.config.batch.continue_on_error;

    let total = requests.len();
    println!("Processing {} requests with {} parallel workers\n", total, parallel);

    let semaphore = Arc::new(Semaphore::new(parallel));
    let aborted = Arc::new(AtomicBool::new(false));
    let multi = MultiProgress::new();

    let bar_style = ProgressStyle::with_template("{spinner:.cyan} {bar:30.cyan/blue} {pos:>3}% {msg}")?
        .progress_chars("=>-");

    let results: Vec<_> = stream::iter(requests.into_iter().enumerate())
        .map(|(idx, mut request)| {
            let sem = semaphore.clone();
            let session = session.clone();
            let executor = executor.clone();
            let aborted = aborted.clone();
            let pb = multi.add(ProgressBar::new(100));
            pb.set_style(bar_style.clone());

            async move {
                let label = format!("[{}/{}] {}", idx + 1, total, truncate(&request.url, 50));
                let _permit = sem.acquire().await?;

                if aborted.load(Ordering::SeqCst) {
                    pb.abandon_with_message(format!("{} Skipped", label));
                    return Ok::<_, anyhow::Error>((request.url, Err(anyhow!("skipped after earlier failure"))));
                }

                pb.set_message(label.clone());
                pb.enable_steady_tick(std::time::Duration::from_millis(100));

                let (tx, mut rx) = mpsc::channel(32);
                let progress_pb = pb.clone();
                let progress = tokio::spawn(async move {
                    while let Some(event) = rx.recv().await {
                        if let ExecEvent::Progress(percent) = event {
                            progress_pb.set_position(percent as u64);
                        }
                    }
                });

                let built = session.build(&mut request);
                let result = execute(&executor, &request, &built, Some(tx))
                    .await
                    .map_err(anyhow::Error::from);
                let _ = progress.await;

                match &result {
                    Ok(files) => {
                        pb.finish_with_message(format!("{} Done ({} files)", label, files.len()));
                    }
                    Err(e) => {
                        pb.abandon_with_message(format!("{} Failed: {}", label, e));
                        if !continue_on_error {
                            aborted.store(true, Ordering::SeqCst);
                        }
                    }
                }

                Ok((request.url, result))
            }
        })
        .buffer_unordered(parallel)
        .collect()
        .await;

    let results = results.into_iter().collect::<Result<Vec<_>>>()?;

    // Summary
    let succeeded = results.iter().filter(|(_, r)| r.is_ok()).count();
    let failed: Vec<_> = results.iter().filter(|(_, r)| r.is_err()).collect();

    println!("\n=== Batch Complete ===");
    println!("Succeeded: {}", succeeded);
    println!("Failed: {}", failed.len());

    if !failed.is_empty() {
        println!("\nFailed requests:");
        for (url, result) in &failed {
            if let Err(e) = result {
                println!("  {} - {:#}", url, e);
            }
        }
    }

    if !continue_on_error && !failed.is_empty() {
        return Err(anyhow!("batch stopped after a failed request"));
    }

    Ok(())
}
