use anyhow::Result;
use std::path::Path;
use ytdlcmd_core::{config::Config, executor::Executor, DownloadRequest};

use super::truncate;

pub async fn run(url: &str, json: bool, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;
    let executor = Executor::from_config(&config)?;

    let info = executor.fetch_info(url).await?;
    let template = DownloadRequest {
        url: url.to_string(),
        ..Default::default()
    };
    let requests = info.to_requests(&template);

    if json {
        println!("{}", serde_json::to_string_pretty(&requests)?);
        return Ok(());
    }

    println!("{}", info.title);
    let author = info.author();
    if !author.is_empty() {
        println!("by {}", author);
    }

    if let Some(entries) = &info.entries {
        println!("\nPlaylist with {} entries:", entries.len());
        for request in &requests {
            println!(
                "  {:>3}. {} {}",
                request.playlist_index.unwrap_or_default(),
                truncate(&request.title, 50),
                request.url
            );
        }
        return Ok(());
    }

    println!("\n{:<14} {:<6} {:<16} {:<16} {:>8} {:>10}", "ID", "EXT", "VCODEC", "ACODEC", "TBR", "SIZE");
    for format in &info.formats {
        println!(
            "{:<14} {:<6} {:<16} {:<16} {:>8} {:>10}",
            format.format_id,
            format.container,
            truncate(&format.vcodec, 16),
            truncate(&format.acodec, 16),
            format.tbr,
            format.filesize,
        );
    }

    Ok(())
}
