use anyhow::{Context, Result};
use std::path::Path;
use ytdlcmd_core::{executor, DownloadRequest};

use super::{read_json, Session};

pub async fn run(request_path: &Path, write: bool, config_path: Option<&Path>) -> Result<()> {
    let session = Session::load(config_path)?;
    let mut request: DownloadRequest = read_json(request_path)
        .await
        .with_context(|| format!("Invalid request file {}", request_path.display()))?;

    let built = session.build(&mut request);

    println!("URL: {}", built.url.as_deref().unwrap_or("(list file)"));
    println!("Download directory: {}{}", built.download_dir, if built.staged { " (staged)" } else { "" });
    println!("\nyt-dlp {}", built.argv().join(" "));
    println!("\n# {}", built.config_path);
    print!("{}", built.config_text());

    if write {
        let path = executor::write_config_file(&built).await?;
        println!("\nWrote {}", path.display());
    }

    Ok(())
}
