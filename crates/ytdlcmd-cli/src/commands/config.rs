use anyhow::Result;
use std::path::Path;
use ytdlcmd_core::config::Config;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("ytdlcmd configuration\n");

    match config.yt_dlp_path() {
        Ok(path) => println!("# yt-dlp: {}", path.display()),
        Err(_) => println!("# yt-dlp: not found"),
    }
    println!();
    print!("{}", config.to_toml_string()?);

    // Show config file locations
    println!("\nConfig sources (highest priority first):");
    println!("  1. Environment variables (YTDLCMD_*, nested with __)");
    if let Some(p) = config_path {
        println!("  2. {} (specified)", p.display());
    }
    if let Some(config_dir) = dirs::config_dir() {
        println!("  3. {}/ytdlcmd/config.toml", config_dir.display());
    }

    Ok(())
}
