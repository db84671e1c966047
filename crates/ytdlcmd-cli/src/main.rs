mod args;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use args::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let filter = match cli.verbose {
        0 => "ytdlcmd=info,ytdlcmd_core=info",
        1 => "ytdlcmd=debug,ytdlcmd_core=debug",
        2 => "ytdlcmd=trace,ytdlcmd_core=trace",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Build { request, write } => commands::build::run(&request, write, config).await,
        Commands::Run { request } => commands::run::run(&request, config).await,
        Commands::Batch { input, parallel } => commands::batch::run(&input, parallel, config).await,
        Commands::Info { url, json } => commands::info::run(&url, json, config).await,
        Commands::Config => commands::config::run(config).await,
    }
}
