use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ytdlcmd")]
#[command(author, version, about = "Build and run yt-dlp commands from download requests")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the yt-dlp invocation for a request without running it
    Build {
        /// Download request (JSON)
        request: PathBuf,

        /// Also write the generated config file
        #[arg(short, long)]
        write: bool,
    },

    /// Build and run a single request
    Run {
        /// Download request (JSON)
        request: PathBuf,
    },

    /// Run a JSON array of requests
    Batch {
        /// File containing a JSON array of download requests
        #[arg(short, long)]
        input: PathBuf,

        /// Maximum parallel downloads (defaults to batch.max_parallel)
        #[arg(short, long)]
        parallel: Option<usize>,
    },

    /// List formats and playlist entries for a URL
    Info {
        /// Video or playlist URL
        url: String,

        /// Print download requests as JSON, ready for `batch`
        #[arg(long)]
        json: bool,
    },

    /// Show configuration
    Config,
}
