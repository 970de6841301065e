use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "webtool",
    about = "VRC yt-dlp WebTool - Resolve YouTube links into direct, playable media URLs",
    version,
    long_about = "A small HTTP relay around yt-dlp. It resolves YouTube links into a single direct media URL (or a separate video/audio pair) for players that only accept one URL, and reports whether the installed yt-dlp is out of date."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// yt-dlp binary name or path
    #[arg(long, global = true, env = "YT_DLP_PATH", value_name = "PATH")]
    pub tool: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP relay
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Address to bind
        #[arg(long, value_name = "ADDR")]
        host: Option<String>,

        /// Directory of static files served at `/`
        #[arg(long, value_name = "DIR")]
        static_dir: Option<PathBuf>,
    },

    /// Resolve a single YouTube URL and print the result
    Resolve {
        /// YouTube URL (youtube.com or youtu.be)
        #[arg(value_name = "URL")]
        url: String,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show installed and latest yt-dlp versions
    Version {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show or initialise the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,

        /// Write a default configuration file
        #[arg(long, conflicts_with = "show")]
        init: bool,

        /// Overwrite an existing configuration file with --init
        #[arg(long, requires = "init")]
        force: bool,
    },
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON, same shape as the HTTP API
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
