//! VRC yt-dlp WebTool - resolve YouTube links into direct, playable media URLs
//!
//! This library wraps the `yt-dlp` command line tool behind a small HTTP relay.
//! It picks the most widely playable format, shapes the tool's metadata into a
//! single response, bounds concurrent tool invocations and keeps track of
//! whether the installed tool is out of date.

pub mod cli;
pub mod config;
pub mod extractors;
pub mod gate;
pub mod output;
pub mod server;
pub mod utils;
pub mod version;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use extractors::{ExtractionMetadata, MediaResolver, ResolvedMedia};
pub use gate::ConcurrencyGate;
pub use version::{VersionMonitor, VersionState};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Error types specific to the relay
#[derive(thiserror::Error, Debug)]
pub enum RelayError {
    #[error("Please provide a valid YouTube URL.")]
    InvalidUrl(String),

    #[error("{0}")]
    ExtractionFailed(String),

    #[error("Could not extract a playable URL.")]
    NoPlayableStream,

    #[error("Version fetch failed: {0}")]
    VersionFetchFailed(String),
}
