use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod formats;
pub mod runner;
pub mod youtube;

pub use runner::{CommandRunner, ToolOutput, ToolRunner};
pub use youtube::YoutubeExtractor;

use crate::RelayError;

/// Raw metadata emitted by `yt-dlp -J` for one input URL
///
/// Only the fields the resolver looks at are modelled; everything else in
/// the document is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractionMetadata {
    /// Direct URL of the selected stream, present for progressive formats
    #[serde(default)]
    pub url: Option<String>,

    /// Per-stream descriptors when the selection merged separate tracks
    #[serde(default)]
    pub requested_formats: Option<Vec<StreamDescriptor>>,

    #[serde(default)]
    pub title: Option<String>,

    /// Length in seconds
    #[serde(default)]
    pub duration: Option<f64>,

    /// Selected format, `video+audio` for merged selections
    #[serde(default)]
    pub format_id: Option<String>,
}

/// One encoded stream inside `requested_formats`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamDescriptor {
    #[serde(default)]
    pub vcodec: Option<String>,

    #[serde(default)]
    pub acodec: Option<String>,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub format_id: Option<String>,
}

/// A resolved, playable media location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMedia {
    /// Combined stream, or the video track for adaptive results
    pub url: String,

    /// Audio track, only set for adaptive results
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub audio_url: Option<String>,

    /// Human readable description of which shape was returned
    pub note: String,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub title: Option<String>,

    /// Length in seconds
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub duration: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub format_id: Option<String>,
}

impl ResolvedMedia {
    pub fn is_adaptive(&self) -> bool {
        self.audio_url.is_some()
    }
}

/// Turns a user supplied URL into a playable media location
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Resolve `url` into a direct stream or a video/audio pair
    async fn resolve(&self, url: &str) -> Result<ResolvedMedia, RelayError>;

    /// Check if this resolver accepts the given URL
    fn supports_url(&self, url: &str) -> bool;
}
