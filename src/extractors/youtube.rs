use async_trait::async_trait;
use std::sync::Arc;

use super::formats::{shape_metadata, FORMAT_SELECTOR};
use super::{ExtractionMetadata, MediaResolver, ResolvedMedia, ToolRunner};
use crate::utils::{is_youtube_url, truncate_chars};
use crate::RelayError;

/// How much raw tool output is echoed back when it cannot be parsed
const RAW_OUTPUT_PREVIEW: usize = 4000;

/// YouTube resolver using yt-dlp
pub struct YoutubeExtractor {
    runner: Arc<dyn ToolRunner>,
}

impl YoutubeExtractor {
    pub fn new(runner: Arc<dyn ToolRunner>) -> Self {
        Self { runner }
    }

    /// Arguments for a metadata-only run with the format preference applied
    fn metadata_args(url: &str) -> Vec<String> {
        [
            "-J",
            "-f",
            FORMAT_SELECTOR,
            "--no-warnings",
            "--no-playlist",
            url,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// Get video metadata using yt-dlp
    pub async fn dump_metadata(&self, url: &str) -> Result<ExtractionMetadata, RelayError> {
        tracing::debug!("Extracting video info for: {}", url);

        let output = self
            .runner
            .run(&Self::metadata_args(url))
            .await
            .map_err(|e| RelayError::ExtractionFailed(format!("{e:#}")))?;

        if !output.success() {
            let detail = if output.stderr.is_empty() {
                &output.stdout
            } else {
                &output.stderr
            };
            return Err(RelayError::ExtractionFailed(format!(
                "yt-dlp exited with {}: {}",
                output.code_display(),
                detail
            )));
        }

        serde_json::from_str(&output.stdout).map_err(|e| {
            RelayError::ExtractionFailed(format!(
                "JSON parse error: {}\nRaw: {}",
                e,
                truncate_chars(&output.stdout, RAW_OUTPUT_PREVIEW)
            ))
        })
    }
}

#[async_trait]
impl MediaResolver for YoutubeExtractor {
    async fn resolve(&self, url: &str) -> Result<ResolvedMedia, RelayError> {
        let metadata = self.dump_metadata(url).await?;
        let media = shape_metadata(metadata)?;

        tracing::info!(adaptive = media.is_adaptive(), "Resolved {}", url);

        Ok(media)
    }

    fn supports_url(&self, url: &str) -> bool {
        is_youtube_url(url)
    }
}
