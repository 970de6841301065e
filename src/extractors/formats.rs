//! Format selection and result shaping.
//!
//! The preference order is handed to yt-dlp as a single selector expression and
//! evaluated by the tool itself. Whatever it picks comes back either as one
//! progressive stream (top-level `url`) or as separate tracks listed in
//! `requested_formats`; [`shape_metadata`] maps those two shapes onto
//! [`ResolvedMedia`].

use super::{ExtractionMetadata, ResolvedMedia, StreamDescriptor};
use crate::RelayError;

/// Ordered format preference, first match wins:
///
/// 1. progressive H.264/MP4 with audio over https
/// 2. any progressive stream with audio over https
/// 3. anything with audio (may be HLS/DASH)
/// 4. best available
pub const FORMAT_SELECTOR: &str = concat!(
    "best[acodec!=none][vcodec*=avc][ext=mp4][protocol*=https]/",
    "best[acodec!=none][protocol*=https]/",
    "best[acodec!=none]/",
    "best"
);

pub const DIRECT_NOTE: &str = "Direct stream (single URL).";

pub const ADAPTIVE_NOTE: &str =
    "Adaptive streams (separate video/audio). Many in-world players expect a single URL.";

/// Codec value yt-dlp uses for an absent track
const NO_CODEC: &str = "none";

/// Pick the playable shape out of the tool's metadata
pub fn shape_metadata(metadata: ExtractionMetadata) -> Result<ResolvedMedia, RelayError> {
    let ExtractionMetadata {
        url,
        requested_formats,
        title,
        duration,
        format_id,
    } = metadata;

    if let Some(url) = url.filter(|u| !u.is_empty()) {
        return Ok(ResolvedMedia {
            url,
            audio_url: None,
            note: DIRECT_NOTE.to_string(),
            title,
            duration,
            format_id,
        });
    }

    let formats = requested_formats.unwrap_or_default();
    let video = formats.iter().find(|f| is_video_only(f));
    let audio = formats.iter().find(|f| is_audio_only(f));

    match (video.and_then(stream_url), audio.and_then(stream_url)) {
        (Some(video_url), Some(audio_url)) => Ok(ResolvedMedia {
            url: video_url,
            audio_url: Some(audio_url),
            note: ADAPTIVE_NOTE.to_string(),
            title,
            duration,
            format_id: format_id.or_else(|| merged_format_id(video, audio)),
        }),
        _ => Err(RelayError::NoPlayableStream),
    }
}

fn has_codec(codec: &Option<String>) -> bool {
    codec.as_deref().is_some_and(|c| !c.is_empty())
}

fn is_none_codec(codec: &Option<String>) -> bool {
    codec.as_deref() == Some(NO_CODEC)
}

fn is_video_only(format: &StreamDescriptor) -> bool {
    has_codec(&format.vcodec) && is_none_codec(&format.acodec)
}

fn is_audio_only(format: &StreamDescriptor) -> bool {
    has_codec(&format.acodec) && is_none_codec(&format.vcodec)
}

fn stream_url(format: &StreamDescriptor) -> Option<String> {
    format.url.clone().filter(|u| !u.is_empty())
}

/// `video+audio`, the way yt-dlp names a merged selection
fn merged_format_id(
    video: Option<&StreamDescriptor>,
    audio: Option<&StreamDescriptor>,
) -> Option<String> {
    let video_id = video?.format_id.as_deref()?;
    let audio_id = audio?.format_id.as_deref()?;
    Some(format!("{video_id}+{audio_id}"))
}
