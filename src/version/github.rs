use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::RelayError;

/// Latest yt-dlp release on GitHub
pub const DEFAULT_RELEASE_API_URL: &str =
    "https://api.github.com/repos/yt-dlp/yt-dlp/releases/latest";

/// GitHub rejects API requests without a User-Agent
pub const DEFAULT_USER_AGENT: &str = "vrc-ytdlp-webtool";

/// Source of the latest published tool version
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    async fn latest_version(&self) -> Result<String, RelayError>;
}

/// Reads the latest release tag from the GitHub releases API
pub struct GithubReleases {
    client: Client,
    api_url: String,
}

impl GithubReleases {
    pub fn new(api_url: impl Into<String>, user_agent: &str, timeout: Duration) -> crate::Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }
}

#[async_trait]
impl ReleaseSource for GithubReleases {
    async fn latest_version(&self) -> Result<String, RelayError> {
        tracing::debug!("Fetching latest release from {}", self.api_url);

        let response = self
            .client
            .get(&self.api_url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| RelayError::VersionFetchFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RelayError::VersionFetchFailed(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RelayError::VersionFetchFailed(e.to_string()))?;

        parse_release_tag(&body)
    }
}

/// Pull `tag_name` out of a release document, without its leading `v`
pub fn parse_release_tag(body: &Value) -> Result<String, RelayError> {
    let tag = body
        .get("tag_name")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();

    let version = tag
        .strip_prefix('v')
        .or_else(|| tag.strip_prefix('V'))
        .unwrap_or(tag);

    if version.is_empty() {
        return Err(RelayError::VersionFetchFailed(
            "No tag_name in GitHub API response".to_string(),
        ));
    }

    Ok(version.to_string())
}
