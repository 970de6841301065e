//! Tracks whether the installed yt-dlp is behind the latest release.
//!
//! The local version is read once at startup from `<tool> --version`. The
//! latest version is fetched at startup and then on a fixed interval by a
//! background task that stops when its cancellation token fires. A failed
//! fetch never clears a previously fetched value.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub mod github;

pub use github::{GithubReleases, ReleaseSource};

use crate::extractors::ToolRunner;
use crate::RelayError;

/// Placeholder for a local version that could not be detected
pub const UNKNOWN_VERSION: &str = "unknown";

/// Default pause between remote version checks
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

/// Longest accepted pause between remote version checks
pub const MAX_REFRESH_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Installed and published tool versions
#[derive(Debug, Clone, PartialEq)]
pub struct VersionState {
    pub local: String,
    pub latest: Option<String>,
    /// Time of the last successful remote fetch
    pub checked_at: Option<DateTime<Utc>>,
}

impl Default for VersionState {
    fn default() -> Self {
        Self {
            local: UNKNOWN_VERSION.to_string(),
            latest: None,
            checked_at: None,
        }
    }
}

impl VersionState {
    /// Exact string comparison; no semantic version parsing
    pub fn update_available(&self) -> bool {
        match &self.latest {
            Some(latest) => self.local != UNKNOWN_VERSION && &self.local != latest,
            None => false,
        }
    }

    pub fn report(&self) -> VersionReport {
        VersionReport {
            local: self.local.clone(),
            latest: self.latest.clone(),
            update_available: self.update_available(),
            checked_at: self.checked_at,
        }
    }
}

/// Wire form of [`VersionState`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionReport {
    pub local: String,
    pub latest: Option<String>,
    pub update_available: bool,
    pub checked_at: Option<DateTime<Utc>>,
}

pub struct VersionMonitor {
    state: RwLock<VersionState>,
    runner: Arc<dyn ToolRunner>,
    releases: Arc<dyn ReleaseSource>,
    refresh_interval: Duration,
}

impl VersionMonitor {
    pub fn new(
        runner: Arc<dyn ToolRunner>,
        releases: Arc<dyn ReleaseSource>,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            state: RwLock::new(VersionState::default()),
            runner,
            releases,
            refresh_interval: refresh_interval.min(MAX_REFRESH_INTERVAL),
        }
    }

    pub async fn current_state(&self) -> VersionState {
        self.state.read().await.clone()
    }

    /// Detect the local version, then try one remote fetch
    pub async fn initialize(&self) {
        let local = self.detect_local().await;
        tracing::info!("Local yt-dlp version: {}", local);

        match self.refresh().await {
            Ok(latest) => tracing::info!("Latest yt-dlp release: {}", latest),
            Err(e) => tracing::warn!("Could not fetch latest yt-dlp release: {}", e),
        }
    }

    /// Read `<tool> --version` into the local version
    pub async fn detect_local(&self) -> String {
        let local = match self.runner.run(&["--version".to_string()]).await {
            Ok(output) => {
                let trimmed = output.stdout.trim();
                if trimmed.is_empty() {
                    UNKNOWN_VERSION.to_string()
                } else {
                    trimmed.to_string()
                }
            }
            Err(e) => {
                tracing::warn!("yt-dlp version detection failed: {:#}", e);
                UNKNOWN_VERSION.to_string()
            }
        };

        self.state.write().await.local = local.clone();
        local
    }

    /// Fetch the latest published version; on failure the previous value stays
    pub async fn refresh(&self) -> Result<String, RelayError> {
        let latest = self.releases.latest_version().await?;

        let mut state = self.state.write().await;
        state.latest = Some(latest.clone());
        state.checked_at = Some(Utc::now());

        Ok(latest)
    }

    /// Run [`initialize`](Self::initialize) in the background
    pub fn spawn_initialize(self: &Arc<Self>) -> JoinHandle<()> {
        let monitor = Arc::clone(self);
        tokio::spawn(async move { monitor.initialize().await })
    }

    /// Re-fetch the latest version every interval until `shutdown` is cancelled
    pub fn spawn_refresh(self: &Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        let monitor = Arc::clone(self);

        tokio::spawn(async move {
            let period = monitor.refresh_interval;
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        tracing::debug!("Version refresh stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        match monitor.refresh().await {
                            Ok(latest) => tracing::debug!("Refreshed latest yt-dlp release: {}", latest),
                            Err(e) => tracing::debug!("Version refresh skipped: {}", e),
                        }
                    }
                }
            }
        })
    }
}
