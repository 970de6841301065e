//! # Application State
//!
//! Shared resources handed to every request handler: the media resolver, the
//! concurrency gate in front of it and the version monitor.

use std::sync::Arc;

use crate::config::Config;
use crate::extractors::{CommandRunner, MediaResolver, ToolRunner, YoutubeExtractor};
use crate::gate::ConcurrencyGate;
use crate::version::{GithubReleases, VersionMonitor};

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<dyn MediaResolver>,
    pub gate: Arc<ConcurrencyGate>,
    pub versions: Arc<VersionMonitor>,
}

impl AppState {
    pub fn new(
        resolver: Arc<dyn MediaResolver>,
        gate: Arc<ConcurrencyGate>,
        versions: Arc<VersionMonitor>,
    ) -> Self {
        Self {
            resolver,
            gate,
            versions,
        }
    }
}

/// Builds the shared application state from the configuration.
///
/// The resolver and the version monitor share one tool runner so both invoke
/// the same yt-dlp binary.
pub fn build_app_state(config: &Config) -> anyhow::Result<AppState> {
    let runner: Arc<dyn ToolRunner> =
        Arc::new(CommandRunner::new(config.tool.path.clone()).with_timeout(config.tool_timeout()));

    let releases = GithubReleases::new(
        config.version.release_api_url.clone(),
        &config.version.user_agent,
        config.request_timeout(),
    )?;

    let versions = VersionMonitor::new(
        runner.clone(),
        Arc::new(releases),
        config.refresh_interval(),
    );

    tracing::info!(
        tool = %config.tool.path,
        max_concurrent_jobs = config.app.max_concurrent_jobs,
        "Initialized resolver"
    );

    Ok(AppState::new(
        Arc::new(YoutubeExtractor::new(runner)),
        Arc::new(ConcurrencyGate::new(config.app.max_concurrent_jobs)),
        Arc::new(versions),
    ))
}
