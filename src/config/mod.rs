use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::gate::DEFAULT_LIMIT;
use crate::version::github::{DEFAULT_RELEASE_API_URL, DEFAULT_USER_AGENT};

/// Upper bound for `version.refresh_interval_hours` (one year)
pub const MAX_REFRESH_INTERVAL_HOURS: u64 = 24 * 365;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extraction tool settings
    pub tool: ToolConfig,

    /// HTTP listener settings
    pub server: ServerConfig,

    /// Latest-release checks
    pub version: VersionCheckConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// yt-dlp binary name or path
    pub path: String,

    /// Kill a tool invocation after this many seconds (unbounded if unset)
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Directory served at `/` (disabled if unset)
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionCheckConfig {
    /// Release API endpoint returning a `tag_name`
    pub release_api_url: String,

    /// User-Agent sent with release API requests
    pub user_agent: String,

    /// Hours between background checks
    pub refresh_interval_hours: u64,

    /// Release API request timeout
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Maximum concurrent tool invocations
    pub max_concurrent_jobs: usize,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            path: "yt-dlp".to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: Some(PathBuf::from("public")),
        }
    }
}

impl Default for VersionCheckConfig {
    fn default() -> Self {
        Self {
            release_api_url: DEFAULT_RELEASE_API_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            refresh_interval_hours: 6,
            request_timeout_secs: 30,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: DEFAULT_LIMIT,
        }
    }
}

impl Config {
    /// Load configuration from file or fall back to defaults
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            Self::from_yaml(
                &fs_err::read_to_string(&config_path).context("Failed to read config file")?,
            )
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config =
            serde_yaml::from_str(content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file, refusing to replace an existing one unless `overwrite`
    pub async fn save(&self, overwrite: bool) -> Result<PathBuf> {
        let config_path = Self::config_path()?;
        self.write_to(&config_path, overwrite)?;
        Ok(config_path)
    }

    /// Write configuration as YAML to `path`
    pub fn write_to(&self, path: &Path, overwrite: bool) -> Result<()> {
        if path.exists() && !overwrite {
            anyhow::bail!(
                "Config file already exists at {} (use --force to overwrite)",
                path.display()
            );
        }

        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("vrc-ytdlp-webtool").join("config.yaml"))
    }

    /// Apply command line and environment overrides (`--tool`/`YT_DLP_PATH`, `--port`/`PORT`)
    pub fn with_overrides(mut self, tool: Option<String>, port: Option<u16>) -> Self {
        if let Some(tool) = tool.filter(|t| !t.is_empty()) {
            self.tool.path = tool;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.tool.path.trim().is_empty() {
            anyhow::bail!("tool.path must not be empty");
        }

        if self.app.max_concurrent_jobs == 0 {
            anyhow::bail!("app.max_concurrent_jobs must be at least 1");
        }

        if self.version.refresh_interval_hours == 0 {
            anyhow::bail!("version.refresh_interval_hours must be at least 1");
        }

        if self.version.refresh_interval_hours > MAX_REFRESH_INTERVAL_HOURS {
            anyhow::bail!(
                "version.refresh_interval_hours must be at most {}",
                MAX_REFRESH_INTERVAL_HOURS
            );
        }

        let api = Url::parse(&self.version.release_api_url)
            .context("version.release_api_url is not a valid URL")?;
        if !matches!(api.scheme(), "http" | "https") {
            anyhow::bail!("version.release_api_url must use HTTP or HTTPS protocol");
        }

        Ok(())
    }

    pub fn tool_timeout(&self) -> Option<Duration> {
        self.tool.timeout_secs.map(Duration::from_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        let hours = self.version.refresh_interval_hours.min(MAX_REFRESH_INTERVAL_HOURS);
        Duration::from_secs(hours * 60 * 60)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.version.request_timeout_secs)
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  yt-dlp: {}", self.tool.path);
        match self.tool.timeout_secs {
            Some(secs) => println!("  Tool Timeout: {}s", secs),
            None => println!("  Tool Timeout: none"),
        }
        println!("  Listen: {}:{}", self.server.host, self.server.port);
        if let Some(dir) = &self.server.static_dir {
            println!("  Static Files: {}", dir.display());
        }
        println!("  Max Concurrent Jobs: {}", self.app.max_concurrent_jobs);
        println!("  Release API: {}", self.version.release_api_url);
        println!("  Version Check Interval: {}h", self.version.refresh_interval_hours);
    }
}
