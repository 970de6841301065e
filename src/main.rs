use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vrc_ytdlp_webtool::cli::{Cli, Commands};
use vrc_ytdlp_webtool::config::Config;
use vrc_ytdlp_webtool::server::{self, build_app_state};
use vrc_ytdlp_webtool::{output, utils, RelayError};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "vrc_ytdlp_webtool=debug,webtool=debug,tower_http=debug"
    } else {
        "vrc_ytdlp_webtool=info,webtool=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().await?;
    let port = match &cli.command {
        Commands::Serve { port, .. } => *port,
        _ => None,
    };
    let mut config = config.with_overrides(cli.tool.clone(), port);

    match cli.command {
        Commands::Serve {
            host, static_dir, ..
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if static_dir.is_some() {
                config.server.static_dir = static_dir;
            }
            config.validate()?;

            // Check for the extraction tool (non-fatal, the version report will show "unknown")
            let missing_deps = utils::check_dependencies(&config.tool.path).await;
            if !missing_deps.is_empty() {
                eprintln!("⚠️  Dependency check warnings:");
                for dep in missing_deps {
                    eprintln!("   • {}", dep);
                }
                eprintln!("   (Continuing anyway - tools may be available)");
            }

            serve(config).await?;
        }
        Commands::Resolve {
            url,
            output,
            format,
        } => {
            if !utils::is_youtube_url(&url) {
                return Err(RelayError::InvalidUrl(url).into());
            }

            let state = build_app_state(&config)?;

            let spinner = if cli.quiet {
                ProgressBar::hidden()
            } else {
                let spinner = ProgressBar::new_spinner();
                spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
                spinner.set_message(format!("Resolving {}", url));
                spinner.enable_steady_tick(Duration::from_millis(100));
                spinner
            };

            tracing::info!("Starting resolution for URL: {}", url);
            let result = state.resolver.resolve(&url).await;
            spinner.finish_and_clear();
            let media = result?;

            match output {
                Some(path) => {
                    output::save_to_file(&media, &path, &format).await?;
                    println!("Result saved to: {}", path.display());
                }
                None => output::print_to_console(&media, &format)?,
            }
        }
        Commands::Version { format } => {
            let state = build_app_state(&config)?;
            state.versions.initialize().await;

            let report = state.versions.current_state().await.report();
            println!("{}", output::format_version(&report, &format)?);
        }
        Commands::Config { show, init, force } => {
            if init {
                let path = Config::default().save(force).await?;
                println!("Default configuration written to: {}", path.display());
            } else if show {
                config.display();
            } else {
                println!("Edit the configuration file to change settings, or run `webtool config --init`.");
                config.display();
            }
        }
    }

    Ok(())
}

/// Run the HTTP relay until Ctrl-C
async fn serve(config: Config) -> Result<()> {
    let state = build_app_state(&config)?;
    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;

    // Version detection may wait on GitHub; the listener is already accepting.
    state.versions.spawn_initialize();

    let shutdown = CancellationToken::new();
    let refresh = state.versions.spawn_refresh(shutdown.clone());

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown requested");
                signal_token.cancel();
            }
            Err(e) => tracing::warn!("Could not listen for Ctrl-C: {}", e),
        }
    });

    let served = server::run(
        listener,
        state,
        config.server.static_dir.as_deref(),
        shutdown.clone(),
    )
    .await;

    shutdown.cancel();
    if let Err(e) = refresh.await {
        tracing::warn!("Version refresh task ended abnormally: {}", e);
    }

    served
}
