pub mod errors;
pub mod handlers;
pub mod state;

pub use state::{build_app_state, AppState};

use axum::{
    routing::{get, post},
    Router,
};
use std::path::Path;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Creates the Axum router with all the application routes.
///
/// When `static_dir` is set its files are served for every path not matched
/// by an API route.
pub fn create_router(app_state: AppState, static_dir: Option<&Path>) -> Router {
    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/resolve", post(handlers::resolve_handler))
        .route("/api/version", get(handlers::version_handler));

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}

/// Serve `app_state` on `listener` until `shutdown` is cancelled
pub async fn run(
    listener: TcpListener,
    app_state: AppState,
    static_dir: Option<&Path>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let app = create_router(app_state, static_dir);

    info!("VRC yt-dlp WebTool running at http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    Ok(())
}
