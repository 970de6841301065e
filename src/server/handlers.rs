use axum::{
    extract::{FromRequest, Request, State},
    http::header,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

use super::{errors::AppError, state::AppState};
use crate::extractors::ResolvedMedia;
use crate::version::VersionReport;
use crate::RelayError;

/// Body of `POST /api/resolve`
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// The `url` of a resolve request, read from a JSON or form-encoded body.
///
/// Bodies that fail to parse yield an empty URL, which the allow-list rejects.
#[derive(Debug, Default)]
pub struct ResolveInput(pub String);

impl<S> FromRequest<S> for ResolveInput
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        let request = if is_form {
            Form::<ResolveRequest>::from_request(req, state)
                .await
                .ok()
                .map(|Form(request)| request)
        } else {
            Json::<ResolveRequest>::from_request(req, state)
                .await
                .ok()
                .map(|Json(request)| request)
        };

        Ok(Self(request.and_then(|r| r.url).unwrap_or_default()))
    }
}

/// Successful `POST /api/resolve` response
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub media: ResolvedMedia,
}

/// The health check handler.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Resolve a YouTube URL through the concurrency gate.
///
/// The resolution runs on its own task, so a caller that disconnects while
/// waiting neither kills the yt-dlp process nor gives up its queue position.
pub async fn resolve_handler(
    State(app_state): State<AppState>,
    ResolveInput(url): ResolveInput,
) -> Result<Json<ResolveResponse>, AppError> {
    if !app_state.resolver.supports_url(&url) {
        return Err(RelayError::InvalidUrl(url).into());
    }

    let resolver = app_state.resolver.clone();
    let gate = app_state.gate.clone();
    let job = tokio::spawn(async move { gate.submit(resolver.resolve(&url)).await });

    let media = job
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Resolve task failed: {e}")))??;

    Ok(Json(ResolveResponse { ok: true, media }))
}

/// Report installed and latest yt-dlp versions
pub async fn version_handler(State(app_state): State<AppState>) -> Json<VersionReport> {
    Json(app_state.versions.current_state().await.report())
}
