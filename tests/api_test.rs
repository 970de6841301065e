//! # HTTP API Tests
//!
//! Drives the router in-process with a spy yt-dlp runner:
//! - input validation happens before any tool invocation
//! - direct and adaptive results are shaped as `{ ok, url, audioUrl?, note }`
//! - tool failures become `{ ok: false, error }` with a 500
//! - `/api/version` reflects the monitor state
//! - the concurrency gate caps parallel tool runs

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{extract_json, extract_text, SpyRunner, TestApp};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::time::Duration;
use vrc_ytdlp_webtool::extractors::ToolOutput;

const WATCH_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
const INVALID_URL_MESSAGE: &str = "Please provide a valid YouTube URL.";

fn direct_metadata() -> String {
    json!({
        "id": "dQw4w9WgXcQ",
        "title": "Never Gonna Give You Up",
        "url": "https://rr3.googlevideo.com/videoplayback?itag=18",
        "duration": 212.0,
        "format_id": "18"
    })
    .to_string()
}

fn adaptive_metadata() -> String {
    json!({
        "id": "dQw4w9WgXcQ",
        "requested_formats": [
            {"format_id": "137", "vcodec": "avc1", "acodec": "none", "url": "V"},
            {"format_id": "140", "vcodec": "none", "acodec": "aac", "url": "A"}
        ]
    })
    .to_string()
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn rejects_non_youtube_urls_without_invoking_tool() {
    let app = TestApp::new(SpyRunner::printing(&direct_metadata()), None);

    for body in [
        json!({"url": "https://vimeo.com/123"}),
        json!({"url": "https://m.youtube.com/watch?v=x"}),
        json!({"url": "youtube.com/watch?v=x"}),
        json!({"url": ""}),
        json!({"url": 42}),
        json!({"link": WATCH_URL}),
        json!({}),
    ] {
        let response = app.post_json("/api/resolve", body.clone()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");

        let json = extract_json(response).await;
        assert_eq!(json, json!({"error": INVALID_URL_MESSAGE}), "{body}");
    }

    assert_eq!(app.runner.extraction_calls(), 0);
}

#[tokio::test]
async fn rejects_unparseable_bodies_without_invoking_tool() {
    let app = TestApp::new(SpyRunner::printing(&direct_metadata()), None);

    for (content_type, body) in [
        ("text/plain", format!("url={WATCH_URL}")),
        ("application/json", "{\"url\": ".to_string()),
        ("application/x-www-form-urlencoded", "link=https%3A%2F%2Fyoutu.be%2Fx".to_string()),
    ] {
        let response = app
            .send(
                Request::builder()
                    .method("POST")
                    .uri("/api/resolve")
                    .header("content-type", content_type)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{content_type}");
        assert_eq!(extract_json(response).await["error"], INVALID_URL_MESSAGE);
    }

    assert_eq!(app.runner.extraction_calls(), 0);
}

// =============================================================================
// Resolution
// =============================================================================

#[tokio::test]
async fn resolves_direct_stream() {
    let app = TestApp::new(SpyRunner::printing(&direct_metadata()), None);

    let response = app.post_json("/api/resolve", json!({"url": WATCH_URL})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = extract_json(response).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["url"], "https://rr3.googlevideo.com/videoplayback?itag=18");
    assert_eq!(json["note"], "Direct stream (single URL).");
    assert_eq!(json["title"], "Never Gonna Give You Up");
    assert_eq!(json["duration"], 212.0);
    assert_eq!(json["formatId"], "18");
    assert!(json.get("audioUrl").is_none());

    let calls = app.runner.calls.lock().unwrap().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0][0], "-J");
    assert_eq!(calls[0].last().map(String::as_str), Some(WATCH_URL));
    assert!(calls[0].contains(&"--no-playlist".to_string()));
}

#[tokio::test]
async fn resolves_short_links() {
    let app = TestApp::new(SpyRunner::printing(&direct_metadata()), None);

    let response = app
        .post_json("/api/resolve", json!({"url": "https://youtu.be/dQw4w9WgXcQ"}))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.runner.extraction_calls(), 1);
}

#[tokio::test]
async fn resolves_form_encoded_body() {
    let app = TestApp::new(SpyRunner::printing(&direct_metadata()), None);

    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/resolve")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from("url=https%3A%2F%2Fyoutu.be%2FdQw4w9WgXcQ"))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_json(response).await["ok"], true);

    let calls = app.runner.calls.lock().unwrap().clone();
    assert_eq!(
        calls[0].last().map(String::as_str),
        Some("https://youtu.be/dQw4w9WgXcQ")
    );
}

#[tokio::test]
async fn resolves_adaptive_pair() {
    let app = TestApp::new(SpyRunner::printing(&adaptive_metadata()), None);

    let response = app.post_json("/api/resolve", json!({"url": WATCH_URL})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = extract_json(response).await;
    assert_eq!(
        json,
        json!({
            "ok": true,
            "url": "V",
            "audioUrl": "A",
            "note": "Adaptive streams (separate video/audio). Many in-world players expect a single URL.",
            "formatId": "137+140"
        })
    );
}

#[tokio::test]
async fn tool_failure_is_a_server_error_with_stderr() {
    let app = TestApp::new(
        SpyRunner::new(ToolOutput {
            code: Some(1),
            stdout: String::new(),
            stderr: "ERROR: [youtube] dQw4w9WgXcQ: Private video".to_string(),
        }),
        None,
    );

    let response = app.post_json("/api/resolve", json!({"url": WATCH_URL})).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = extract_json(response).await;
    assert_eq!(json["ok"], false);
    assert_eq!(
        json["error"],
        "yt-dlp exited with 1: ERROR: [youtube] dQw4w9WgXcQ: Private video"
    );
}

#[tokio::test]
async fn unusable_metadata_is_a_server_error() {
    let app = TestApp::new(SpyRunner::printing(r#"{"id": "dQw4w9WgXcQ"}"#), None);

    let response = app.post_json("/api/resolve", json!({"url": WATCH_URL})).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        extract_json(response).await,
        json!({"ok": false, "error": "Could not extract a playable URL."})
    );
}

#[tokio::test]
async fn concurrent_requests_are_gated() {
    let app = TestApp::new(
        SpyRunner::printing(&direct_metadata()).with_delay(Duration::from_millis(50)),
        None,
    );

    let requests: Vec<_> = (0..5)
        .map(|_| {
            let router = app.router.clone();
            tokio::spawn(async move {
                use tower::util::ServiceExt;
                let request = Request::builder()
                    .method("POST")
                    .uri("/api/resolve")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({"url": WATCH_URL}).to_string()))
                    .unwrap();
                router.oneshot(request).await.unwrap().status()
            })
        })
        .collect();

    for request in requests {
        assert_eq!(request.await.unwrap(), StatusCode::OK);
    }

    assert_eq!(app.runner.extraction_calls(), 5);
    assert!(app.runner.peak.load(Ordering::SeqCst) <= 2);
    assert_eq!(app.state.gate.in_flight(), 0);
}

#[tokio::test]
async fn disconnected_caller_does_not_abort_resolution() {
    let app = TestApp::new(
        SpyRunner::printing(&direct_metadata()).with_delay(Duration::from_millis(200)),
        None,
    );

    let abandoned = tokio::time::timeout(
        Duration::from_millis(20),
        app.post_json("/api/resolve", json!({"url": WATCH_URL})),
    )
    .await;
    assert!(abandoned.is_err(), "request should still be running");

    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(app.runner.extraction_calls(), 1);
    assert_eq!(app.runner.completed.load(Ordering::SeqCst), 1);
    assert_eq!(app.state.gate.in_flight(), 0);
}

// =============================================================================
// Version, health and static files
// =============================================================================

#[tokio::test]
async fn version_reports_available_update() {
    let app = TestApp::new(SpyRunner::printing("{}"), Some("2024.02.02"));
    app.state.versions.initialize().await;

    let response = app.get("/api/version").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = extract_json(response).await;
    assert_eq!(json["local"], "2024.01.01");
    assert_eq!(json["latest"], "2024.02.02");
    assert_eq!(json["updateAvailable"], true);
    assert!(json["checkedAt"].is_string());
}

#[tokio::test]
async fn version_before_any_fetch_is_unknown() {
    let app = TestApp::new(SpyRunner::printing("{}"), None);

    let json = extract_json(app.get("/api/version").await).await;
    assert_eq!(json["local"], "unknown");
    assert!(json["latest"].is_null());
    assert_eq!(json["updateAvailable"], false);
}

#[tokio::test]
async fn version_without_remote_release_has_no_update() {
    let app = TestApp::new(SpyRunner::printing("{}"), None);
    app.state.versions.initialize().await;

    let json = extract_json(app.get("/api/version").await).await;
    assert_eq!(json["local"], "2024.01.01");
    assert!(json["latest"].is_null());
    assert_eq!(json["updateAvailable"], false);
}

#[tokio::test]
async fn health_check_responds_ok() {
    let app = TestApp::new(SpyRunner::printing("{}"), None);

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_text(response).await, "OK");
}

#[tokio::test]
async fn serves_static_files_from_public_dir() {
    let dir = tempfile::tempdir().unwrap();
    fs_err::write(dir.path().join("index.html"), "<h1>webtool</h1>").unwrap();

    let app = TestApp::with_static_dir(SpyRunner::printing("{}"), None, Some(dir.path()));

    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_text(response).await, "<h1>webtool</h1>");

    let missing = app.get("/nope.js").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
