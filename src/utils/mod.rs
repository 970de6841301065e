use once_cell::sync::Lazy;
use regex::Regex;

/// Accepted YouTube URL shapes: `youtube.com` (optionally `www.`) and `youtu.be`
static YOUTUBE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^https?://(www\.)?youtube\.com/|^https?://youtu\.be/")
        .expect("YouTube URL pattern is valid")
});

/// Check whether `url` is one of the YouTube URL shapes the relay accepts
pub fn is_youtube_url(url: &str) -> bool {
    YOUTUBE_URL.is_match(url)
}

/// Keep at most `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Check if the current environment has required tools
pub async fn check_dependencies(tool: &str) -> Vec<String> {
    let mut missing = Vec::new();

    if !check_command_available(tool).await {
        missing.push(format!("{} - required to resolve media URLs", tool));
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
