use anyhow::Result;
use console::style;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::extractors::ResolvedMedia;
use crate::version::VersionReport;

/// Render a resolved media result
pub fn format_media(media: &ResolvedMedia, format: &OutputFormat) -> Result<String> {
    let content = match format {
        OutputFormat::Text => {
            let mut lines = Vec::new();
            if let Some(title) = &media.title {
                lines.push(format!("{} {}", style("Title:").bold(), title));
            }
            match &media.audio_url {
                Some(audio_url) => {
                    lines.push(format!("{} {}", style("Video:").bold(), media.url));
                    lines.push(format!("{} {}", style("Audio:").bold(), audio_url));
                }
                None => lines.push(format!("{} {}", style("URL:").bold(), media.url)),
            }
            if let Some(duration) = media.duration {
                lines.push(format!("{} {}", style("Duration:").bold(), format_duration(duration)));
            }
            if let Some(format_id) = &media.format_id {
                lines.push(format!("{} {}", style("Format:").bold(), format_id));
            }
            lines.push(style(&media.note).dim().to_string());
            lines.join("\n")
        }
        OutputFormat::Json => serde_json::to_string_pretty(media)?,
    };

    Ok(content)
}

/// `h:mm:ss`, or `m:ss` under an hour
fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let (hours, minutes, secs) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Render the installed/latest version report
pub fn format_version(report: &VersionReport, format: &OutputFormat) -> Result<String> {
    let content = match format {
        OutputFormat::Text => {
            let latest = report.latest.as_deref().unwrap_or("unavailable");
            let mut lines = vec![
                format!("{} {}", style("Installed:").bold(), report.local),
                format!("{} {}", style("Latest:").bold(), latest),
            ];
            if report.update_available {
                lines.push(style("An update is available (yt-dlp -U)").yellow().to_string());
            }
            lines.join("\n")
        }
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
    };

    Ok(content)
}

/// Save a resolved media result to file
pub async fn save_to_file(media: &ResolvedMedia, path: &Path, format: &OutputFormat) -> Result<()> {
    let content = format_media(media, format)?;
    fs_err::write(path, content)?;
    Ok(())
}

/// Print a resolved media result to console
pub fn print_to_console(media: &ResolvedMedia, format: &OutputFormat) -> Result<()> {
    println!("{}", format_media(media, format)?);
    Ok(())
}
