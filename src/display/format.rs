//! Formatting helpers for terminal output
//!
//! Shared primitives used by the report renderers.

use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};

/// Format a file size in human-readable form
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Format an elapsed operation time
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    if total_seconds == 0 {
        return format!("{}ms", duration.as_millis());
    }
    if total_seconds < 60 {
        return format!("{:.1}s", duration.as_secs_f64());
    }

    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    if minutes < 60 {
        return format!("{}m {}s", minutes, seconds);
    }

    let hours = minutes / 60;
    format!("{}h {}m", hours, minutes % 60)
}

/// Format a timestamp in local time
pub fn format_timestamp(time: SystemTime) -> String {
    let local: DateTime<Local> = time.into();
    local.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format how long ago a timestamp was
pub fn format_age(time: SystemTime) -> String {
    let elapsed = match time.elapsed() {
        Ok(elapsed) => elapsed,
        Err(_) => return "in the future".to_string(),
    };
    let total_seconds = elapsed.as_secs();

    if total_seconds < 60 {
        return format!("{}s ago", total_seconds);
    }
    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h ago", hours);
    }
    let days = hours / 24;
    if days < 30 {
        return format!("{}d ago", days);
    }
    format!("{}mo ago", days / 30)
}

/// Format an integrity percentage with one decimal place
pub fn format_score(score: f64) -> String {
    format!("{:.1}%", score)
}
