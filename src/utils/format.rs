use chrono::{DateTime, Datelike, Local, Utc};

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

/// Human-readable byte count: `512 B`, `1.5 KB`, `2.0 MB`.
pub fn format_size(bytes: u64) -> String {
    if bytes < KIB {
        format!("{} B", bytes)
    } else if bytes < MIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}

/// Epoch milliseconds as local `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp(millis: i64) -> String {
    match DateTime::from_timestamp_millis(millis) {
        Some(ts) => ts.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "-".to_string(),
    }
}

/// Format timestamp with tiered display:
/// - Relative for <7 days: "2h ago", "3d ago"
/// - Absolute for ≥7 days: "Jan 15", "Dec 3, 2024"
pub fn format_relative(millis: i64) -> String {
    format_relative_at(millis, Utc::now())
}

fn format_relative_at(millis: i64, now: DateTime<Utc>) -> String {
    let Some(timestamp) = DateTime::from_timestamp_millis(millis) else {
        return "-".to_string();
    };
    let duration = now.signed_duration_since(timestamp);

    if duration.num_days() < 7 {
        let seconds = duration.num_seconds().max(0);
        let minutes = seconds / 60;
        let hours = minutes / 60;
        let days = hours / 24;

        if days > 0 {
            format!("{}d ago", days)
        } else if hours > 0 {
            format!("{}h ago", hours)
        } else if minutes > 0 {
            format!("{}m ago", minutes)
        } else {
            "just now".to_string()
        }
    } else if timestamp.year() == now.year() {
        timestamp.format("%b %-d").to_string()
    } else {
        timestamp.format("%b %-d, %Y").to_string()
    }
}
