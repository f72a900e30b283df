//! Human-readable formatting of durations.

/// Format a number of seconds as `45s`, `12m`, `3h 20m`, or `2d 5h`.
pub fn format_duration(seconds: f64) -> String {
    if seconds < 60.0 {
        return format!("{}s", seconds.round() as u64);
    }
    let minutes = (seconds / 60.0).floor() as u64;
    if minutes < 60 {
        return format!("{minutes}m");
    }
    let hours = minutes / 60;
    let remaining_minutes = minutes % 60;
    if hours < 24 {
        return if remaining_minutes > 0 {
            format!("{hours}h {remaining_minutes}m")
        } else {
            format!("{hours}h")
        };
    }
    let days = hours / 24;
    let remaining_hours = hours % 24;
    if remaining_hours > 0 {
        format!("{days}d {remaining_hours}h")
    } else {
        format!("{days}d")
    }
}
