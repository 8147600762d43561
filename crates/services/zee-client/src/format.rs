//! Human-readable rendering of sizes, durations and timestamps.

use chrono::{DateTime, Utc};

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Render a byte count with a 1024-based unit, e.g. `1.5 KB`.
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{} {}", one_decimal(value), UNITS[unit])
}

/// Render a generation time: `250ms` below one second, `1.5s` above.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    if seconds < 1.0 {
        return format!("{}ms", (seconds * 1000.0).round() as u64);
    }
    format!("{seconds:.1}s")
}

/// Relative age of `then` as seen at `now`.
///
/// `just now`, `5m ago`, `3h ago`, `12d ago`; older than 30 days falls back to
/// the calendar date.
#[must_use]
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 30 {
        format!("{days}d ago")
    } else {
        then.format("%Y-%m-%d").to_string()
    }
}

fn one_decimal(value: f64) -> String {
    let text = format!("{value:.1}");
    if let Some(whole) = text.strip_suffix(".0") {
        return whole.to_string();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(3_338_801_804), "3.1 GB");
        assert_eq!(format_bytes(5 * 1024_u64.pow(5)), "5120 TB");
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(0.25), "250ms");
        assert_eq!(format_duration(0.0004), "0ms");
        assert_eq!(format_duration(1.0), "1.0s");
        assert_eq!(format_duration(12.345), "12.3s");
    }

    #[test]
    fn relative_times() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(time_ago(now - Duration::seconds(30), now), "just now");
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(time_ago(now - Duration::minutes(61), now), "1h ago");
        assert_eq!(time_ago(now - Duration::hours(49), now), "2d ago");
        assert_eq!(time_ago(now - Duration::days(45), now), "2025-01-24");
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(time_ago(now + Duration::minutes(3), now), "just now");
    }
}
