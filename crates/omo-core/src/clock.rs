//! Wall-clock helpers.
//!
//! The model works in minutes since the Unix epoch; the hold timers work in
//! epoch milliseconds. Both come from the same reading.

use chrono::Utc;

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn ms_to_minutes(ms: i64) -> f64 {
    ms as f64 / 60_000.0
}

/// `hh:mm:ss` for a number of whole seconds. Hours are not wrapped at 24.
pub fn format_hms(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_hours_minutes_seconds() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(61), "00:01:01");
        assert_eq!(format_hms(3 * 3600 + 25 * 60 + 9), "03:25:09");
        assert_eq!(format_hms(100 * 3600), "100:00:00");
    }

    #[test]
    fn converts_ms_to_minutes() {
        assert_eq!(ms_to_minutes(90_000), 1.5);
    }
}
