//! Human readable text for interval and timestamp columns.

use chrono::{Duration, NaiveDateTime, Timelike};

const MICROS_PER_SECOND: i64 = 1_000_000;
const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;

/// Renders an interval as `[-]D day[s], H:MM:SS[.ffffff]`.
///
/// The day part is omitted when it is zero. Negative intervals carry the
/// sign on the day count only, the clock part is always positive, so one
/// second before zero reads `-1 day, 23:59:59`.
pub fn format_interval(interval: Duration) -> String {
    // Overflows only beyond ~292k years.
    let micros = interval.num_microseconds().unwrap_or(i64::MAX);
    let days = micros.div_euclid(MICROS_PER_DAY);
    let rest = micros.rem_euclid(MICROS_PER_DAY);

    let seconds = rest / MICROS_PER_SECOND;
    let fraction = rest % MICROS_PER_SECOND;
    let clock = format!(
        "{}:{:02}:{:02}",
        seconds / 3600,
        (seconds / 60) % 60,
        seconds % 60
    );

    let mut text = String::new();
    if days != 0 {
        let unit = if days.abs() == 1 { "day" } else { "days" };
        text.push_str(&format!("{} {}, ", days, unit));
    }
    text.push_str(&clock);
    if fraction != 0 {
        text.push_str(&format!(".{:06}", fraction));
    }
    text
}

/// Renders a timestamp as `YYYY-MM-DD HH:MM:SS[.ffffff]`.
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    if timestamp.nanosecond() / 1_000 == 0 {
        timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        timestamp.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}
