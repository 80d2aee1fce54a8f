use chrono::{DateTime, Utc};

/// Format a timestamp as a short calendar date, e.g. `16 Oct 2026`.
pub fn format_date(dt: DateTime<Utc>) -> String {
    dt.format("%-d %b %Y").to_string()
}

/// Format a timestamp with date and 24-hour time, e.g. `16 Oct 2026, 14:05`.
pub fn format_date_time(dt: DateTime<Utc>) -> String {
    dt.format("%-d %b %Y, %H:%M").to_string()
}

/// Describe how long ago `dt` was, relative to `now`
///
/// Anything under a minute is "just now"; minutes, hours and days follow,
/// and from a week onwards (or for instants in the future) the plain date
/// from `format_date` is returned.
///
/// # Examples
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use paged_loader::dates::format_relative;
///
/// let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
/// assert_eq!(format_relative(now - Duration::hours(3), now), "3 hours ago");
/// assert_eq!(format_relative(now - Duration::days(30), now), "16 Sep 2026");
/// ```
pub fn format_relative(dt: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(dt);
    if elapsed < chrono::Duration::zero() {
        return format_date(dt);
    }

    let seconds = elapsed.num_seconds();
    if seconds < 60 {
        "just now".to_string()
    } else if seconds < 60 * 60 {
        plural(elapsed.num_minutes(), "minute")
    } else if seconds < 24 * 60 * 60 {
        plural(elapsed.num_hours(), "hour")
    } else if elapsed.num_days() < 7 {
        plural(elapsed.num_days(), "day")
    } else {
        format_date(dt)
    }
}

/// Parse an RFC 3339 timestamp such as `2026-10-16T14:05:00Z`.
pub fn parse_iso(input: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(input).map(|dt| dt.with_timezone(&Utc))
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}
