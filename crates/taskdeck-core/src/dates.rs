//! Date parsing and formatting helpers.
//!
//! The backend is loose about date formats: due dates may arrive as bare
//! `YYYY-MM-DD`, timestamps as naive `YYYY-MM-DDTHH:MM:SS`, or full RFC 3339.
//! Everything is normalized to `DateTime<Utc>`; naive values are read as UTC.
//!
//! All "is it overdue" checks in the workspace go through [`is_overdue`],
//! which compares against the exact instant passed in.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

/// Parses any of the date shapes the backend emits.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `"Mar 5, 2025"`
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// `"Mar 5, 2025, 02:30 PM"`
pub fn format_date_time(date: &DateTime<Utc>) -> String {
    date.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// Human relative phrase such as `"Tomorrow"`, `"In 3 days"` or `"2 hours ago"`.
///
/// Buckets are floored, so something 36 hours away reads "Tomorrow" and
/// something 90 minutes ago reads "2 hours ago".
pub fn relative_time(date: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff_ms = (*date - now).num_milliseconds();
    let days = diff_ms.div_euclid(1000 * 60 * 60 * 24);
    let hours = diff_ms.div_euclid(1000 * 60 * 60);
    let minutes = diff_ms.div_euclid(1000 * 60);

    if days > 0 {
        if days == 1 {
            "Tomorrow".to_string()
        } else {
            format!("In {days} days")
        }
    } else if days < 0 {
        let abs = days.abs();
        if abs == 1 {
            "Yesterday".to_string()
        } else {
            format!("{abs} days ago")
        }
    } else if hours > 0 {
        format!("In {hours} hour{}", plural(hours))
    } else if hours < 0 {
        let abs = hours.abs();
        format!("{abs} hour{} ago", plural(abs))
    } else if minutes > 0 {
        format!("In {minutes} minute{}", plural(minutes))
    } else if minutes < 0 {
        let abs = minutes.abs();
        format!("{abs} minute{} ago", plural(abs))
    } else {
        "Just now".to_string()
    }
}

fn plural(n: i64) -> &'static str {
    if n > 1 { "s" } else { "" }
}

/// True when `date` is strictly before `now`.
pub fn is_overdue(date: &DateTime<Utc>, now: DateTime<Utc>) -> bool {
    *date < now
}

/// True when `date` lies in `[now, now + days]`.
pub fn is_within_days(date: &DateTime<Utc>, days: i64, now: DateTime<Utc>) -> bool {
    *date >= now && *date <= days_after(now, days)
}

/// `now` shifted by `days`, saturating at the representable range.
fn days_after(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    Duration::try_days(days)
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(if days < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

/// Serde adapter for optional timestamps in any of the accepted shapes.
///
/// Serializes as RFC 3339.
pub mod optional_datetime {
    use super::parse_datetime;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => parse_datetime(&s)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("unrecognized date format: {s}"))),
        }
    }
}
