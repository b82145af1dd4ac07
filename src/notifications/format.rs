use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};

/// Rendered in place of a timestamp that cannot be parsed.
pub const INVALID_DATE_PLACEHOLDER: &str = "Geçersiz tarih";

/// Parse RFC 3339 or a naive `YYYY-MM-DDTHH:MM:SS[.fff]` (taken as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Relative Turkish rendering of `raw` as seen at `now`.
///
/// Never fails: an unparseable value yields [`INVALID_DATE_PLACEHOLDER`].
pub fn format_timestamp(raw: &str, now: DateTime<Utc>) -> String {
    let Some(ts) = parse_timestamp(raw) else {
        return INVALID_DATE_PLACEHOLDER.to_string();
    };
    let elapsed = now.signed_duration_since(ts);
    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        "az önce".to_string()
    } else if minutes < 60 {
        format!("{} dakika önce", minutes)
    } else if elapsed.num_hours() < 24 {
        format!("{} saat önce", elapsed.num_hours())
    } else if elapsed.num_days() < 7 {
        format!("{} gün önce", elapsed.num_days())
    } else {
        ts.with_timezone(&Local).format("%d.%m.%Y %H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-20T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn ago(d: Duration) -> String {
        (now() - d).to_rfc3339()
    }

    #[test]
    fn test_invalid_date_renders_placeholder() {
        assert_eq!(format_timestamp("not-a-date", now()), "Geçersiz tarih");
        assert_eq!(format_timestamp("", now()), INVALID_DATE_PLACEHOLDER);
    }

    #[test]
    fn test_relative_buckets() {
        assert_eq!(format_timestamp(&ago(Duration::seconds(20)), now()), "az önce");
        assert_eq!(format_timestamp(&ago(Duration::minutes(5)), now()), "5 dakika önce");
        assert_eq!(format_timestamp(&ago(Duration::hours(3)), now()), "3 saat önce");
        assert_eq!(format_timestamp(&ago(Duration::days(2)), now()), "2 gün önce");
    }

    #[test]
    fn test_future_timestamps_read_as_now() {
        assert_eq!(format_timestamp(&ago(Duration::minutes(-10)), now()), "az önce");
    }

    #[test]
    fn test_old_dates_use_absolute_format() {
        let rendered = format_timestamp(&ago(Duration::days(30)), now());
        // Local time zone shifts the hour but not the shape.
        assert_eq!(rendered.len(), "20.04.2024 12:00".len());
        assert!(rendered.contains(".2024 "));
    }

    #[test]
    fn test_naive_timestamps_are_utc() {
        let parsed = parse_timestamp("2024-05-20T11:30:00.000").unwrap();
        assert_eq!(format_timestamp(&parsed.to_rfc3339(), now()), "30 dakika önce");
        assert_eq!(format_timestamp("2024-05-20 11:00:00", now()), "1 saat önce");
    }
}
