use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Convert a millisecond timestamp to a UTC datetime, `None` when out of range.
pub fn datetime_from_millis(ts_millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ts_millis).single()
}

/// UTC calendar date of a millisecond timestamp.
pub fn date_from_millis(ts_millis: i64) -> Option<NaiveDate> {
    datetime_from_millis(ts_millis).map(|dt| dt.date_naive())
}

/// UTC month key ("YYYY-MM") of a millisecond timestamp.
pub fn month_key(ts_millis: i64) -> Option<String> {
    datetime_from_millis(ts_millis).map(|dt| dt.format("%Y-%m").to_string())
}

/// Format a millisecond timestamp as UTC string, or return a placeholder on error.
pub fn format_timestamp(ts_millis: i64) -> String {
    match datetime_from_millis(ts_millis) {
        Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "invalid timestamp".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_from_millis_is_utc() {
        // 2023-01-01 23:30:00 UTC
        let ts = 1_672_615_800_000;
        assert_eq!(
            date_from_millis(ts),
            NaiveDate::from_ymd_opt(2023, 1, 1)
        );
        assert_eq!(month_key(ts).as_deref(), Some("2023-01"));
        assert_eq!(format_timestamp(ts), "2023-01-01 23:30:00");
    }

    #[test]
    fn test_out_of_range_timestamp() {
        assert_eq!(date_from_millis(i64::MAX), None);
        assert_eq!(month_key(i64::MAX), None);
        assert_eq!(format_timestamp(i64::MAX), "invalid timestamp");
    }
}
