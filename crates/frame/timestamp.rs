use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parses the timestamp layouts found in row files. Values without an
/// offset are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    let naive = value.strip_suffix(" UTC").unwrap_or(value);
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(naive, fmt) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn parsed(value: &str) -> DateTime<Utc> {
        parse_timestamp(value).unwrap_or_else(|| panic!("{} did not parse", value))
    }

    #[test]
    fn test_pandas_layout() {
        let dt = parsed("2019-05-31 00:00:12+00:00");
        assert_eq!((dt.year(), dt.month(), dt.day()), (2019, 5, 31));
        assert_eq!(dt.second(), 12);

        let dt = parsed("2019-05-31 23:59:59.123456+00:00");
        assert_eq!(dt.nanosecond(), 123_456_000);
    }

    #[test]
    fn test_offset_is_normalised() {
        let dt = parsed("2019-06-01 01:30:00+02:00");
        assert_eq!(dt.day(), 31);
        assert_eq!(dt.hour(), 23);
    }

    #[test]
    fn test_other_layouts() {
        assert_eq!(parsed("2019-05-31T00:00:12Z"), parsed("2019-05-31 00:00:12+00:00"));
        assert_eq!(parsed("2019-05-31 00:00:12 UTC"), parsed("2019-05-31 00:00:12+00:00"));
        assert_eq!(parsed("2019-05-31 00:00:12"), parsed("2019-05-31 00:00:12+00:00"));
        assert_eq!(parsed("2019-05-31"), parsed("2019-05-31 00:00:00+00:00"));
    }

    #[test]
    fn test_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("2019-13-01").is_none());
    }
}
