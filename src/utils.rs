// Utility functions
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%Y%m%d"];

/// Parses a timestamp cell, returning `None` for anything unrecognised.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Whole days from `start` to `end`, rounded toward negative infinity.
pub fn elapsed_days(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    let span = end - start;
    let days = span.num_days();
    if span < TimeDelta::days(days) { days - 1 } else { days }
}

/// Case-insensitive substring test.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "-1" | "true" | "sí" | "si" | "yes" | "x" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        parse_datetime(s).unwrap()
    }

    #[test]
    fn parses_common_layouts() {
        let expected = NaiveDate::from_ymd_opt(2021, 1, 10)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_datetime("2021-01-10"), Some(expected));
        assert_eq!(parse_datetime("2021-01-10 00:00:00"), Some(expected));
        assert_eq!(parse_datetime("10/01/2021"), Some(expected));
        assert_eq!(parse_datetime("2021-01-10T00:00:00"), Some(expected));
    }

    #[test]
    fn garbage_dates_are_none() {
        assert_eq!(parse_datetime(""), None);
        assert_eq!(parse_datetime("pendiente"), None);
        assert_eq!(parse_datetime("2021-13-45"), None);
    }

    #[test]
    fn elapsed_days_counts_whole_days() {
        assert_eq!(elapsed_days(at("2021-01-01"), at("2021-01-10")), 9);
        assert_eq!(elapsed_days(at("2021-01-01"), at("2021-02-01")), 31);
        assert_eq!(
            elapsed_days(at("2021-01-01 08:00:00"), at("2021-01-02 07:59:59")),
            0
        );
    }

    #[test]
    fn elapsed_days_floors_negative_spans() {
        assert_eq!(
            elapsed_days(at("2021-01-01 12:00:00"), at("2021-01-01 06:00:00")),
            -1
        );
    }

    #[test]
    fn elapsed_days_floors_sub_second_spans() {
        assert_eq!(
            elapsed_days(at("2021-01-01 12:00:00.500"), at("2021-01-01 12:00:00")),
            -1
        );
        assert_eq!(
            elapsed_days(at("2021-01-01 12:00:00"), at("2021-01-01 12:00:00.500")),
            0
        );
        assert_eq!(elapsed_days(at("2021-01-10"), at("2021-01-01")), -9);
    }

    #[test]
    fn contains_ci_ignores_case_and_accents_match() {
        assert!(contains_ci("ADMISIÓN parcial", "admis"));
        assert!(contains_ci("Subprocuraduría Zona A", "zona a"));
        assert!(!contains_ci("Zona B", "zona a"));
    }

    #[test]
    fn flags() {
        assert_eq!(parse_flag("-1"), Some(true));
        assert_eq!(parse_flag("Sí"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("tal vez"), None);
    }
}
