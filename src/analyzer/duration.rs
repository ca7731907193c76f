use crate::model::{CaseRecord, TimedCase};
use crate::utils::elapsed_days;
use chrono::NaiveDateTime;
use tracing::debug;

/// Attaches elapsed days to each case: start to conclusion for concluded
/// cases, start to `as_of` for open ones. Negative spans are dropped.
pub fn compute_durations(cases: &[CaseRecord], as_of: NaiveDateTime) -> Vec<TimedCase> {
    let timed: Vec<TimedCase> = cases
        .iter()
        .filter_map(|case| {
            let end = case.concluded_at.unwrap_or(as_of);
            let days = elapsed_days(case.started_at, end);
            (days >= 0).then(|| TimedCase {
                record: case.clone(),
                elapsed_days: days,
            })
        })
        .collect();

    let dropped = cases.len() - timed.len();
    if dropped > 0 {
        debug!("Dropped {} cases with negative elapsed days", dropped);
    }
    timed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::parse_datetime;
    use chrono::Datelike;

    fn case(id: &str, start: &str, concluded: Option<&str>) -> CaseRecord {
        let started_at = parse_datetime(start).unwrap();
        CaseRecord {
            id: id.into(),
            zone: Some("Zona A".into()),
            started_at,
            origin: None,
            channel: None,
            outcome: Some("Admisión".into()),
            concluded_at: concluded.and_then(parse_datetime),
            vulnerable_group: None,
            year: started_at.year(),
        }
    }

    fn as_of() -> NaiveDateTime {
        parse_datetime("2021-02-01").unwrap()
    }

    #[test]
    fn concluded_case_measures_to_conclusion() {
        let timed = compute_durations(&[case("C1", "2021-01-01", Some("2021-01-10"))], as_of());
        assert_eq!(timed[0].elapsed_days, 9);
        assert!(timed[0].is_concluded());
    }

    #[test]
    fn open_case_measures_to_as_of() {
        let timed = compute_durations(&[case("C1", "2021-01-01", None)], as_of());
        assert_eq!(timed[0].elapsed_days, 31);
        assert!(!timed[0].is_concluded());
    }

    #[test]
    fn conclusion_before_start_is_dropped() {
        let cases = [
            case("C1", "2021-01-10", Some("2021-01-01")),
            case("C2", "2021-01-01 12:00:00", Some("2021-01-01 06:00:00")),
            case("C3", "2021-01-01", Some("2021-01-01")),
        ];
        let timed = compute_durations(&cases, as_of());
        assert_eq!(timed.len(), 1);
        assert_eq!(timed[0].record.id, "C3");
        assert_eq!(timed[0].elapsed_days, 0);
    }

    #[test]
    fn open_case_started_after_as_of_is_dropped() {
        let timed = compute_durations(&[case("C1", "2021-03-01", None)], as_of());
        assert!(timed.is_empty());
    }

    #[test]
    fn surviving_days_are_never_negative() {
        let cases = [
            case("C1", "2021-01-01", Some("2020-12-01")),
            case("C2", "2021-01-05", Some("2021-01-20")),
            case("C3", "2021-01-20", None),
            case("C4", "2021-06-01", None),
        ];
        let timed = compute_durations(&cases, as_of());
        assert!(timed.iter().all(|t| t.elapsed_days >= 0));
        assert_eq!(timed.len(), 2);
    }
}
