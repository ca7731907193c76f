use crate::model::{TrendEntry, YearlyIndicator};

/// Compares each indicator row with the one before it. Rows are adjacent in
/// the table, not necessarily in the calendar.
pub fn compare_years(indicators: &[YearlyIndicator]) -> Vec<TrendEntry> {
    indicators
        .windows(2)
        .map(|w| {
            let (prev, cur) = (&w[0], &w[1]);
            let median_delta = match (cur.median_days, prev.median_days) {
                (Some(c), Some(p)) => Some(c - p),
                _ => None,
            };
            TrendEntry {
                year: cur.year,
                previous_year: prev.year,
                median_delta,
                rate_delta: cur.completion_rate - prev.completion_rate,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Direction;

    fn row(year: i32, rate: f64, median: Option<f64>) -> YearlyIndicator {
        YearlyIndicator {
            year,
            total: 10,
            concluded: (rate / 10.0) as usize,
            open: 10 - (rate / 10.0) as usize,
            completion_rate: rate,
            mean_days: median,
            median_days: median,
            p90_days: median,
        }
    }

    #[test]
    fn single_row_has_no_trend() {
        assert!(compare_years(&[row(2021, 50.0, Some(10.0))]).is_empty());
        assert!(compare_years(&[]).is_empty());
    }

    #[test]
    fn shorter_median_and_higher_rate_improve() {
        let trend = compare_years(&[row(2020, 40.0, Some(30.0)), row(2021, 60.0, Some(20.0))]);
        assert_eq!(trend.len(), 1);
        let t = &trend[0];
        assert_eq!((t.previous_year, t.year), (2020, 2021));
        assert_eq!(t.median_delta, Some(-10.0));
        assert_eq!(t.median_direction(), Some(Direction::Improved));
        assert_eq!(t.rate_delta, 20.0);
        assert_eq!(t.rate_direction(), Direction::Improved);
    }

    #[test]
    fn unchanged_values_count_as_regression() {
        let trend = compare_years(&[row(2020, 50.0, Some(10.0)), row(2021, 50.0, Some(10.0))]);
        assert_eq!(trend[0].median_direction(), Some(Direction::Regressed));
        assert_eq!(trend[0].rate_direction(), Direction::Regressed);
    }

    #[test]
    fn undefined_median_has_no_direction() {
        let trend = compare_years(&[row(2020, 0.0, None), row(2021, 50.0, Some(10.0))]);
        assert_eq!(trend[0].median_delta, None);
        assert_eq!(trend[0].median_direction(), None);
        assert_eq!(trend[0].rate_direction(), Direction::Improved);
    }

    #[test]
    fn gap_years_compare_neighbours_directly() {
        let trend = compare_years(&[row(2020, 50.0, Some(12.0)), row(2022, 30.0, Some(15.0))]);
        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].previous_year, 2020);
        assert_eq!(trend[0].year, 2022);
        assert_eq!(trend[0].median_delta, Some(3.0));
        assert_eq!(trend[0].rate_direction(), Direction::Regressed);
    }
}
