use crate::analyzer::stats;
use crate::analyzer::trend::compare_years;
use crate::model::{TimedCase, TrendEntry, YearlyIndicator};
use std::ops::RangeInclusive;

/// Trait defining the interface for the efficiency analyzer.
pub trait Analyzer {
    /// One indicator row per year of `years` that has at least one case.
    fn yearly_indicators(
        &self,
        cases: &[TimedCase],
        years: RangeInclusive<i32>,
    ) -> Vec<YearlyIndicator>;

    /// Deltas between adjacent rows of the indicator table.
    fn trend(&self, indicators: &[YearlyIndicator]) -> Vec<TrendEntry>;
}

/// Implementation of the efficiency analyzer.
pub struct AnalyzerImpl;

impl AnalyzerImpl {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AnalyzerImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for AnalyzerImpl {
    fn yearly_indicators(
        &self,
        cases: &[TimedCase],
        years: RangeInclusive<i32>,
    ) -> Vec<YearlyIndicator> {
        years
            .filter_map(|year| {
                let in_year: Vec<&TimedCase> = cases.iter().filter(|c| c.year() == year).collect();
                indicator_for_year(year, &in_year)
            })
            .collect()
    }

    fn trend(&self, indicators: &[YearlyIndicator]) -> Vec<TrendEntry> {
        compare_years(indicators)
    }
}

fn indicator_for_year(year: i32, cases: &[&TimedCase]) -> Option<YearlyIndicator> {
    if cases.is_empty() {
        return None;
    }
    let total = cases.len();
    let days: Vec<f64> = cases
        .iter()
        .filter(|c| c.is_concluded())
        .map(|c| c.elapsed_days as f64)
        .collect();
    let concluded = days.len();

    Some(YearlyIndicator {
        year,
        total,
        concluded,
        open: total - concluded,
        completion_rate: completion_rate(concluded, total),
        mean_days: stats::mean(&days),
        median_days: stats::median(&days),
        p90_days: stats::quantile(&days, 0.9),
    })
}

/// Percentage of concluded cases; zero when there are no cases at all.
pub fn completion_rate(concluded: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    concluded as f64 / total as f64 * 100.0
}

/// Elapsed days of concluded cases from `year`.
pub fn concluded_days(cases: &[TimedCase], year: i32) -> Vec<f64> {
    cases
        .iter()
        .filter(|c| c.year() == year && c.is_concluded())
        .map(|c| c.elapsed_days as f64)
        .collect()
}
