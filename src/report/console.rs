// Console report: indicator table, trend lines and executive summary.
use crate::config::AppConfig;
use crate::model::{Direction, TimedCase, TrendEntry, YearlyIndicator};
use std::fmt::Write;

const RULE_WIDTH: usize = 80;

/// Counts shown in the executive summary.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub year_start: i32,
    pub year_end: i32,
    pub outcome: String,
    pub zone: String,
    pub analyzed: usize,
    pub concluded: usize,
    pub open: usize,
}

impl RunSummary {
    pub fn new(config: &AppConfig, cases: &[TimedCase]) -> Self {
        let concluded = cases.iter().filter(|c| c.is_concluded()).count();
        Self {
            year_start: config.year_start,
            year_end: config.year_end,
            outcome: config.outcome.clone(),
            zone: config.zone.clone(),
            analyzed: cases.len(),
            concluded,
            open: cases.len() - concluded,
        }
    }
}

fn heading(out: &mut String, title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    let _ = writeln!(out, "\n{rule}\n{title}\n{rule}");
}

fn fmt_days(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

/// Formats a count with comma thousands separators.
pub fn format_count(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn render_indicator_table(rows: &[YearlyIndicator]) -> String {
    let mut out = String::new();
    heading(&mut out, "EFFICIENCY INDICATORS BY YEAR");
    if rows.is_empty() {
        out.push_str("No cases matched the configured filters\n");
        return out;
    }
    let _ = writeln!(
        out,
        "{:>6} {:>8} {:>10} {:>8} {:>12} {:>10} {:>12} {:>10}",
        "Year", "Total", "Concluded", "Open", "Completion%", "MeanDays", "MedianDays", "P90Days"
    );
    for r in rows {
        let _ = writeln!(
            out,
            "{:>6} {:>8} {:>10} {:>8} {:>12.2} {:>10} {:>12} {:>10}",
            r.year,
            r.total,
            r.concluded,
            r.open,
            r.completion_rate,
            fmt_days(r.mean_days),
            fmt_days(r.median_days),
            fmt_days(r.p90_days),
        );
    }
    out
}

fn marker(direction: Direction) -> &'static str {
    match direction {
        Direction::Improved => "✅",
        Direction::Regressed => "❌",
    }
}

pub fn render_trend(entries: &[TrendEntry]) -> String {
    let mut out = String::new();
    heading(&mut out, "EFFICIENCY TREND ANALYSIS");
    if entries.is_empty() {
        out.push_str("Not enough data to analyse trends\n");
        return out;
    }
    for t in entries {
        if let (Some(delta), Some(direction)) = (t.median_delta, t.median_direction()) {
            let verb = match direction {
                Direction::Improved => "IMPROVED",
                Direction::Regressed => "WORSENED",
            };
            let _ = writeln!(
                out,
                "{} {} vs {}: median {} by {:.1} days",
                marker(direction),
                t.year,
                t.previous_year,
                verb,
                delta.abs()
            );
        }
        let direction = t.rate_direction();
        let label = match direction {
            Direction::Improved => format!("HIGHER completion rate (+{:.1}%)", t.rate_delta),
            Direction::Regressed => format!("LOWER completion rate ({:.1}%)", t.rate_delta),
        };
        let _ = writeln!(
            out,
            "{} {} vs {}: {}",
            marker(direction),
            t.year,
            t.previous_year,
            label
        );
        out.push_str("---\n");
    }
    out
}

pub fn render_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    heading(&mut out, "EXECUTIVE SUMMARY");
    let _ = writeln!(out, "Period analyzed: {} - {}", summary.year_start, summary.year_end);
    let _ = writeln!(out, "Outcome type: {}", summary.outcome);
    let _ = writeln!(out, "Zone: {}", summary.zone);
    let _ = writeln!(out, "Cases analyzed: {}", format_count(summary.analyzed));
    let _ = writeln!(out, "Cases concluded: {}", format_count(summary.concluded));
    let _ = writeln!(out, "Cases in progress: {}", format_count(summary.open));
    out
}
