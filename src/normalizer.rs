use crate::config::AppConfig;
use crate::model::{CaseRecord, NormalizeError, RawTable, SourceTables, columns};
use crate::utils::{contains_ci, parse_datetime, parse_flag};
use chrono::Datelike;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Inner join of both tables on the case identifier.
#[derive(Debug, Clone, Default)]
pub struct MergedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Predicates applied to the joined records.
#[derive(Debug, Clone)]
pub struct CaseFilter {
    pub year_start: i32,
    pub year_end: i32,
    pub outcome: String,
    pub in_progress_marker: String,
    pub zone_needle: String,
}

impl CaseFilter {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            year_start: config.year_start,
            year_end: config.year_end,
            outcome: config.outcome.clone(),
            in_progress_marker: config.in_progress_marker.clone(),
            zone_needle: config.zone_needle(),
        }
    }

    fn in_years(&self, case: &CaseRecord) -> bool {
        (self.year_start..=self.year_end).contains(&case.year)
    }

    /// Target outcomes and still-pending cases are kept together.
    fn outcome_matches(&self, case: &CaseRecord) -> bool {
        case.outcome.as_deref().is_some_and(|o| {
            contains_ci(o, &self.outcome) || contains_ci(o, &self.in_progress_marker)
        })
    }

    fn zone_matches(&self, case: &CaseRecord) -> bool {
        case.zone
            .as_deref()
            .is_some_and(|z| contains_ci(z, &self.zone_needle))
    }

    pub fn accepts(&self, case: &CaseRecord) -> bool {
        self.in_years(case) && self.outcome_matches(case) && self.zone_matches(case)
    }
}

/// Joins complaints with case details. Rows whose identifier is missing on
/// either side are dropped; clashing detail columns get the detail suffix.
pub fn join_tables(tables: &SourceTables) -> Result<MergedTable, NormalizeError> {
    let left = &tables.complaints;
    let right = &tables.details;
    let left_key = key_index(left)?;
    let right_key = key_index(right)?;

    let mut merged_columns = left.columns.clone();
    let mut right_columns = Vec::new();
    for (idx, name) in right.columns.iter().enumerate() {
        if idx == right_key {
            continue;
        }
        let name = if left.columns.contains(name) {
            format!("{}{}", name, columns::DETAIL_SUFFIX)
        } else {
            name.clone()
        };
        merged_columns.push(name);
        right_columns.push(idx);
    }

    let mut by_key: HashMap<&str, Vec<&Vec<Option<String>>>> = HashMap::new();
    for row in &right.rows {
        if let Some(key) = row[right_key].as_deref() {
            by_key.entry(key).or_default().push(row);
        }
    }

    let mut rows = Vec::new();
    for left_row in &left.rows {
        let Some(key) = left_row[left_key].as_deref() else {
            continue;
        };
        let Some(matches) = by_key.get(key) else {
            continue;
        };
        for right_row in matches {
            let mut merged = left_row.clone();
            merged.extend(right_columns.iter().map(|&idx| right_row[idx].clone()));
            rows.push(merged);
        }
    }

    debug!(
        "Joined {} x {} rows into {}",
        left.rows.len(),
        right.rows.len(),
        rows.len()
    );
    Ok(MergedTable {
        columns: merged_columns,
        rows,
    })
}

fn key_index(table: &RawTable) -> Result<usize, NormalizeError> {
    table
        .column_index(columns::ID)
        .ok_or_else(|| NormalizeError::MissingColumn(format!("{}.{}", table.name, columns::ID)))
}

/// Positions of the canonical columns inside a merged row.
struct CanonicalLayout {
    id: usize,
    zone: usize,
    started_at: usize,
    origin: usize,
    channel: usize,
    outcome: usize,
    concluded_at: usize,
    vulnerable_group: usize,
}

impl CanonicalLayout {
    fn resolve(table: &MergedTable) -> Result<Self, NormalizeError> {
        let find = |name: &str| {
            table
                .columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| NormalizeError::MissingColumn(name.to_string()))
        };
        Ok(Self {
            id: find(columns::ID)?,
            zone: find(columns::ZONE)?,
            started_at: find(columns::STARTED_AT)?,
            origin: find(columns::ORIGIN)?,
            channel: find(columns::CHANNEL)?,
            outcome: find(columns::OUTCOME)?,
            concluded_at: find(columns::CONCLUDED_AT)?,
            vulnerable_group: find(columns::VULNERABLE_GROUP)?,
        })
    }

    /// Builds a record, or `None` when the identifier or start date is unusable.
    fn record(&self, row: &[Option<String>]) -> Option<CaseRecord> {
        let id = row[self.id].clone()?;
        let started_at = row[self.started_at].as_deref().and_then(parse_datetime)?;
        Some(CaseRecord {
            id,
            zone: row[self.zone].clone(),
            started_at,
            origin: row[self.origin].clone(),
            channel: row[self.channel].clone(),
            outcome: row[self.outcome].clone(),
            concluded_at: row[self.concluded_at].as_deref().and_then(parse_datetime),
            vulnerable_group: row[self.vulnerable_group].as_deref().and_then(parse_flag),
            year: started_at.year(),
        })
    }
}

/// Canonicalizes, filters, sorts and deduplicates the joined records.
pub fn normalize_cases(
    merged: &MergedTable,
    filter: &CaseFilter,
) -> Result<Vec<CaseRecord>, NormalizeError> {
    let layout = CanonicalLayout::resolve(merged)?;

    let mut cases: Vec<CaseRecord> = merged
        .rows
        .iter()
        .filter_map(|row| layout.record(row))
        .filter(|case| filter.accepts(case))
        .collect();
    let matched = cases.len();

    cases.sort_by(|a, b| {
        a.started_at
            .cmp(&b.started_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut seen_rows = HashSet::new();
    cases.retain(|case| seen_rows.insert(case.clone()));
    let mut seen_ids = HashSet::new();
    cases.retain(|case| seen_ids.insert(case.id.clone()));

    info!(
        "{} of {} joined rows matched filters, {} unique cases",
        matched,
        merged.rows.len(),
        cases.len()
    );
    Ok(cases)
}
