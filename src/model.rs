// Core structs: CaseRecord, TimedCase, YearlyIndicator, TrendEntry
use chrono::NaiveDateTime;
use thiserror::Error;

/// Column names shared by the complaint and case-detail tables.
pub mod columns {
    pub const ID: &str = "Expediente";
    pub const ZONE: &str = "SubProcu";
    pub const STARTED_AT: &str = "FechaInicio";
    pub const ORIGIN: &str = "LugarProcedencia";
    pub const CHANNEL: &str = "Recepcion";
    pub const OUTCOME: &str = "Conclusión";
    pub const CONCLUDED_AT: &str = "F_Conclusion";
    pub const VULNERABLE_GROUP: &str = "GrupoVulnerable";

    /// Suffix given to detail-table columns that clash with complaint columns.
    pub const DETAIL_SUFFIX: &str = "_expediente";
}

/// A table as read from the data source: every cell rendered as nullable text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

/// Both record sets needed by the pipeline.
#[derive(Debug, Clone)]
pub struct SourceTables {
    pub complaints: RawTable,
    pub details: RawTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CaseRecord {
    pub id: String,
    pub zone: Option<String>,
    pub started_at: NaiveDateTime,
    pub origin: Option<String>,
    pub channel: Option<String>,
    pub outcome: Option<String>,
    pub concluded_at: Option<NaiveDateTime>,
    pub vulnerable_group: Option<bool>,
    pub year: i32,
}

impl CaseRecord {
    pub fn is_concluded(&self) -> bool {
        self.concluded_at.is_some()
    }
}

/// A case with its elapsed days relative to its conclusion or the as-of cutoff.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedCase {
    pub record: CaseRecord,
    pub elapsed_days: i64,
}

impl TimedCase {
    pub fn year(&self) -> i32 {
        self.record.year
    }

    pub fn is_concluded(&self) -> bool {
        self.record.is_concluded()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearlyIndicator {
    pub year: i32,
    pub total: usize,
    pub concluded: usize,
    pub open: usize,
    pub completion_rate: f64,
    pub mean_days: Option<f64>,
    pub median_days: Option<f64>,
    pub p90_days: Option<f64>,
}

/// Change between two adjacent rows of the indicator table.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendEntry {
    pub year: i32,
    pub previous_year: i32,
    pub median_delta: Option<f64>,
    pub rate_delta: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Improved,
    Regressed,
}

impl TrendEntry {
    /// Shorter median resolution time is an improvement.
    pub fn median_direction(&self) -> Option<Direction> {
        self.median_delta.map(|d| {
            if d < 0.0 {
                Direction::Improved
            } else {
                Direction::Regressed
            }
        })
    }

    pub fn rate_direction(&self) -> Direction {
        if self.rate_delta > 0.0 {
            Direction::Improved
        } else {
            Direction::Regressed
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("table {table} has no column {column}")]
    MissingColumn { table: String, column: String },
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("joined records have no column {0}")]
    MissingColumn(String),
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("failed to prepare output directory: {0}")]
    Io(#[from] std::io::Error),
    #[error("rendering failed: {0}")]
    Render(String),
}
