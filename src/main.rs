mod analyzer;
mod config;
mod model;
mod normalizer;
mod report;
mod storage;
mod utils;

use analyzer::duration::compute_durations;
use analyzer::{Analyzer, AnalyzerImpl};
use chrono::{Local, NaiveDateTime};
use config::{AppConfig, ConfigError, load_config};
use model::{NormalizeError, StorageError, TimedCase, TrendEntry, YearlyIndicator};
use normalizer::{CaseFilter, join_tables, normalize_cases};
use report::{ChartRenderer, RunSummary, render_indicator_table, render_summary, render_trend};
use std::process;
use storage::{CaseSource, SqliteSource};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
enum AppError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("data source: {0}")]
    Storage(#[from] StorageError),
    #[error("normalization: {0}")]
    Normalize(#[from] NormalizeError),
}

/// Results of one run, ready for reporting.
struct Analysis {
    cases: Vec<TimedCase>,
    indicators: Vec<YearlyIndicator>,
    trend: Vec<TrendEntry>,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.json".to_string());
    if let Err(e) = run(&config_path) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(config_path: &str) -> Result<(), AppError> {
    let config = load_config(config_path)?;
    let as_of = config.as_of.unwrap_or_else(|| Local::now().naive_local());
    info!(
        "🚀 Analyzing outcome '{}' in zone {} for {}-{} (as of {})",
        config.outcome, config.zone, config.year_start, config.year_end, as_of
    );

    let source = SqliteSource::new(
        &config.database_path,
        &config.complaints_table,
        &config.details_table,
    );
    let analysis = analyze(&source, &AnalyzerImpl::new(), &config, as_of)?;

    print!("{}", render_indicator_table(&analysis.indicators));

    // Chart failures are logged inside and never undo the computed results
    let written = ChartRenderer::from_config(&config).render_all(&analysis.indicators, &analysis.cases);
    info!("{} of 3 charts written", written.len());

    print!("{}", render_trend(&analysis.trend));
    print!("{}", render_summary(&RunSummary::new(&config, &analysis.cases)));
    Ok(())
}

/// Loads, joins, filters and aggregates the case records.
fn analyze(
    source: &dyn CaseSource,
    analyzer: &dyn Analyzer,
    config: &AppConfig,
    as_of: NaiveDateTime,
) -> Result<Analysis, AppError> {
    info!("Loading source tables...");
    let tables = source.load()?;

    info!("Joining and filtering...");
    let merged = join_tables(&tables)?;
    drop(tables);
    let cases = normalize_cases(&merged, &CaseFilter::from_config(config))?;

    let cases = compute_durations(&cases, as_of);
    let indicators = analyzer.yearly_indicators(&cases, config.years());
    let trend = analyzer.trend(&indicators);
    info!(
        "{} cases over {} years with data",
        cases.len(),
        indicators.len()
    );

    Ok(Analysis {
        cases,
        indicators,
        trend,
    })
}
