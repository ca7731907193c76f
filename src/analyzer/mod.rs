// Analyzer module: durations, yearly efficiency indicators and trends.

pub mod duration;
pub mod efficiency;
pub mod stats;
pub mod trend;

// Re-export the main Analyzer implementation for ease of use.
pub use efficiency::{Analyzer, AnalyzerImpl};
