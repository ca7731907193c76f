pub mod charts;
pub mod console;

pub use charts::ChartRenderer;
pub use console::{RunSummary, render_indicator_table, render_summary, render_trend};
