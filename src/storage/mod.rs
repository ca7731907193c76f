pub mod sqlite;

pub use sqlite::{CaseSource, SqliteSource};
