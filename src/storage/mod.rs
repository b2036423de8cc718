//! Persistence layer.

pub mod sqlite;

pub use sqlite::{DEFAULT_DB_PATH, ReportEntry, SnapshotEntry, SqliteStore};
