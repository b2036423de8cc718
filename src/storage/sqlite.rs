//! `SQLite` persistence for reports, prompt overrides and competitor
//! snapshots.
//!
//! # Schema
//!
//! ```text
//! system_prompts(key PK, value, updated_at)
//! reports_history(id PK, timestamp, report_type, target_entity,
//!                 report_content, raw_data_json)
//! competitor_snapshots(id PK, timestamp, domain, entity, visibility,
//!                      sentiment, topic, top_source, simulated)
//! ```

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use tracing::debug;

use crate::analysis::{CompetitorRecord, Domain};
use crate::error::StorageError;

/// Default database location relative to the working directory.
pub const DEFAULT_DB_PATH: &str = ".intel/intel.db";

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS system_prompts (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS reports_history (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    report_type TEXT NOT NULL,
    target_entity TEXT NOT NULL,
    report_content TEXT NOT NULL,
    raw_data_json TEXT
);
CREATE INDEX IF NOT EXISTS idx_reports_type ON reports_history(report_type);

CREATE TABLE IF NOT EXISTS competitor_snapshots (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    domain TEXT NOT NULL,
    entity TEXT NOT NULL,
    visibility INTEGER NOT NULL,
    sentiment TEXT NOT NULL,
    topic TEXT NOT NULL,
    top_source TEXT NOT NULL,
    simulated INTEGER NOT NULL DEFAULT 0
);
CREATE INDEX IF NOT EXISTS idx_snapshots_entity ON competitor_snapshots(entity);
";

/// A stored report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    /// Row id.
    pub id: i64,
    /// RFC 3339 creation time.
    pub timestamp: String,
    /// Report category, e.g. `DEEP_RESEARCH`.
    pub report_type: String,
    /// Company the report is about.
    pub target_entity: String,
    /// Report body.
    pub content: String,
    /// Structured data behind the report, if any.
    pub raw_data: Option<serde_json::Value>,
}

/// A stored competitor measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotEntry {
    /// Row id.
    pub id: i64,
    /// RFC 3339 creation time.
    pub timestamp: String,
    /// Market domain.
    pub domain: String,
    /// Entity name.
    pub entity: String,
    /// Visibility score.
    pub visibility: i64,
    /// Sentiment label.
    pub sentiment: String,
    /// Dominant topic.
    pub topic: String,
    /// First source URL.
    pub top_source: String,
    /// Whether the record came from simulated snippets.
    pub simulated: bool,
}

/// Single-connection `SQLite` store.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (and creates) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the directory or database cannot be
    /// created.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        let store = Self { conn };
        store.init_schema()?;
        debug!(path = %path.display(), "database opened");
        Ok(store)
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if schema creation fails.
    pub fn in_memory() -> Result<Self, StorageError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Inserts or replaces a prompt override.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] on write failure.
    pub fn save_prompt(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO system_prompts (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Returns the stored prompt for `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] on read failure.
    pub fn get_prompt(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM system_prompts WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// Returns the stored prompt for `key`, seeding it with `default` when
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] on read or write failure.
    pub fn get_prompt_or(&self, key: &str, default: &str) -> Result<String, StorageError> {
        if let Some(value) = self.get_prompt(key)? {
            return Ok(value);
        }
        self.save_prompt(key, default)?;
        Ok(default.to_string())
    }

    /// Lists all stored prompt overrides by key.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] on read failure.
    pub fn prompts(&self) -> Result<Vec<(String, String)>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM system_prompts ORDER BY key")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Records a report. Returns its row id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] on serialization or write failure.
    pub fn save_report<T: Serialize>(
        &self,
        report_type: &str,
        target_entity: &str,
        content: &str,
        raw_data: Option<&T>,
    ) -> Result<i64, StorageError> {
        let raw_json = raw_data.map(serde_json::to_string).transpose()?;
        self.conn.execute(
            "INSERT INTO reports_history (timestamp, report_type, target_entity, report_content, raw_data_json)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![Utc::now().to_rfc3339(), report_type, target_entity, content, raw_json],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, report_type, target_entity, "report saved");
        Ok(id)
    }

    /// Lists reports newest first, optionally filtered by type.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] on read failure.
    pub fn history(&self, limit: usize, report_type: Option<&str>) -> Result<Vec<ReportEntry>, StorageError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(
            "SELECT id, timestamp, report_type, target_entity, report_content, raw_data_json
             FROM reports_history
             WHERE ?1 IS NULL OR report_type = ?1
             ORDER BY id DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![report_type, limit], |row| {
            let raw: Option<String> = row.get(5)?;
            Ok(ReportEntry {
                id: row.get(0)?,
                timestamp: row.get(1)?,
                report_type: row.get(2)?,
                target_entity: row.get(3)?,
                content: row.get(4)?,
                raw_data: raw.and_then(|r| serde_json::from_str(&r).ok()),
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Records one competitor measurement. Returns its row id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] on write failure.
    pub fn save_snapshot(&self, domain: Domain, record: &CompetitorRecord) -> Result<i64, StorageError> {
        let visibility = i64::try_from(record.visibility).unwrap_or(i64::MAX);
        self.conn.execute(
            "INSERT INTO competitor_snapshots
                (timestamp, domain, entity, visibility, sentiment, topic, top_source, simulated)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                Utc::now().to_rfc3339(),
                domain.as_str(),
                record.entity,
                visibility,
                record.sentiment.as_str(),
                record.topic,
                record.top_source,
                record.simulated,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Lists snapshots for `entity`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Database`] on read failure.
    pub fn snapshots(&self, entity: &str, limit: usize) -> Result<Vec<SnapshotEntry>, StorageError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(
            "SELECT id, timestamp, domain, entity, visibility, sentiment, topic, top_source, simulated
             FROM competitor_snapshots
             WHERE entity = ?1 COLLATE NOCASE
             ORDER BY id DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![entity, limit], |row| {
            Ok(SnapshotEntry {
                id: row.get(0)?,
                timestamp: row.get(1)?,
                domain: row.get(2)?,
                entity: row.get(3)?,
                visibility: row.get(4)?,
                sentiment: row.get(5)?,
                topic: row.get(6)?,
                top_source: row.get(7)?,
                simulated: row.get(8)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{EntityKind, Sentiment};

    fn store() -> SqliteStore {
        SqliteStore::in_memory().unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn test_prompt_upsert_and_seed() {
        let s = store();
        assert_eq!(s.get_prompt("summary").unwrap_or_default(), None);
        assert_eq!(s.get_prompt_or("summary", "seed").unwrap_or_default(), "seed");
        assert_eq!(s.get_prompt("summary").unwrap_or_default().as_deref(), Some("seed"));
        s.save_prompt("summary", "custom").unwrap_or_default();
        assert_eq!(s.get_prompt_or("summary", "seed").unwrap_or_default(), "custom");
        assert_eq!(s.prompts().unwrap_or_default().len(), 1);
    }

    #[test]
    fn test_history_newest_first_and_filtered() {
        let s = store();
        let raw = serde_json::json!({"evaluations": 2});
        s.save_report("DEEP_RESEARCH", "Acme", "first", Some(&raw)).unwrap_or_default();
        s.save_report::<serde_json::Value>("MARKET_HR", "Acme", "second", None)
            .unwrap_or_default();
        s.save_report::<serde_json::Value>("DEEP_RESEARCH", "Globex", "third", None)
            .unwrap_or_default();

        let all = s.history(10, None).unwrap_or_default();
        let contents: Vec<&str> = all.iter().map(|r| r.content.as_str()).collect();
        assert_eq!(contents, vec!["third", "second", "first"]);

        let deep = s.history(10, Some("DEEP_RESEARCH")).unwrap_or_default();
        assert_eq!(deep.len(), 2);
        assert_eq!(deep[1].raw_data, Some(raw));

        assert_eq!(s.history(1, None).unwrap_or_default().len(), 1);
    }

    #[test]
    fn test_snapshots_round_trip() {
        let s = store();
        let record = CompetitorRecord {
            entity: "Acme".to_string(),
            kind: EntityKind::Competitor,
            visibility: 300,
            sentiment: Sentiment::Mixed,
            topic: "Pricing".to_string(),
            top_source: "https://acme.example".to_string(),
            results: 4,
            simulated: true,
            notes: Vec::new(),
        };
        s.save_snapshot(Domain::Payroll, &record).unwrap_or_default();
        let snaps = s.snapshots("acme", 5).unwrap_or_default();
        assert_eq!(snaps.len(), 1);
        assert_eq!(snaps[0].domain, "payroll");
        assert_eq!(snaps[0].sentiment, "Mixed");
        assert_eq!(snaps[0].visibility, 300);
        assert!(snaps[0].simulated);
    }

    #[test]
    fn test_open_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap_or_else(|_| unreachable!());
        let path = dir.path().join("nested").join("intel.db");
        let s = SqliteStore::open(&path).unwrap_or_else(|_| unreachable!());
        s.save_prompt("k", "v").unwrap_or_default();
        drop(s);
        let reopened = SqliteStore::open(&path).unwrap_or_else(|_| unreachable!());
        assert_eq!(reopened.get_prompt("k").unwrap_or_default().as_deref(), Some("v"));
    }
}
