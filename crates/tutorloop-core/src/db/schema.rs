//! Database schema and initialization

use crate::error::{Result, TutorLoopError};
use rusqlite::{params, Connection};
use std::path::Path;

/// Main database handle
pub struct Database {
    pub(crate) conn: Connection,
}

const SCHEMA_VERSION: i32 = 1;

const CREATE_TABLES: &str = r#"
-- Question/answer records (append-only)
CREATE TABLE IF NOT EXISTS knowledge_records (
    id TEXT PRIMARY KEY,
    question TEXT NOT NULL,
    answer TEXT NOT NULL,
    category TEXT NOT NULL DEFAULT 'general',
    difficulty TEXT NOT NULL DEFAULT 'medium',
    tags TEXT NOT NULL DEFAULT '[]',
    source TEXT NOT NULL,
    correction TEXT,
    created_at TEXT NOT NULL
);

-- One embedding per record, keyed by the embedding model that produced it
CREATE TABLE IF NOT EXISTS record_embeddings (
    record_id TEXT PRIMARY KEY REFERENCES knowledge_records(id),
    model TEXT NOT NULL,
    embedding BLOB NOT NULL
);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_records_source ON knowledge_records(source);
CREATE INDEX IF NOT EXISTS idx_records_category ON knowledge_records(category);
"#;

/// Add-only invariant enforced by the database itself
const CREATE_TRIGGERS: &str = r#"
CREATE TRIGGER IF NOT EXISTS knowledge_records_no_update
BEFORE UPDATE ON knowledge_records
BEGIN
    SELECT RAISE(ABORT, 'knowledge records are append-only');
END;

CREATE TRIGGER IF NOT EXISTS knowledge_records_no_delete
BEFORE DELETE ON knowledge_records
BEGIN
    SELECT RAISE(ABORT, 'knowledge records are append-only');
END;
"#;

impl Database {
    /// Open database at path, creating if necessary
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Open in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Initialize database schema
    pub fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        self.conn.execute_batch(CREATE_TABLES)?;

        if let Some(version) = self.schema_version()? {
            if version > SCHEMA_VERSION {
                return Err(TutorLoopError::Config(format!(
                    "knowledge base schema v{} is newer than supported v{}",
                    version, SCHEMA_VERSION
                )));
            }
        }

        self.conn.execute_batch(CREATE_TRIGGERS)?;

        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> Result<Option<i32>> {
        let version = self
            .conn
            .query_row(
                "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .ok();
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        assert_eq!(db.schema_version().unwrap(), Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db.initialize().unwrap();
        assert_eq!(db.schema_version().unwrap(), Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db.conn
            .execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION + 1],
            )
            .unwrap();

        let err = db.initialize().unwrap_err();
        assert!(matches!(err, TutorLoopError::Config(_)));
    }

    #[test]
    fn test_records_are_append_only() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db.conn
            .execute(
                "INSERT INTO knowledge_records (id, question, answer, source, created_at)
                 VALUES ('r1', 'q', 'a', 'seed_corpus', '2024-01-01T00:00:00Z')",
                [],
            )
            .unwrap();

        assert!(db
            .conn
            .execute("UPDATE knowledge_records SET answer = 'b' WHERE id = 'r1'", [])
            .is_err());
        assert!(db
            .conn
            .execute("DELETE FROM knowledge_records WHERE id = 'r1'", [])
            .is_err());
    }
}
