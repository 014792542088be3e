//! Knowledge record storage
//!
//! Records are append-only: there is an insert path and read paths, nothing else.

use super::vectors::embedding_to_bytes;
use super::Database;
use crate::error::{Result, TutorLoopError};
use crate::knowledge::CorrectionMetadata;
use chrono::Utc;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

/// A record about to be written
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub question: String,
    pub answer: String,
    pub category: String,
    pub difficulty: String,
    pub tags: Vec<String>,
    pub source: String,
    pub correction: Option<CorrectionMetadata>,
}

impl NewRecord {
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            category: "general".to_string(),
            difficulty: "medium".to_string(),
            tags: Vec::new(),
            source: source.into(),
            correction: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_difficulty(mut self, difficulty: impl Into<String>) -> Self {
        self.difficulty = difficulty.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_correction(mut self, correction: CorrectionMetadata) -> Self {
        self.correction = Some(correction);
        self
    }
}

/// A stored knowledge record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordInfo {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub category: String,
    pub difficulty: String,
    pub tags: Vec<String>,
    pub source: String,
    pub correction: Option<CorrectionMetadata>,
    pub created_at: String,
}

const RECORD_COLUMNS: &str =
    "id, question, answer, category, difficulty, tags, source, correction, created_at";

impl Database {
    /// Insert a record together with its embedding. Returns the new record id.
    pub fn insert_record(&self, record: &NewRecord, model: &str, embedding: &[f32]) -> Result<String> {
        self.conn.execute("BEGIN IMMEDIATE", [])?;
        let result = self.insert_record_row(record, model, embedding);

        if result.is_ok() {
            self.conn.execute("COMMIT", [])?;
        } else {
            let _ = self.conn.execute("ROLLBACK", []);
        }
        result
    }

    /// Insert many records atomically (used for seeding). Returns the new ids in order.
    pub fn insert_records(
        &self,
        records: &[(NewRecord, Vec<f32>)],
        model: &str,
    ) -> Result<Vec<String>> {
        self.conn.execute("BEGIN IMMEDIATE", [])?;
        let result = records
            .iter()
            .map(|(record, embedding)| self.insert_record_row(record, model, embedding))
            .collect::<Result<Vec<_>>>();

        if result.is_ok() {
            self.conn.execute("COMMIT", [])?;
        } else {
            let _ = self.conn.execute("ROLLBACK", []);
        }
        result
    }

    fn insert_record_row(&self, record: &NewRecord, model: &str, embedding: &[f32]) -> Result<String> {
        let id = generate_record_id();
        let now = Utc::now().to_rfc3339();
        let tags = serde_json::to_string(&record.tags)?;
        let correction = record
            .correction
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            "INSERT INTO knowledge_records (id, question, answer, category, difficulty, tags, source, correction, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id,
                record.question,
                record.answer,
                record.category,
                record.difficulty,
                tags,
                record.source,
                correction,
                now
            ],
        )?;
        self.conn.execute(
            "INSERT INTO record_embeddings (record_id, model, embedding) VALUES (?1, ?2, ?3)",
            params![id, model, embedding_to_bytes(embedding)],
        )?;

        Ok(id)
    }

    /// Number of stored records
    pub fn count_records(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM knowledge_records", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get a single record by id
    pub fn get_record(&self, id: &str) -> Result<Option<RecordInfo>> {
        let sql = format!("SELECT {} FROM knowledge_records WHERE id = ?1", RECORD_COLUMNS);
        let raw = self
            .conn
            .query_row(&sql, params![id], RawRecord::from_row)
            .optional()?;
        raw.map(RawRecord::decode).transpose()
    }

    /// Get a record by id, failing if absent
    pub fn require_record(&self, id: &str) -> Result<RecordInfo> {
        self.get_record(id)?
            .ok_or_else(|| TutorLoopError::RecordNotFound(id.to_string()))
    }

    /// List records, newest first
    pub fn list_records(&self, limit: usize, offset: usize) -> Result<Vec<RecordInfo>> {
        let sql = format!(
            "SELECT {} FROM knowledge_records ORDER BY rowid DESC LIMIT ?1 OFFSET ?2",
            RECORD_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![limit as i64, offset as i64], RawRecord::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(RawRecord::decode).collect()
    }
}

/// Row as stored, before JSON columns are decoded
struct RawRecord {
    id: String,
    question: String,
    answer: String,
    category: String,
    difficulty: String,
    tags: String,
    source: String,
    correction: Option<String>,
    created_at: String,
}

impl RawRecord {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            question: row.get(1)?,
            answer: row.get(2)?,
            category: row.get(3)?,
            difficulty: row.get(4)?,
            tags: row.get(5)?,
            source: row.get(6)?,
            correction: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    fn decode(self) -> Result<RecordInfo> {
        let tags = serde_json::from_str(&self.tags)?;
        let correction = self
            .correction
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(RecordInfo {
            id: self.id,
            question: self.question,
            answer: self.answer,
            category: self.category,
            difficulty: self.difficulty,
            tags,
            source: self.source,
            correction,
            created_at: self.created_at,
        })
    }
}

/// Random (v4) ids keep concurrent writers from coordinating
fn generate_record_id() -> String {
    format!("kb-{}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db
    }

    #[test]
    fn test_insert_and_get_record() {
        let db = db();
        let record = NewRecord::new("What is 2+2?", "4", "seed_corpus")
            .with_category("arithmetic")
            .with_difficulty("easy")
            .with_tags(["addition", "integers"]);

        let id = db.insert_record(&record, "test-model", &[1.0, 0.0]).unwrap();
        let stored = db.get_record(&id).unwrap().unwrap();

        assert_eq!(stored.question, "What is 2+2?");
        assert_eq!(stored.category, "arithmetic");
        assert_eq!(stored.difficulty, "easy");
        assert_eq!(stored.tags, vec!["addition", "integers"]);
        assert!(stored.correction.is_none());
        assert_eq!(db.count_records().unwrap(), 1);
    }

    #[test]
    fn test_identical_inserts_get_distinct_ids() {
        let db = db();
        let record = NewRecord::new("same", "answer", "human_feedback_loop");

        let first = db.insert_record(&record, "m", &[1.0]).unwrap();
        let second = db.insert_record(&record, "m", &[1.0]).unwrap();

        assert_ne!(first, second);
        assert_eq!(db.count_records().unwrap(), 2);
        assert_eq!(db.get_record(&first).unwrap().unwrap().answer, "answer");
    }

    #[test]
    fn test_correction_metadata_roundtrip() {
        let db = db();
        let correction = CorrectionMetadata::new("q?", 5, 9, "too terse");
        let record = NewRecord::new("q?", "better", "human_feedback_loop").with_correction(correction.clone());

        let id = db.insert_record(&record, "m", &[0.5, 0.5]).unwrap();
        let stored = db.require_record(&id).unwrap();
        assert_eq!(stored.correction, Some(correction));
    }

    #[test]
    fn test_insert_records_batch() {
        let db = db();
        let batch = vec![
            (NewRecord::new("a", "1", "seed_corpus"), vec![1.0, 0.0]),
            (NewRecord::new("b", "2", "seed_corpus"), vec![0.0, 1.0]),
        ];
        let ids = db.insert_records(&batch, "m").unwrap();
        assert_eq!(ids.len(), 2);

        let listed = db.list_records(10, 0).unwrap();
        assert_eq!(listed[0].question, "b");
        assert_eq!(listed[1].question, "a");
    }

    #[test]
    fn test_require_missing_record() {
        let db = db();
        let err = db.require_record("kb-missing").unwrap_err();
        assert!(matches!(err, TutorLoopError::RecordNotFound(_)));
    }
}
