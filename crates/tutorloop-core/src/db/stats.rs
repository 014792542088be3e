//! Database statistics

use super::Database;
use crate::error::Result;
use std::collections::BTreeMap;

/// Knowledge base stats
#[derive(Debug, Clone, serde::Serialize)]
pub struct KnowledgeStats {
    pub record_count: usize,
    pub corrected_count: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_source: BTreeMap<String, usize>,
}

impl Database {
    /// Get knowledge base statistics
    pub fn get_stats(&self) -> Result<KnowledgeStats> {
        let record_count = self.count_records()?;

        let corrected_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM knowledge_records WHERE correction IS NOT NULL",
            [],
            |row| row.get(0),
        )?;

        Ok(KnowledgeStats {
            record_count,
            corrected_count: corrected_count as usize,
            by_category: self.count_grouped("category")?,
            by_source: self.count_grouped("source")?,
        })
    }

    fn count_grouped(&self, column: &str) -> Result<BTreeMap<String, usize>> {
        let sql = format!(
            "SELECT {column}, COUNT(*) FROM knowledge_records GROUP BY {column}"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let counts = stmt
            .query_map([], |row| {
                let key: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok((key, count as usize))
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewRecord;
    use crate::knowledge::CorrectionMetadata;

    #[test]
    fn test_stats() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();

        db.insert_record(
            &NewRecord::new("a", "1", "seed_corpus").with_category("geometry"),
            "m",
            &[1.0],
        )
        .unwrap();
        db.insert_record(
            &NewRecord::new("b", "2", "seed_corpus").with_category("calculus"),
            "m",
            &[1.0],
        )
        .unwrap();
        db.insert_record(
            &NewRecord::new("c", "3", "human_feedback_loop")
                .with_category("calculus")
                .with_correction(CorrectionMetadata::new("c", 4, 6, "unclear")),
            "m",
            &[1.0],
        )
        .unwrap();

        let stats = db.get_stats().unwrap();
        assert_eq!(stats.record_count, 3);
        assert_eq!(stats.corrected_count, 1);
        assert_eq!(stats.by_category.get("calculus"), Some(&2));
        assert_eq!(stats.by_source.get("human_feedback_loop"), Some(&1));
    }
}
