//! Vector storage operations
//!
//! Stores embeddings as BLOBs and computes cosine similarity in Rust.

use super::{Database, RecordInfo};
use crate::error::Result;
use rusqlite::params;

/// A record ranked against a query embedding
#[derive(Debug, Clone)]
pub struct RankedRecord {
    pub record: RecordInfo,
    pub similarity: f32,
}

impl RankedRecord {
    /// Cosine distance (1 - similarity)
    pub fn distance(&self) -> f64 {
        1.0 - self.similarity as f64
    }
}

impl Database {
    /// Stored embeddings produced by `model`, as (rowid, record_id, embedding)
    pub fn get_embeddings_for_model(&self, model: &str) -> Result<Vec<(i64, String, Vec<f32>)>> {
        let mut stmt = self.conn.prepare(
            "SELECT r.rowid, e.record_id, e.embedding
             FROM record_embeddings e
             JOIN knowledge_records r ON r.id = e.record_id
             WHERE e.model = ?1",
        )?;

        let results = stmt
            .query_map(params![model], |row| {
                let rowid: i64 = row.get(0)?;
                let record_id: String = row.get(1)?;
                let embedding_bytes: Vec<u8> = row.get(2)?;
                Ok((rowid, record_id, bytes_to_embedding(&embedding_bytes)))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(results)
    }

    /// Rank records embedded with `model` by cosine similarity to
    /// `query_embedding`. Vectors from other models are never compared.
    ///
    /// Equal similarities rank the most recently inserted record first, so a
    /// correction outranks the record it corrects.
    pub fn nearest_records(
        &self,
        query_embedding: &[f32],
        model: &str,
        limit: usize,
    ) -> Result<Vec<RankedRecord>> {
        let mut similarities: Vec<(i64, String, f32)> = self
            .get_embeddings_for_model(model)?
            .into_iter()
            .map(|(rowid, id, embedding)| {
                let sim = cosine_similarity(query_embedding, &embedding);
                (rowid, id, sim)
            })
            .collect();

        similarities.sort_by(|a, b| {
            b.2.partial_cmp(&a.2)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.0.cmp(&a.0))
        });

        let mut ranked = Vec::with_capacity(limit.min(similarities.len()));
        for (_, id, similarity) in similarities.into_iter().take(limit) {
            if let Some(record) = self.get_record(&id)? {
                ranked.push(RankedRecord { record, similarity });
            }
        }

        Ok(ranked)
    }

    /// Embedding models present in the store, with record counts
    pub fn embedding_models(&self) -> Result<Vec<(String, usize)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT model, COUNT(*) FROM record_embeddings GROUP BY model ORDER BY model")?;
        let rows = stmt
            .query_map(params![], |row| {
                let model: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok((model, count as usize))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

/// Convert f32 embedding to bytes (little-endian)
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert bytes to f32 embedding
pub fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Compute cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
