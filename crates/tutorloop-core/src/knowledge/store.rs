//! SQLite-backed knowledge store

use super::{
    seed_records, CorrectionMetadata, KnowledgeHit, KnowledgeLookup, KnowledgeSource,
    SOURCE_CORRECTION,
};
use crate::config::KnowledgeConfig;
use crate::db::{Database, KnowledgeStats, NewRecord, RankedRecord, RecordInfo};
use crate::error::{Result, TutorLoopError};
use crate::llm::Embedder;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

/// Knowledge base shared by concurrent queries.
///
/// The database lock is only taken around synchronous SQLite calls, never
/// across an embedding request. Nearest-neighbour scans run on the blocking
/// pool.
pub struct KnowledgeStore {
    db: Arc<Mutex<Database>>,
    embedder: Arc<dyn Embedder>,
    seed_on_first_use: bool,
    seeded: OnceCell<()>,
}

impl KnowledgeStore {
    /// Wrap an opened database, creating the schema if needed
    pub fn new(db: Database, embedder: Arc<dyn Embedder>) -> Result<Self> {
        db.initialize()?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            embedder,
            seed_on_first_use: true,
            seeded: OnceCell::new(),
        })
    }

    /// Open the store described by configuration
    pub fn open(config: &KnowledgeConfig, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let path = config.resolved_db_path();
        tracing::debug!("Opening knowledge base at {}", path.display());
        let db = Database::open(&path)?;
        Ok(Self::new(db, embedder)?.with_seeding(config.seed))
    }

    /// In-memory store, mostly for tests
    pub fn open_in_memory(embedder: Arc<dyn Embedder>) -> Result<Self> {
        Self::new(Database::open_in_memory()?, embedder)
    }

    /// Whether an empty store loads the seed corpus on first use
    pub fn with_seeding(mut self, enabled: bool) -> Self {
        self.seed_on_first_use = enabled;
        self
    }

    /// Load the seed corpus if the store is empty. Returns the number of
    /// records written (0 when the store already had records).
    pub async fn seed(&self) -> Result<usize> {
        if self.db.lock().await.count_records()? > 0 {
            return Ok(0);
        }

        let records = seed_records();
        let questions: Vec<String> = records.iter().map(|r| r.question.clone()).collect();
        let embeddings = self.embedder.embed_batch(&questions).await?;
        if embeddings.len() != records.len() {
            return Err(TutorLoopError::Llm(format!(
                "expected {} seed embeddings, got {}",
                records.len(),
                embeddings.len()
            )));
        }

        let db = self.db.lock().await;
        // Another writer may have filled the store while we were embedding
        if db.count_records()? > 0 {
            return Ok(0);
        }
        let batch: Vec<(NewRecord, Vec<f32>)> = records.into_iter().zip(embeddings).collect();
        let ids = db.insert_records(&batch, self.embedder.model_name())?;

        tracing::info!("Seeded knowledge base with {} records", ids.len());
        Ok(ids.len())
    }

    /// Seed at most once per store; a failed attempt is retried on the next call
    pub async fn ensure_seeded(&self) -> Result<()> {
        if !self.seed_on_first_use {
            return Ok(());
        }
        self.seeded
            .get_or_try_init(|| async {
                self.seed().await?;
                Ok::<(), TutorLoopError>(())
            })
            .await?;
        Ok(())
    }

    /// Records closest to `query`, best first
    pub async fn nearest(&self, query: &str, limit: usize) -> Result<Vec<RankedRecord>> {
        self.ensure_seeded().await?;
        let embedding = self.embedder.embed(query).await?;
        let model = self.embedder.model_name().to_string();
        let db = self.db.clone().lock_owned().await;

        tokio::task::spawn_blocking(move || {
            let ranked = db.nearest_records(&embedding, &model, limit)?;
            if ranked.is_empty() && limit > 0 && db.count_records()? > 0 {
                let stored = db
                    .embedding_models()?
                    .into_iter()
                    .map(|(name, _)| name)
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(TutorLoopError::EmbeddingModelMismatch {
                    stored,
                    active: model,
                });
            }
            Ok(ranked)
        })
        .await
        .map_err(|e| TutorLoopError::Other(e.into()))?
    }

    /// Append a record, embedding its question
    pub async fn add_record(&self, record: NewRecord) -> Result<String> {
        // Seed first so the corpus is not skipped by a store that is no longer empty
        if let Err(e) = self.ensure_seeded().await {
            tracing::warn!("Seeding before write failed: {}", e);
        }
        let embedding = self.embedder.embed(&record.question).await?;
        let db = self.db.lock().await;
        db.insert_record(&record, self.embedder.model_name(), &embedding)
    }

    pub async fn stats(&self) -> Result<KnowledgeStats> {
        self.ensure_seeded().await?;
        self.db.lock().await.get_stats()
    }

    pub async fn list(&self, limit: usize, offset: usize) -> Result<Vec<RecordInfo>> {
        self.ensure_seeded().await?;
        self.db.lock().await.list_records(limit, offset)
    }

    pub async fn get(&self, id: &str) -> Result<RecordInfo> {
        self.db.lock().await.require_record(id)
    }

    /// Embedding models present in the store
    pub async fn embedding_models(&self) -> Result<Vec<(String, usize)>> {
        self.db.lock().await.embedding_models()
    }
}

#[async_trait]
impl KnowledgeSource for KnowledgeStore {
    async fn search(&self, query: &str, max_results: usize, threshold: f64) -> KnowledgeLookup {
        if max_results == 0 {
            return KnowledgeLookup::Miss;
        }

        let ranked = match self.nearest(query, max_results).await {
            Ok(ranked) => ranked,
            Err(e) => return KnowledgeLookup::Unavailable(e.to_string()),
        };

        match ranked.into_iter().next() {
            Some(best) if best.distance() < threshold => {
                tracing::debug!(
                    "Knowledge hit {} (distance {:.3})",
                    best.record.id,
                    best.distance()
                );
                KnowledgeLookup::Hit(Box::new(KnowledgeHit {
                    matched_question: best.record.question.clone(),
                    similarity_score: best.similarity,
                    record: best.record,
                }))
            }
            Some(best) => {
                tracing::debug!(
                    "Closest record {} too far (distance {:.3} >= {})",
                    best.record.id,
                    best.distance(),
                    threshold
                );
                KnowledgeLookup::Miss
            }
            None => KnowledgeLookup::Miss,
        }
    }

    async fn add_corrected_answer(
        &self,
        question: &str,
        answer: &str,
        metadata: CorrectionMetadata,
    ) -> Result<String> {
        let record = NewRecord::new(question, answer, SOURCE_CORRECTION)
            .with_tags(["corrected"])
            .with_correction(metadata);

        let id = self
            .add_record(record)
            .await
            .map_err(|e| TutorLoopError::KnowledgeWrite(e.to_string()))?;
        tracing::info!("Stored corrected answer {} for: {}", id, question);
        Ok(id)
    }
}
