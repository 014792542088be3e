//! Integration tests for the on-disk knowledge store
//!
//! Tests:
//! 1. Seeding on first use, once, persisted across reopen
//! 2. Corrected answers found by a repeat of the same question
//! 3. Repeated writes get distinct ids and leave earlier records untouched
//! 4. Concurrent first use, concurrent lookups and concurrent writes
//! 5. Reopening with a different embedder is reported, not silently missed

use std::sync::Arc;
use tutorloop_core::config::KnowledgeConfig;
use tutorloop_core::knowledge::{SEED_CORPUS, SOURCE_CORRECTION};
use tutorloop_core::{
    CorrectionMetadata, HashEmbedder, KnowledgeLookup, KnowledgeSource, KnowledgeStore,
};

fn config_in(dir: &tempfile::TempDir) -> KnowledgeConfig {
    KnowledgeConfig {
        db_path: Some(dir.path().join("kb").join("knowledge.sqlite")),
        ..KnowledgeConfig::default()
    }
}

fn open(config: &KnowledgeConfig) -> KnowledgeStore {
    KnowledgeStore::open(config, Arc::new(HashEmbedder::default())).unwrap()
}

fn metadata(question: &str) -> CorrectionMetadata {
    CorrectionMetadata::new(question, 4, 6, "missing units")
}

#[tokio::test]
async fn test_seed_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);

    {
        let store = open(&config);
        assert_eq!(store.stats().await.unwrap().record_count, SEED_CORPUS.len());
    }

    let store = open(&config);
    assert_eq!(store.seed().await.unwrap(), 0);
    let stats = store.stats().await.unwrap();
    assert_eq!(stats.record_count, SEED_CORPUS.len());
    assert_eq!(stats.by_category.get("jee_advanced"), Some(&2));
    assert_eq!(stats.corrected_count, 0);
}

#[tokio::test]
async fn test_corrected_answer_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&config_in(&dir));
    let question = "Calculate the eigenvalues of a 2x2 rotation matrix";

    let id = store
        .add_corrected_answer(question, "They are e^{iθ} and e^{-iθ}.", metadata(question))
        .await
        .unwrap();

    let lookup = store.search(question, 2, 0.6).await;
    let hit = lookup.hit().expect("corrected answer should be found");
    assert_eq!(hit.record.id, id);
    assert_eq!(hit.record.source, SOURCE_CORRECTION);
    assert_eq!(hit.matched_question, question);

    let stored = store.get(&id).await.unwrap();
    let correction = stored.correction.unwrap();
    assert_eq!(correction.correction_reason, "missing units");
    assert_eq!(correction.source, SOURCE_CORRECTION);
}

#[tokio::test]
async fn test_repeated_writes_are_distinct() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&config_in(&dir));
    let question = "Solve the equation 3x = 12";

    let first = store
        .add_corrected_answer(question, "x = 4", metadata(question))
        .await
        .unwrap();
    let before = store.get(&first).await.unwrap();

    let second = store
        .add_corrected_answer(question, "x = 4", metadata(question))
        .await
        .unwrap();

    assert_ne!(first, second);
    assert_eq!(store.get(&first).await.unwrap(), before);
    assert_eq!(
        store.stats().await.unwrap().record_count,
        SEED_CORPUS.len() + 2
    );
}

#[tokio::test]
async fn test_get_missing_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = open(&config_in(&dir));
    let err = store.get("kb-does-not-exist").await.unwrap_err();
    assert_eq!(err.exit_code(), tutorloop_core::error::exit_codes::NOT_FOUND);
}

#[tokio::test]
async fn test_concurrent_first_use_seeds_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(open(&config_in(&dir)));

    let lookups = (0..8).map(|_| {
        let store = store.clone();
        async move {
            store
                .search("What is the derivative of sin(x)?", 2, 0.6)
                .await
        }
    });
    let results = futures::future::join_all(lookups).await;

    assert!(results.iter().all(|r| r.hit().is_some()));
    assert_eq!(store.stats().await.unwrap().record_count, SEED_CORPUS.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writes_all_land() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(open(&config_in(&dir)));
    store.ensure_seeded().await.unwrap();

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                let question = format!("Solve the equation x + {} = 0", i);
                store
                    .add_corrected_answer(&question, &format!("x = -{}", i), metadata(&question))
                    .await
            })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap());
    }
    ids.sort();
    ids.dedup();

    assert_eq!(ids.len(), 10);
    let stats = store.stats().await.unwrap();
    assert_eq!(stats.corrected_count, 10);
    assert_eq!(stats.by_source.get(SOURCE_CORRECTION), Some(&10));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_lookups_on_worker_threads() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(open(&config_in(&dir)));

    let handles: Vec<_> = [
        "What is the Pythagorean theorem?",
        "What is the derivative of sin(x)?",
        "How to solve a quadratic equation?",
        "What is the formula for the area of a circle?",
    ]
    .into_iter()
    .cycle()
    .take(16)
    .map(|question| {
        let store = store.clone();
        tokio::spawn(async move { (question, store.search(question, 3, 0.6).await) })
    })
    .collect();

    for handle in handles {
        let (question, lookup) = handle.await.unwrap();
        let hit = lookup.hit().expect("seed question should hit");
        assert_eq!(hit.matched_question, question);
    }
}

#[tokio::test]
async fn test_reopen_with_other_embedder_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);

    {
        let store =
            KnowledgeStore::open(&config, Arc::new(HashEmbedder::new(256).unwrap())).unwrap();
        store.ensure_seeded().await.unwrap();
    }

    let store = KnowledgeStore::open(&config, Arc::new(HashEmbedder::new(512).unwrap())).unwrap();
    match store.search("What is the Pythagorean theorem?", 2, 0.6).await {
        KnowledgeLookup::Unavailable(reason) => {
            assert!(reason.contains("embedding model mismatch"), "{}", reason);
            assert!(reason.contains("tutorloop/hash-256"), "{}", reason);
            assert!(reason.contains("tutorloop/hash-512"), "{}", reason);
        }
        other => panic!("expected Unavailable, got {:?}", other),
    }
    assert_eq!(store.stats().await.unwrap().record_count, SEED_CORPUS.len());
    assert!(store.nearest("What is the Pythagorean theorem?", 2).await.is_err());
}
