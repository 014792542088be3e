//! Deterministic token-hashing embedder
//!
//! Hashes word features into a fixed number of buckets and L2 normalizes the
//! counts. Features are the content words of the text (stopwords, single
//! characters and bare numbers dropped) plus every adjacent pair of
//! non-stopword tokens, so "x^3" and "sin(x)" no longer look alike just
//! because both mention x. Identical text always maps to the same vector,
//! so an exact repeat of a stored question has cosine distance 0. Needs no
//! network and no model download.

use super::Embedder;
use crate::error::{Result, TutorLoopError};
use async_trait::async_trait;

/// Default number of hash buckets
pub const DEFAULT_HASH_DIMENSIONS: usize = 256;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "can", "do", "does", "for", "how", "i", "if", "in", "is", "it", "of",
    "on", "the", "then", "to", "what", "with",
];

pub struct HashEmbedder {
    model: String,
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(TutorLoopError::Config(
                "hash embedder dimensions must be greater than zero".to_string(),
            ));
        }
        let dimensions = dimensions.clamp(8, 4096);
        Ok(Self {
            model: format!("tutorloop/hash-{}", dimensions),
            dimensions,
        })
    }

    fn tokens(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
            .collect()
    }

    fn is_content_word(token: &str) -> bool {
        token.chars().count() > 1 && !token.chars().all(char::is_numeric)
    }

    /// Unigram and bigram features. Bigrams are joined with a space, which
    /// never occurs inside a token, so the two kinds cannot collide.
    fn features(text: &str) -> Vec<String> {
        let tokens = Self::tokens(text);
        let kept: Vec<&String> = tokens
            .iter()
            .filter(|t| !STOPWORDS.contains(&t.as_str()))
            .collect();

        let mut features: Vec<String> = kept
            .iter()
            .filter(|t| Self::is_content_word(t))
            .map(|t| t.to_string())
            .collect();
        features.extend(kept.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));

        if features.is_empty() {
            // "x" or "what is it": fall back to whatever tokens there are
            let fallback = if kept.is_empty() {
                tokens.iter().collect()
            } else {
                kept
            };
            features = fallback.into_iter().cloned().collect();
        }
        features
    }

    fn bucket(&self, token: &str) -> usize {
        let hash = blake3::hash(token.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&hash.as_bytes()[..8]);
        (u64::from_le_bytes(prefix) % self.dimensions as u64) as usize
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for feature in Self::features(text) {
            let idx = self.bucket(&feature);
            vector[idx] += 1.0;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self {
            model: format!("tutorloop/hash-{}", DEFAULT_HASH_DIMENSIONS),
            dimensions: DEFAULT_HASH_DIMENSIONS,
        }
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(TutorLoopError::InvalidInput(
                "cannot embed empty text".to_string(),
            ));
        }
        Ok(self.embed_text(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::vectors::cosine_similarity;
    use proptest::prelude::*;

    #[tokio::test]
    async fn test_identical_text_has_similarity_one() {
        let embedder = HashEmbedder::default();
        let a = embedder.embed("What is 2 + 2?").await.unwrap();
        let b = embedder.embed("what is 2 + 2").await.unwrap();
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_related_text_is_closer_than_unrelated() {
        let embedder = HashEmbedder::default();
        let q = embedder.embed("What is the derivative of x^2?").await.unwrap();
        let near = embedder.embed("derivative of x^2").await.unwrap();
        let far = embedder.embed("area of a circle").await.unwrap();
        assert!(cosine_similarity(&q, &near) > cosine_similarity(&q, &far));
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let embedder = HashEmbedder::default();
        assert!(embedder.embed("   ").await.is_err());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(HashEmbedder::new(0).is_err());
        assert_eq!(HashEmbedder::new(2).unwrap().dimensions(), 8);
    }

    #[test]
    fn test_features_skip_single_characters_and_numbers() {
        let features = HashEmbedder::features("Solve for x in 2x + 5 = 15");
        assert!(features.contains(&"solve".to_string()));
        assert!(features.contains(&"2x".to_string()));
        assert!(features.contains(&"2x 5".to_string()));
        assert!(!features.contains(&"x".to_string()));
        assert!(!features.contains(&"15".to_string()));
    }

    #[test]
    fn test_features_fall_back_to_short_tokens() {
        assert_eq!(HashEmbedder::features("what is x"), vec!["x".to_string()]);
        assert_eq!(HashEmbedder::features("what is it"), vec!["what", "is", "it"]);
    }

    #[tokio::test]
    async fn test_sharing_only_a_variable_is_not_similar() {
        let embedder = HashEmbedder::default();
        let a = embedder.embed("What is the derivative of x^3?").await.unwrap();
        let b = embedder.embed("What is the derivative of sin(x)?").await.unwrap();
        let similarity = cosine_similarity(&a, &b);
        assert!(similarity > 0.0);
        assert!(similarity < 0.4, "similarity {}", similarity);
    }

    proptest! {
        #[test]
        fn prop_embeddings_are_unit_length(text in "[a-z0-9 ]{1,60}") {
            let embedder = HashEmbedder::default();
            let v = embedder.embed_text(&text);
            let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            prop_assert!(norm == 0.0 || (norm - 1.0).abs() < 1e-4);
            prop_assert_eq!(v.len(), DEFAULT_HASH_DIMENSIONS);
        }
    }
}
