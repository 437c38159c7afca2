//! Feature-hashing embedder.
//!
//! Projects lowercase word unigrams and boundary-padded character trigrams
//! into a fixed number of buckets with a signed hash, then L2-normalises.
//! Headings sharing words or word stems land close together, which is all
//! the level assigner asks of an embedding. Output is a pure function of the
//! input text, so repeated runs produce identical outlines.

use std::hash::Hasher;

use rustc_hash::FxHasher;

use super::Embedder;
use crate::error::{OutlineError, Result};

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Deterministic bag-of-features embedder.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    /// Matches the width of common sentence-embedding models.
    pub const DEFAULT_DIMENSION: usize = 384;

    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(OutlineError::Embedding(
                "embedding dimension must be at least 1".to_string(),
            ));
        }
        Ok(Self { dimension })
    }

    fn add_feature(&self, vector: &mut [f32], kind: u8, feature: &str, weight: f32) {
        let mut hasher = FxHasher::default();
        hasher.write_u8(kind);
        hasher.write(feature.as_bytes());
        let hash = hasher.finish();
        let bucket = (hash % self.dimension as u64) as usize;
        let sign = if hash >> 63 == 1 { -1.0 } else { 1.0 };
        vector[bucket] += sign * weight;
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dimension: Self::DEFAULT_DIMENSION,
        }
    }
}

impl Embedder for HashingEmbedder {
    fn embed(&mut self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];
        let lower = text.to_lowercase();

        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            self.add_feature(&mut vector, b'w', word, WORD_WEIGHT);

            let padded: Vec<char> = std::iter::once(' ')
                .chain(word.chars())
                .chain(std::iter::once(' '))
                .collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                self.add_feature(&mut vector, b't', &trigram, TRIGRAM_WEIGHT);
            }
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        Ok(vector)
    }
}
