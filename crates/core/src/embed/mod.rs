//! Text embedding abstraction used for level assignment.
//!
//! The assembler only needs two capabilities: turn a heading into a vector,
//! and compare two vectors. Backends implement [`Embedder`]; the crate ships
//! [`HashingEmbedder`], a deterministic offline backend, and with the
//! `candle` feature [`SentenceEmbedder`], which runs a local BERT model.

mod hashing;
#[cfg(feature = "candle")]
mod sentence;

pub use hashing::HashingEmbedder;
#[cfg(feature = "candle")]
pub use sentence::SentenceEmbedder;

use crate::error::Result;

/// Trait for embedding backends.
pub trait Embedder {
    /// Embeds one text into a fixed-dimension vector.
    fn embed(&mut self, text: &str) -> Result<Vec<f32>>;

    /// Similarity of two embeddings; cosine similarity by default.
    fn similarity(&self, a: &[f32], b: &[f32]) -> f64 {
        cosine_similarity(a, b)
    }
}

/// Cosine similarity of two vectors.
///
/// Returns 0 when either vector has zero length. Vectors of different
/// dimension are compared over their common prefix.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
