//! pdfoutline - heading detection and hierarchical outline extraction for PDFs.
//!
//! The pipeline runs in five stages over positioned page text:
//! line reconstruction, heading classification, scoring, per-page selection
//! and outline assembly (title plus H1/H2/H3 levels).

pub mod api;
pub mod assemble;
pub mod classify;
pub mod embed;
pub mod error;
pub mod lines;
pub mod model;
pub mod params;
pub mod provider;
pub mod rules;
pub mod score;
pub mod select;
pub mod utils;

pub use api::high_level;
pub use api::{
    OutlineOutcome, extract_outline, extract_outline_from_bytes, extract_outline_from_path,
};
pub use embed::{Embedder, HashingEmbedder};
#[cfg(feature = "candle")]
pub use embed::SentenceEmbedder;
pub use error::{OutlineError, Result, Stage};
pub use model::{Heading, HeadingLevel, Line, Outline, PageText, TextFragment};
pub use params::OutlineParams;
pub use provider::{LopdfProvider, MemoryProvider, PageTextProvider};
