//! High-level API for outline extraction.
//!
//! # Example
//!
//! ```ignore
//! use pdfoutline_core::api::{OutlineOutcome, extract_outline_from_path};
//! use pdfoutline_core::{HashingEmbedder, OutlineParams};
//!
//! let mut embedder = HashingEmbedder::default();
//! let outcome = extract_outline_from_path("report.pdf", &mut embedder, &OutlineParams::default())?;
//! if let OutlineOutcome::Built(outline) = outcome {
//!     println!("{}", outline.title);
//! }
//! ```

pub mod high_level;

pub use high_level::{
    OutlineOutcome, extract_outline, extract_outline_from_bytes, extract_outline_from_path,
};
