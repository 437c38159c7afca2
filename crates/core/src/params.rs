//! Outline extraction parameters.
//!
//! Contains OutlineParams, the single home for every weight, threshold and cap
//! used by the pipeline stages.

use serde::{Deserialize, Serialize};

use crate::error::{OutlineError, Result};

/// Parameters for outline extraction.
///
/// Defaults reproduce the reference heading heuristics. Every field can be
/// overridden from a (partial) JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineParams {
    /// Fraction of the page height dropped at the top and at the bottom
    /// before lines are built (running headers and footers).
    pub header_footer_margin: f64,

    /// If the horizontal gap between two fragments on a line exceeds this
    /// multiple of the preceding fragment's average character width, a space
    /// is inserted between them.
    pub word_gap_ratio: f64,

    /// Lines shorter than this many characters are discarded, and no
    /// shorter text is accepted as a heading.
    pub min_line_chars: usize,

    /// Longest text (in characters) that may still be a heading.
    pub max_heading_chars: usize,

    /// Most words a heading may have.
    pub max_heading_words: usize,

    /// Minimum fraction of alphabetic characters in a heading.
    pub min_alpha_ratio: f64,

    /// A line is large-font when its size exceeds the page average times this.
    pub large_font_multiplier: f64,

    /// A line is large-font when its size over the page maximum exceeds this.
    pub large_font_ratio: f64,

    /// Number of textual indicators required when the font is not large.
    pub min_indicators: usize,

    /// Weight of the font ratio in the heading score.
    pub font_score_weight: f64,

    /// Weight of the textual bonus in the heading score.
    pub text_score_weight: f64,

    /// Most headings kept per page.
    pub max_headings_per_page: usize,

    /// Number of leading page-1 headings considered for the title.
    pub title_candidates: usize,

    /// Combined-score thresholds for levels: (H1, H2).
    pub sim_thr: (f64, f64),

    /// Weight of embedding similarity in the combined score.
    pub similarity_weight: f64,

    /// Weight of the document-wide size ratio in the combined score.
    pub size_weight: f64,

    /// Size ratio an H1 must exceed.
    pub h1_size_ratio: f64,

    /// Size ratio an H2 must exceed.
    pub h2_size_ratio: f64,

    /// Number of recent heading embeddings compared against.
    pub context_window: usize,
}

impl Default for OutlineParams {
    fn default() -> Self {
        Self {
            header_footer_margin: 0.12,
            word_gap_ratio: 0.4,
            min_line_chars: 3,
            max_heading_chars: 150,
            max_heading_words: 10,
            min_alpha_ratio: 0.6,
            large_font_multiplier: 1.2,
            large_font_ratio: 0.75,
            min_indicators: 2,
            font_score_weight: 0.6,
            text_score_weight: 0.4,
            max_headings_per_page: 4,
            title_candidates: 4,
            sim_thr: (0.75, 0.60),
            similarity_weight: 0.6,
            size_weight: 0.4,
            h1_size_ratio: 0.8,
            h2_size_ratio: 0.65,
            context_window: 3,
        }
    }
}

impl OutlineParams {
    /// Returns a copy with a different header/footer margin.
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.header_footer_margin = margin;
        self
    }

    /// Returns a copy with different level thresholds.
    pub fn with_sim_thr(mut self, high: f64, low: f64) -> Self {
        self.sim_thr = (high, low);
        self
    }

    /// Returns a copy with a different per-page heading cap.
    pub fn with_max_headings_per_page(mut self, cap: usize) -> Self {
        self.max_headings_per_page = cap;
        self
    }

    /// Checks that the parameters describe a runnable configuration.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..0.5).contains(&self.header_footer_margin) {
            return Err(OutlineError::InvalidParams(format!(
                "header_footer_margin must be in [0, 0.5), got {}",
                self.header_footer_margin
            )));
        }
        if self.word_gap_ratio < 0.0 {
            return Err(OutlineError::InvalidParams(format!(
                "word_gap_ratio must not be negative, got {}",
                self.word_gap_ratio
            )));
        }
        let (high, low) = self.sim_thr;
        for (name, value) in [("sim_thr.high", high), ("sim_thr.low", low)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(OutlineError::InvalidParams(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        if self.max_headings_per_page == 0 {
            return Err(OutlineError::InvalidParams(
                "max_headings_per_page must be at least 1".to_string(),
            ));
        }
        if self.context_window == 0 {
            return Err(OutlineError::InvalidParams(
                "context_window must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
