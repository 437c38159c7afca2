//! Heading importance scores.

use crate::model::Line;
use crate::params::OutlineParams;
use crate::rules::{NUMBER_DOT_PREFIX, STRUCTURAL_WORD, is_uppercase_text, word_count};

/// Size relative to the page maximum (0 when the maximum is not positive).
pub fn font_score(font_size: f64, max_font_size: f64) -> f64 {
    if max_font_size > 0.0 {
        font_size / max_font_size
    } else {
        0.0
    }
}

/// Sum of the textual bonuses.
pub fn text_score(text: &str) -> f64 {
    let mut score = 0.0;
    if is_uppercase_text(text) {
        score += 0.2;
    }
    if text.ends_with(':') {
        score += 0.1;
    }
    if NUMBER_DOT_PREFIX.is_match(text) {
        score += 0.1;
    }
    if word_count(text) <= 5 {
        score += 0.1;
    }
    if STRUCTURAL_WORD.is_match(text) {
        score += 0.2;
    }
    score
}

/// Weighted blend of the font and text scores.
pub fn heading_score(line: &Line, max_font_size: f64, params: &OutlineParams) -> f64 {
    params.font_score_weight * font_score(line.font_size, max_font_size)
        + params.text_score_weight * text_score(&line.text)
}
