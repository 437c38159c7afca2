//! Heading classification.
//!
//! A two-tier test: visually prominent text qualifies on font size alone,
//! visually modest text needs several corroborating textual indicators.
//! Cheap structural rejections run first and short-circuit.

use crate::model::PageFontStats;
use crate::params::OutlineParams;
use crate::rules::{SKIP_RULES, alpha_ratio, count_indicators, word_count};

/// Why a line was not accepted as a heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Too short or too long.
    Length,
    /// Matched the named skip rule.
    SkipRule(&'static str),
    /// Too few alphabetic characters.
    AlphaRatio,
    /// Too many words.
    WordCount,
    /// Normal-sized font and fewer indicators than required.
    WeakSignals { indicators: usize },
}

/// Outcome of classifying one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Accepted on font size.
    LargeFont,
    /// Accepted on textual indicators.
    Indicators(usize),
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_heading(&self) -> bool {
        !matches!(self, Verdict::Rejected(_))
    }
}

/// Size relative to the page maximum, 0.5 when the maximum is not positive.
pub fn font_ratio(font_size: f64, max_font_size: f64) -> f64 {
    if max_font_size > 0.0 {
        font_size / max_font_size
    } else {
        0.5
    }
}

/// True if the font is prominent compared with the rest of the page.
pub fn is_large_font(font_size: f64, stats: &PageFontStats, params: &OutlineParams) -> bool {
    font_size > stats.avg_font_size * params.large_font_multiplier
        || font_ratio(font_size, stats.max_font_size) > params.large_font_ratio
}

/// Classifies a line given its page's font statistics.
pub fn classify(
    text: &str,
    font_size: f64,
    stats: &PageFontStats,
    params: &OutlineParams,
) -> Verdict {
    let len = text.chars().count();
    if len < params.min_line_chars || len > params.max_heading_chars {
        return Verdict::Rejected(Rejection::Length);
    }

    if let Some(rule) = SKIP_RULES.first_match(text) {
        return Verdict::Rejected(Rejection::SkipRule(rule));
    }

    if alpha_ratio(text) < params.min_alpha_ratio {
        return Verdict::Rejected(Rejection::AlphaRatio);
    }

    if word_count(text) > params.max_heading_words {
        return Verdict::Rejected(Rejection::WordCount);
    }

    if is_large_font(font_size, stats, params) {
        return Verdict::LargeFont;
    }

    let indicators = count_indicators(text);
    if indicators >= params.min_indicators {
        Verdict::Indicators(indicators)
    } else {
        Verdict::Rejected(Rejection::WeakSignals { indicators })
    }
}

/// Shorthand for `classify(..).is_heading()`.
pub fn is_heading(
    text: &str,
    font_size: f64,
    stats: &PageFontStats,
    params: &OutlineParams,
) -> bool {
    classify(text, font_size, stats, params).is_heading()
}
