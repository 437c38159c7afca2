//! Data model shared by the pipeline stages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A positioned run of text reported by a page-text provider.
///
/// `top` is measured from the top edge of the page, `x0`/`x1` from its left
/// edge, all in PDF points.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub text: String,
    pub top: f64,
    pub x0: f64,
    pub x1: f64,
    pub size: f64,
}

impl TextFragment {
    pub fn new(text: impl Into<String>, top: f64, x0: f64, x1: f64, size: f64) -> Self {
        Self {
            text: text.into(),
            top,
            x0,
            x1,
            size,
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Width of the fragment divided by its character count.
    pub fn avg_char_width(&self) -> f64 {
        self.width() / self.text.chars().count().max(1) as f64
    }
}

/// All fragments of one page plus the page height.
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    /// 1-based page number.
    pub number: u32,
    pub height: f64,
    pub fragments: Vec<TextFragment>,
}

impl PageText {
    pub fn new(number: u32, height: f64, fragments: Vec<TextFragment>) -> Self {
        Self {
            number,
            height,
            fragments,
        }
    }
}

/// One logical row of text on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// Whitespace-normalised text, at least three characters long.
    pub text: String,
    /// Mean size of the fragments the line was built from.
    pub font_size: f64,
    pub page: u32,
    /// Rounded vertical position shared by the line's fragments.
    pub top: f64,
}

/// Font statistics of a single page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFontStats {
    pub avg_font_size: f64,
    pub max_font_size: f64,
}

impl PageFontStats {
    /// Computes mean and maximum font size over `lines`.
    ///
    /// An empty page reports an average of 0 and a maximum of 1.
    pub fn from_lines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a Line>,
    {
        let mut count = 0usize;
        let mut total = 0.0;
        let mut max = f64::NEG_INFINITY;
        for line in lines {
            count += 1;
            total += line.font_size;
            max = max.max(line.font_size);
        }
        if count == 0 {
            return Self {
                avg_font_size: 0.0,
                max_font_size: 1.0,
            };
        }
        Self {
            avg_font_size: total / count as f64,
            max_font_size: max,
        }
    }
}

/// A classifier-accepted line with its importance score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub line: Line,
    pub score: f64,
}

/// Nesting level of a heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeadingLevel::H1 => f.write_str("H1"),
            HeadingLevel::H2 => f.write_str("H2"),
            HeadingLevel::H3 => f.write_str("H3"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub level: HeadingLevel,
    pub text: String,
    pub page: u32,
}

/// Document title plus leveled headings in selection order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outline {
    pub title: String,
    pub headings: Vec<Heading>,
}

impl Outline {
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.headings.is_empty()
    }
}
