//! Line reconstruction from positioned text fragments.
//!
//! Fragments sharing a rounded top coordinate on a page form one line. Inside a
//! line, fragments are ordered left to right and glued back together, inserting
//! a space only where the horizontal gap looks like a word break. Lines in the
//! header/footer bands, very short lines, and lines that look like page
//! furniture are dropped.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use crate::model::{Line, PageText, TextFragment};
use crate::params::OutlineParams;
use crate::rules::HEADER_FOOTER_RULES;

/// Collapses whitespace runs to single spaces and trims both ends.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Joins fragments that are already sorted left to right.
///
/// A space goes between two fragments when the gap between them exceeds
/// `word_gap_ratio` times the average character width of the left fragment.
pub fn join_fragments(fragments: &[&TextFragment], word_gap_ratio: f64) -> String {
    let mut text = String::new();
    let mut prev: Option<&TextFragment> = None;
    for &fragment in fragments {
        if let Some(prev) = prev {
            let gap = fragment.x0 - prev.x1;
            if gap > prev.avg_char_width() * word_gap_ratio {
                text.push(' ');
            }
        }
        text.push_str(&fragment.text);
        prev = Some(fragment);
    }
    text
}

/// Builds the lines of one page.
pub fn page_lines(page: &PageText, params: &OutlineParams) -> Vec<Line> {
    let header_cut = page.height * params.header_footer_margin;
    let footer_cut = page.height * (1.0 - params.header_footer_margin);

    let mut rows: BTreeMap<i64, Vec<&TextFragment>> = BTreeMap::new();
    for fragment in &page.fragments {
        if fragment.top < header_cut || fragment.top > footer_cut {
            continue;
        }
        rows.entry(fragment.top.round() as i64)
            .or_default()
            .push(fragment);
    }

    let mut lines = Vec::with_capacity(rows.len());
    for (top, mut row) in rows {
        row.sort_by(|a, b| a.x0.total_cmp(&b.x0));
        let text = normalize_whitespace(&join_fragments(&row, params.word_gap_ratio));
        if text.chars().count() < params.min_line_chars {
            continue;
        }
        if let Some(rule) = HEADER_FOOTER_RULES.first_match(&text) {
            trace!(page = page.number, rule, text = %text, "dropped page furniture");
            continue;
        }
        let font_size = row.iter().map(|f| f.size).sum::<f64>() / row.len() as f64;
        lines.push(Line {
            text,
            font_size,
            page: page.number,
            top: top as f64,
        });
    }
    lines
}

/// Builds the lines of a whole document.
///
/// Pages are visited in ascending page number and lines within a page in
/// ascending vertical position, so the result does not depend on the order
/// the provider reported pages or fragments in.
pub fn reconstruct_lines(pages: &[PageText], params: &OutlineParams) -> Vec<Line> {
    let mut ordered: Vec<&PageText> = pages.iter().collect();
    ordered.sort_by_key(|page| page.number);

    let mut lines = Vec::new();
    for page in ordered {
        let page_lines = page_lines(page, params);
        debug!(
            page = page.number,
            fragments = page.fragments.len(),
            lines = page_lines.len(),
            "reconstructed lines"
        );
        lines.extend(page_lines);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frag(text: &str, top: f64, x0: f64, x1: f64, size: f64) -> TextFragment {
        TextFragment::new(text, top, x0, x1, size)
    }

    fn page(number: u32, fragments: Vec<TextFragment>) -> PageText {
        PageText::new(number, 800.0, fragments)
    }

    #[test]
    fn joins_split_word_without_space() {
        // gap 2 <= 0.4 * (30 / 5)
        let lines = page_lines(
            &page(
                1,
                vec![
                    frag("Intro", 200.0, 10.0, 40.0, 12.0),
                    frag("duction", 200.2, 42.0, 80.0, 12.0),
                ],
            ),
            &OutlineParams::default(),
        );
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Introduction");
        assert_eq!(lines[0].top, 200.0);
    }

    #[test]
    fn inserts_space_at_word_gap() {
        let lines = page_lines(
            &page(
                1,
                vec![
                    frag("Market", 300.0, 10.0, 46.0, 12.0),
                    frag("Analysis", 300.0, 50.0, 98.0, 12.0),
                ],
            ),
            &OutlineParams::default(),
        );
        assert_eq!(lines[0].text, "Market Analysis");
    }

    #[test]
    fn sorts_fragments_left_to_right() {
        let lines = page_lines(
            &page(
                1,
                vec![
                    frag("Results", 300.0, 60.0, 102.0, 12.0),
                    frag("Key", 300.0, 10.0, 28.0, 12.0),
                ],
            ),
            &OutlineParams::default(),
        );
        assert_eq!(lines[0].text, "Key Results");
    }

    #[test]
    fn drops_header_and_footer_bands() {
        // bands end at 96 and start at 704
        let lines = page_lines(
            &page(
                1,
                vec![
                    frag("Running header", 40.0, 10.0, 100.0, 9.0),
                    frag("Body heading", 120.0, 10.0, 100.0, 14.0),
                    frag("Last body line", 680.0, 10.0, 100.0, 10.0),
                    frag("Running footer", 760.0, 10.0, 100.0, 9.0),
                ],
            ),
            &OutlineParams::default(),
        );
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["Body heading", "Last body line"]);
    }

    #[test]
    fn drops_short_and_furniture_lines() {
        let lines = page_lines(
            &page(
                1,
                vec![
                    frag("ok", 150.0, 10.0, 20.0, 10.0),
                    frag("17", 200.0, 10.0, 20.0, 10.0),
                    frag("www.example.com", 250.0, 10.0, 90.0, 10.0),
                    frag("Summary of findings", 300.0, 10.0, 120.0, 10.0),
                ],
            ),
            &OutlineParams::default(),
        );
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Summary of findings");
    }

    #[test]
    fn font_size_is_mean_of_fragments() {
        let lines = page_lines(
            &page(
                1,
                vec![
                    frag("Big", 300.0, 10.0, 40.0, 20.0),
                    frag("small", 300.0, 50.0, 80.0, 10.0),
                ],
            ),
            &OutlineParams::default(),
        );
        assert_eq!(lines[0].font_size, 15.0);
    }

    #[test]
    fn normalizes_whitespace_inside_fragments() {
        assert_eq!(normalize_whitespace("  A \t  B\n C  "), "A B C");
    }

    #[test]
    fn document_lines_in_page_then_vertical_order() {
        let pages = vec![
            page(2, vec![frag("Second page", 300.0, 10.0, 90.0, 12.0)]),
            page(
                1,
                vec![
                    frag("Lower line", 400.0, 10.0, 90.0, 12.0),
                    frag("Upper line", 200.0, 10.0, 90.0, 12.0),
                ],
            ),
        ];
        let lines = reconstruct_lines(&pages, &OutlineParams::default());
        let texts: Vec<_> = lines.iter().map(|l| (l.page, l.text.as_str())).collect();
        assert_eq!(
            texts,
            [(1, "Upper line"), (1, "Lower line"), (2, "Second page")]
        );
    }
}
