//! Per-page heading selection.
//!
//! Each page is judged against its own font statistics; only the best
//! `max_headings_per_page` candidates of a page survive.

use itertools::Itertools;
use tracing::{debug, trace};

use crate::classify::classify;
use crate::lines::normalize_whitespace;
use crate::model::{Line, PageFontStats, ScoredCandidate};
use crate::params::OutlineParams;
use crate::score::heading_score;

/// Scores and ranks the heading candidates of a single page.
///
/// Returns at most `max_headings_per_page` candidates, best first. Candidates
/// with equal scores keep their original order.
pub fn rank_page(lines: &[&Line], params: &OutlineParams) -> Vec<ScoredCandidate> {
    let stats = PageFontStats::from_lines(lines.iter().copied());

    let mut scored: Vec<ScoredCandidate> = lines
        .iter()
        .filter(|line| {
            let verdict = classify(&line.text, line.font_size, &stats, params);
            trace!(page = line.page, text = %line.text, ?verdict, "classified line");
            verdict.is_heading()
        })
        .map(|&line| ScoredCandidate {
            line: line.clone(),
            score: heading_score(line, stats.max_font_size, params),
        })
        .collect();

    // sort_by is stable, ties stay in reading order
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(params.max_headings_per_page);
    scored
}

/// Selects the headings of a document, page by page in ascending page order.
pub fn select_headings(lines: &[Line], params: &OutlineParams) -> Vec<Line> {
    let mut ordered: Vec<&Line> = lines.iter().collect();
    ordered.sort_by_key(|line| line.page);

    let mut headings = Vec::new();
    for (page, page_lines) in &ordered.into_iter().chunk_by(|line| line.page) {
        let page_lines: Vec<&Line> = page_lines.collect();
        let ranked = rank_page(&page_lines, params);
        debug!(
            page,
            lines = page_lines.len(),
            selected = ranked.len(),
            "selected page headings"
        );
        headings.extend(ranked.into_iter().map(|candidate| {
            let mut line = candidate.line;
            line.text = normalize_whitespace(&line.text);
            line
        }));
    }
    headings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(page: u32, top: f64, text: &str, font_size: f64) -> Line {
        Line {
            text: text.to_string(),
            font_size,
            page,
            top,
        }
    }

    #[test]
    fn keeps_at_most_four_per_page() {
        let mut lines = Vec::new();
        for i in 0..8 {
            lines.push(line(1, 100.0 + i as f64 * 20.0, &format!("Topic Number{i}"), 20.0));
        }
        lines.push(line(1, 300.0, "plain body text that goes on and on", 10.0));
        let headings = select_headings(&lines, &OutlineParams::default());
        assert_eq!(headings.len(), 4);
    }

    #[test]
    fn best_scores_first_ties_in_reading_order() {
        let lines = vec![
            line(1, 100.0, "Background Notes", 14.0),
            line(1, 120.0, "KEY FINDINGS", 14.0),
            line(1, 140.0, "Further Notes", 14.0),
            line(1, 160.0, "Plain body text goes here at length", 10.0),
        ];
        let headings = select_headings(&lines, &OutlineParams::default());
        let texts: Vec<_> = headings.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, ["KEY FINDINGS", "Background Notes", "Further Notes"]);
    }

    #[test]
    fn pages_without_candidates_contribute_nothing() {
        let lines = vec![
            line(1, 100.0, "Opening Remarks", 18.0),
            line(1, 140.0, "this body text is long enough to be rejected here", 10.0),
            line(2, 100.0, "the rest of the body text continues on and on across this page", 10.0),
            line(3, 100.0, "Closing Remarks", 18.0),
            line(3, 140.0, "more of the regular body text on the final page", 10.0),
        ];
        let headings = select_headings(&lines, &OutlineParams::default());
        let pages: Vec<_> = headings.iter().map(|h| h.page).collect();
        assert_eq!(pages, [1, 3]);
    }

    #[test]
    fn pages_visited_in_ascending_order() {
        let lines = vec![
            line(2, 100.0, "Second Chapter", 18.0),
            line(1, 100.0, "First Chapter", 18.0),
        ];
        let headings = select_headings(&lines, &OutlineParams::default());
        assert_eq!(headings[0].text, "First Chapter");
        assert_eq!(headings[1].text, "Second Chapter");
    }

    #[test]
    fn cap_is_configurable() {
        let lines: Vec<_> = (0..6)
            .map(|i| line(1, 100.0 + i as f64 * 30.0, &format!("Part Section{i}"), 16.0))
            .collect();
        let params = OutlineParams::default().with_max_headings_per_page(2);
        assert_eq!(select_headings(&lines, &params).len(), 2);
    }
}
