//! End-to-end pipeline tests over in-memory page text.
//!
//! Covers:
//! - line reconstruction feeding heading selection
//! - the per-page cap and page ordering
//! - title selection and level assignment with a fixed-vector embedder
//! - documents without lines or without headings

use std::collections::HashMap;

use pdfoutline_core::{
    Embedder, HashingEmbedder, HeadingLevel, MemoryProvider, OutlineOutcome, OutlineParams,
    PageText, Result, TextFragment, extract_outline,
};

/// Returns preset vectors; anything unknown gets its own axis.
struct FixedEmbedder {
    vectors: HashMap<&'static str, Vec<f32>>,
}

impl FixedEmbedder {
    fn new(entries: &[(&'static str, [f32; 3])]) -> Self {
        Self {
            vectors: entries.iter().map(|(k, v)| (*k, v.to_vec())).collect(),
        }
    }
}

impl Embedder for FixedEmbedder {
    fn embed(&mut self, text: &str) -> Result<Vec<f32>> {
        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| vec![0.0, 0.0, 1.0]))
    }
}

fn frag(text: &str, top: f64, x0: f64, size: f64) -> TextFragment {
    let x1 = x0 + text.chars().count() as f64 * size * 0.5;
    TextFragment::new(text, top, x0, x1, size)
}

const BODY: &str = "The quarter closed with steady growth across every region we serve";

fn run(pages: Vec<PageText>, embedder: &mut impl Embedder) -> OutlineOutcome {
    let provider = MemoryProvider::new("memory.pdf", pages);
    extract_outline(&provider, embedder, &OutlineParams::default()).unwrap()
}

// ============================================================================
// Line reconstruction through the pipeline
// ============================================================================

#[test]
fn test_split_word_is_rejoined() {
    let page = PageText::new(
        1,
        792.0,
        vec![
            TextFragment::new("Intro", 200.0, 10.0, 40.0, 20.0),
            TextFragment::new("duction", 200.3, 42.0, 80.0, 20.0),
            frag(BODY, 240.0, 10.0, 10.0),
        ],
    );
    let mut embedder = HashingEmbedder::default();
    let outline = run(vec![page], &mut embedder).into_outline().unwrap();
    assert_eq!(outline.title, "Introduction");
    assert_eq!(outline.headings.len(), 1);
    assert_eq!(outline.headings[0].text, "Introduction");
    assert_eq!(outline.headings[0].level, HeadingLevel::H1);
}

#[test]
fn test_page_furniture_is_ignored() {
    let page = PageText::new(
        1,
        792.0,
        vec![
            frag("Quarterly Update", 40.0, 72.0, 20.0),
            frag("Market Overview", 200.0, 72.0, 18.0),
            frag(BODY, 240.0, 72.0, 10.0),
            frag("Page 3", 300.0, 72.0, 20.0),
            frag("Confidential", 760.0, 72.0, 20.0),
        ],
    );
    let mut embedder = HashingEmbedder::default();
    let outline = run(vec![page], &mut embedder).into_outline().unwrap();
    let texts: Vec<_> = outline.headings.iter().map(|h| h.text.as_str()).collect();
    assert_eq!(texts, ["Market Overview"]);
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_at_most_four_headings_per_page() {
    let mut fragments: Vec<_> = (0..7)
        .map(|i| frag(&format!("Topic Heading{i}"), 150.0 + 40.0 * i as f64, 72.0, 16.0))
        .collect();
    fragments.push(frag(BODY, 500.0, 72.0, 10.0));
    let mut embedder = HashingEmbedder::default();
    let outline = run(vec![PageText::new(1, 792.0, fragments)], &mut embedder)
        .into_outline()
        .unwrap();
    assert_eq!(outline.headings.len(), 4);
    // equal scores keep reading order
    assert_eq!(outline.headings[0].text, "Topic Heading0");
    assert_eq!(outline.headings[3].text, "Topic Heading3");
}

#[test]
fn test_pages_come_out_in_ascending_order() {
    let pages = vec![
        PageText::new(3, 792.0, vec![frag("Closing Notes", 150.0, 72.0, 18.0)]),
        PageText::new(1, 792.0, vec![frag("Opening Notes", 150.0, 72.0, 18.0)]),
        PageText::new(2, 792.0, vec![frag("Middle Notes", 150.0, 72.0, 18.0)]),
    ];
    let mut embedder = HashingEmbedder::default();
    let outline = run(pages, &mut embedder).into_outline().unwrap();
    let pages: Vec<_> = outline.headings.iter().map(|h| h.page).collect();
    assert_eq!(pages, [1, 2, 3]);
    assert_eq!(outline.title, "Opening Notes");
}

// ============================================================================
// Assembly
// ============================================================================

#[test]
fn test_similar_smaller_heading_is_h2() {
    let page = PageText::new(
        1,
        792.0,
        vec![
            frag("Introduction", 150.0, 72.0, 20.0),
            frag("Background", 300.0, 72.0, 16.0),
            frag(BODY, 340.0, 72.0, 10.0),
        ],
    );
    let mut embedder = FixedEmbedder::new(&[
        ("Introduction", [1.0, 0.0, 0.0]),
        ("Background", [0.8, 0.6, 0.0]),
    ]);
    let outline = run(vec![page], &mut embedder).into_outline().unwrap();
    let got: Vec<_> = outline
        .headings
        .iter()
        .map(|h| (h.text.as_str(), h.level))
        .collect();
    assert_eq!(
        got,
        [
            ("Introduction", HeadingLevel::H1),
            ("Background", HeadingLevel::H2)
        ]
    );
    assert_eq!(outline.title, "Introduction");
}

#[test]
fn test_unrelated_small_heading_is_h3() {
    let pages = vec![
        PageText::new(
            1,
            792.0,
            vec![
                frag("Strategy", 150.0, 72.0, 24.0),
                frag(BODY, 200.0, 72.0, 10.0),
            ],
        ),
        PageText::new(
            2,
            792.0,
            vec![
                frag("Closing Remarks:", 150.0, 72.0, 12.0),
                frag(BODY, 200.0, 72.0, 10.0),
            ],
        ),
    ];
    let mut embedder = FixedEmbedder::new(&[("Strategy", [1.0, 0.0, 0.0])]);
    let outline = run(pages, &mut embedder).into_outline().unwrap();
    assert_eq!(outline.headings[0].level, HeadingLevel::H1);
    // orthogonal vectors, size ratio 0.5
    assert_eq!(outline.headings[1].level, HeadingLevel::H3);
}

#[test]
fn test_first_heading_always_h1() {
    let pages = vec![
        PageText::new(
            2,
            792.0,
            vec![
                frag("Minor Note:", 150.0, 72.0, 11.0),
                frag(BODY, 200.0, 72.0, 10.0),
            ],
        ),
        PageText::new(
            3,
            792.0,
            vec![
                frag("MAJOR BANNER", 150.0, 72.0, 30.0),
                frag(BODY, 200.0, 72.0, 10.0),
            ],
        ),
    ];
    let mut embedder = HashingEmbedder::default();
    let outline = run(pages, &mut embedder).into_outline().unwrap();
    assert_eq!(outline.headings[0].text, "Minor Note:");
    assert_eq!(outline.headings[0].level, HeadingLevel::H1);
    // nothing on page 1, so no title
    assert_eq!(outline.title, "");
}

#[test]
fn test_repeated_runs_produce_identical_json() {
    let pages = || {
        vec![
            PageText::new(
                1,
                792.0,
                vec![
                    frag("Annual Report", 120.0, 72.0, 24.0),
                    frag("Executive Summary", 170.0, 72.0, 18.0),
                    frag(BODY, 220.0, 72.0, 11.0),
                ],
            ),
            PageText::new(
                2,
                792.0,
                vec![
                    frag("Financial Results", 120.0, 72.0, 18.0),
                    frag("Revenue Growth", 170.0, 72.0, 14.0),
                    frag(BODY, 220.0, 72.0, 11.0),
                ],
            ),
        ]
    };
    let mut first = HashingEmbedder::default();
    let mut second = HashingEmbedder::default();
    let a = run(pages(), &mut first).into_outline().unwrap();
    let b = run(pages(), &mut second).into_outline().unwrap();
    assert_eq!(
        serde_json::to_string_pretty(&a).unwrap(),
        serde_json::to_string_pretty(&b).unwrap()
    );
}

// ============================================================================
// Nothing to do
// ============================================================================

#[test]
fn test_document_without_text_is_empty() {
    let pages = vec![PageText::new(1, 792.0, vec![]), PageText::new(2, 792.0, vec![])];
    let mut embedder = HashingEmbedder::default();
    assert_eq!(run(pages, &mut embedder), OutlineOutcome::EmptyDocument);
}

#[test]
fn test_only_margin_text_is_empty() {
    let page = PageText::new(
        1,
        792.0,
        vec![
            frag("Company Letterhead", 20.0, 72.0, 18.0),
            frag("Footer Text Here", 770.0, 72.0, 9.0),
        ],
    );
    let mut embedder = HashingEmbedder::default();
    assert_eq!(run(vec![page], &mut embedder), OutlineOutcome::EmptyDocument);
}

#[test]
fn test_body_text_only_has_no_headings() {
    let page = PageText::new(
        1,
        792.0,
        vec![
            frag(BODY, 200.0, 72.0, 10.0),
            frag(BODY, 214.0, 72.0, 10.0),
        ],
    );
    let mut embedder = HashingEmbedder::default();
    assert_eq!(run(vec![page], &mut embedder), OutlineOutcome::NoHeadings);
}
