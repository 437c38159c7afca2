//! Outline assembly: title selection and hierarchical level assignment.
//!
//! Levels come from one left-to-right pass. Each heading is compared with the
//! embeddings of the last few headings (the similarity window); topical
//! continuity combined with a prominent font promotes a heading towards H1,
//! weaker evidence demotes it to H2 or H3.

use std::collections::VecDeque;

use tracing::debug;

use crate::embed::Embedder;
use crate::error::Result;
use crate::model::{Heading, HeadingLevel, Line, Outline};
use crate::params::OutlineParams;

/// Fixed-capacity buffer of recent heading embeddings; the oldest entry is
/// evicted when a push would exceed the capacity.
#[derive(Debug, Clone)]
pub struct SimilarityWindow {
    capacity: usize,
    entries: VecDeque<Vec<f32>>,
}

impl SimilarityWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity + 1),
        }
    }

    pub fn push(&mut self, embedding: Vec<f32>) {
        self.entries.push_back(embedding);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Highest similarity between `embedding` and any entry, 0 if empty.
    pub fn best_similarity<E: Embedder + ?Sized>(&self, embedder: &E, embedding: &[f32]) -> f64 {
        self.entries
            .iter()
            .map(|entry| embedder.similarity(embedding, entry))
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Picks the title: the largest-font heading among the first
/// `title_candidates` headings on page 1 (earliest wins ties).
pub fn select_title(headings: &[Line], params: &OutlineParams) -> String {
    let mut best: Option<&Line> = None;
    for line in headings
        .iter()
        .filter(|line| line.page == 1)
        .take(params.title_candidates)
    {
        if best.is_none_or(|b| line.font_size > b.font_size) {
            best = Some(line);
        }
    }
    best.map(|line| line.text.clone()).unwrap_or_default()
}

/// Maps a combined score and size ratio to a level.
pub fn level_for(combined_score: f64, size_ratio: f64, params: &OutlineParams) -> HeadingLevel {
    let (high, low) = params.sim_thr;
    if combined_score >= high && size_ratio > params.h1_size_ratio {
        HeadingLevel::H1
    } else if combined_score >= low && size_ratio > params.h2_size_ratio {
        HeadingLevel::H2
    } else {
        HeadingLevel::H3
    }
}

/// Assigns titles and levels using an injected embedder.
pub struct OutlineAssembler<'a, E: Embedder + ?Sized> {
    embedder: &'a mut E,
    params: &'a OutlineParams,
}

impl<'a, E: Embedder + ?Sized> OutlineAssembler<'a, E> {
    pub fn new(embedder: &'a mut E, params: &'a OutlineParams) -> Self {
        Self { embedder, params }
    }

    /// Builds the outline for the selected headings, preserving their order.
    pub fn assemble(&mut self, headings: &[Line]) -> Result<Outline> {
        if headings.is_empty() {
            return Ok(Outline::default());
        }

        let title = select_title(headings, self.params);
        let global_max_font = headings
            .iter()
            .map(|line| line.font_size)
            .fold(f64::NEG_INFINITY, f64::max);

        let mut window = SimilarityWindow::new(self.params.context_window);
        let mut leveled = Vec::with_capacity(headings.len());

        for (i, line) in headings.iter().enumerate() {
            let embedding = self.embedder.embed(&line.text)?;

            let level = if i == 0 {
                HeadingLevel::H1
            } else {
                let best_sim = window.best_similarity(&*self.embedder, &embedding);
                let size_ratio = if global_max_font > 0.0 {
                    line.font_size / global_max_font
                } else {
                    0.0
                };
                let combined = self.params.similarity_weight * best_sim
                    + self.params.size_weight * size_ratio;
                let level = level_for(combined, size_ratio, self.params);
                debug!(
                    text = %line.text,
                    best_sim,
                    size_ratio,
                    combined,
                    window = window.len(),
                    %level,
                    "assigned level"
                );
                level
            };

            leveled.push(Heading {
                level,
                text: line.text.clone(),
                page: line.page,
            });
            window.push(embedding);
        }

        Ok(Outline {
            title,
            headings: leveled,
        })
    }
}
