//! End-to-end outline extraction.
//!
//! - `extract_outline()` - run the pipeline over any page-text provider
//! - `extract_outline_from_path()` - read a PDF file with lopdf
//! - `extract_outline_from_bytes()` - read an in-memory PDF with lopdf

use std::path::Path;

use tracing::{debug, info};

use crate::assemble::OutlineAssembler;
use crate::embed::Embedder;
use crate::error::{OutlineError, Result, Stage};
use crate::lines::reconstruct_lines;
use crate::model::Outline;
use crate::params::OutlineParams;
use crate::provider::{LopdfProvider, PageTextProvider};
use crate::select::select_headings;

/// Result of a pipeline run that did not fail.
///
/// Documents without text or without headings are ordinary outcomes, not
/// errors; only the `Built` case carries an outline worth writing out.
#[derive(Debug, Clone, PartialEq)]
pub enum OutlineOutcome {
    Built(Outline),
    /// No usable lines were found on any page.
    EmptyDocument,
    /// Lines were found but none qualified as a heading.
    NoHeadings,
}

impl OutlineOutcome {
    pub fn outline(&self) -> Option<&Outline> {
        match self {
            OutlineOutcome::Built(outline) => Some(outline),
            _ => None,
        }
    }

    pub fn into_outline(self) -> Option<Outline> {
        match self {
            OutlineOutcome::Built(outline) => Some(outline),
            _ => None,
        }
    }
}

/// Runs the full pipeline: lines, heading selection, then outline assembly.
///
/// Provider and embedder failures are wrapped with the document id and the
/// stage they occurred in.
pub fn extract_outline<P, E>(
    provider: &P,
    embedder: &mut E,
    params: &OutlineParams,
) -> Result<OutlineOutcome>
where
    P: PageTextProvider + ?Sized,
    E: Embedder + ?Sized,
{
    params.validate()?;
    let document = provider.document_id();

    let pages = provider
        .pages()
        .map_err(|err| err.in_stage(Stage::PageText, document))?;
    debug!(document, pages = pages.len(), "loaded page text");

    let lines = reconstruct_lines(&pages, params);
    if lines.is_empty() {
        info!(document, "no text lines found");
        return Ok(OutlineOutcome::EmptyDocument);
    }

    let headings = select_headings(&lines, params);
    debug!(
        document,
        lines = lines.len(),
        headings = headings.len(),
        "selected headings"
    );
    if headings.is_empty() {
        info!(document, lines = lines.len(), "no headings detected");
        return Ok(OutlineOutcome::NoHeadings);
    }

    let outline = OutlineAssembler::new(embedder, params)
        .assemble(&headings)
        .map_err(|err| err.in_stage(Stage::LevelAssignment, document))?;
    info!(
        document,
        title = %outline.title,
        headings = outline.headings.len(),
        "outline built"
    );
    Ok(OutlineOutcome::Built(outline))
}

/// Extracts the outline of a PDF file.
pub fn extract_outline_from_path<E>(
    path: impl AsRef<Path>,
    embedder: &mut E,
    params: &OutlineParams,
) -> Result<OutlineOutcome>
where
    E: Embedder + ?Sized,
{
    let path = path.as_ref();
    if !path.is_file() {
        return Err(OutlineError::InputMissing(path.to_path_buf()));
    }
    let provider = LopdfProvider::load(path)
        .map_err(|err| err.in_stage(Stage::PageText, &path.display().to_string()))?;
    extract_outline(&provider, embedder, params)
}

/// Extracts the outline of a PDF held in memory.
pub fn extract_outline_from_bytes<E>(
    bytes: &[u8],
    document_id: &str,
    embedder: &mut E,
    params: &OutlineParams,
) -> Result<OutlineOutcome>
where
    E: Embedder + ?Sized,
{
    let provider = LopdfProvider::from_bytes(bytes, document_id)
        .map_err(|err| err.in_stage(Stage::PageText, document_id))?;
    extract_outline(&provider, embedder, params)
}
