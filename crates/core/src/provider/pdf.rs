//! Page-text provider backed by `lopdf`.

use std::path::Path;
use std::sync::Arc;

use lopdf::content::Content;
use lopdf::{Document, ObjectId};
use tracing::{debug, warn};

use super::PageTextProvider;
use super::font::FontInfo;
use super::interp::{FontMap, PageInterpreter};
use super::objects::{inherited, rect};
use crate::error::{OutlineError, Result};
use crate::model::PageText;
use crate::utils::Rect;

/// US Letter, used when a page has no readable `MediaBox`.
const DEFAULT_MEDIA_BOX: Rect = (0.0, 0.0, 612.0, 792.0);

/// Extracts positioned words from every page of a PDF.
pub struct LopdfProvider {
    document: Document,
    document_id: String,
}

impl LopdfProvider {
    /// Opens a PDF file; the document id is the file path.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let document = Document::load(path)
            .map_err(|err| OutlineError::Pdf(format!("{}: {err}", path.display())))?;
        Ok(Self::from_document(document, path.display().to_string()))
    }

    /// Parses a PDF held in memory.
    pub fn from_bytes(bytes: &[u8], document_id: impl Into<String>) -> Result<Self> {
        let document_id = document_id.into();
        let document = Document::load_mem(bytes)
            .map_err(|err| OutlineError::Pdf(format!("{document_id}: {err}")))?;
        Ok(Self::from_document(document, document_id))
    }

    /// Wraps an already loaded document.
    pub fn from_document(document: Document, document_id: impl Into<String>) -> Self {
        Self {
            document,
            document_id: document_id.into(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    fn page_text(&self, number: u32, page_id: ObjectId) -> Result<PageText> {
        let doc = &self.document;
        let page = doc.get_dictionary(page_id)?;

        let (_, y0, _, y1) = inherited(doc, page, b"MediaBox")
            .and_then(|obj| rect(doc, obj))
            .filter(|(x0, y0, x1, y1)| x1 > x0 && y1 > y0)
            .unwrap_or_else(|| {
                warn!(page = number, "missing or invalid MediaBox, assuming US Letter");
                DEFAULT_MEDIA_BOX
            });

        let fonts = self.page_fonts(number, page_id);
        let content = doc.get_page_content(page_id)?;
        let operations = Content::decode(&content)
            .map_err(|err| OutlineError::Pdf(format!("page {number}: {err}")))?
            .operations;

        let fragments = PageInterpreter::new(&fonts, y1).run(&operations);
        debug!(
            page = number,
            operations = operations.len(),
            fonts = fonts.len(),
            fragments = fragments.len(),
            "extracted page text"
        );
        Ok(PageText::new(number, y1 - y0, fragments))
    }

    /// Font resources of a page, inherited ones included.
    fn page_fonts(&self, number: u32, page_id: ObjectId) -> FontMap<'_> {
        let doc = &self.document;
        match doc.get_page_fonts(page_id) {
            Ok(fonts) => fonts
                .into_iter()
                .map(|(name, font)| (name, Arc::new(FontInfo::from_dict(doc, font))))
                .collect(),
            Err(err) => {
                warn!(page = number, %err, "unreadable font resources");
                FontMap::default()
            }
        }
    }
}

impl PageTextProvider for LopdfProvider {
    fn document_id(&self) -> &str {
        &self.document_id
    }

    fn pages(&self) -> Result<Vec<PageText>> {
        self.document
            .get_pages()
            .into_iter()
            .map(|(number, page_id)| self.page_text(number, page_id))
            .collect()
    }
}
