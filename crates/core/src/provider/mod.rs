//! Page-text providers.
//!
//! A provider turns a document into per-page word fragments with positions
//! and font sizes. [`LopdfProvider`] reads real PDFs; [`MemoryProvider`]
//! serves pre-built pages and is what tests and callers with their own text
//! extraction use.

mod font;
mod interp;
mod objects;
mod pdf;

pub use pdf::LopdfProvider;

use crate::error::Result;
use crate::model::PageText;

/// Source of positioned page text for one document.
pub trait PageTextProvider {
    /// Identifier used in logs and error messages.
    fn document_id(&self) -> &str;

    /// All pages of the document, in any order.
    fn pages(&self) -> Result<Vec<PageText>>;
}

/// Provider over pages already held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    document_id: String,
    pages: Vec<PageText>,
}

impl MemoryProvider {
    pub fn new(document_id: impl Into<String>, pages: Vec<PageText>) -> Self {
        Self {
            document_id: document_id.into(),
            pages,
        }
    }
}

impl PageTextProvider for MemoryProvider {
    fn document_id(&self) -> &str {
        &self.document_id
    }

    fn pages(&self) -> Result<Vec<PageText>> {
        Ok(self.pages.clone())
    }
}

impl<P: PageTextProvider + ?Sized> PageTextProvider for &P {
    fn document_id(&self) -> &str {
        (**self).document_id()
    }

    fn pages(&self) -> Result<Vec<PageText>> {
        (**self).pages()
    }
}
