//! Error types for pdfoutline.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Pipeline stage that talks to an external collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Page-text provider: fragments and page geometry.
    PageText,
    /// Outline assembly: embedding service calls during level assignment.
    LevelAssignment,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::PageText => f.write_str("page-text extraction"),
            Stage::LevelAssignment => f.write_str("level assignment"),
        }
    }
}

/// Primary error type for outline extraction.
#[derive(Error, Debug)]
pub enum OutlineError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("invalid parameter: {0}")]
    InvalidParams(String),

    #[error("no PDF input found at {}", .0.display())]
    InputMissing(PathBuf),

    #[error("{stage} failed for {document}: {source}")]
    Stage {
        stage: Stage,
        document: String,
        #[source]
        source: Box<OutlineError>,
    },
}

impl OutlineError {
    /// Wraps a collaborator failure with the document and stage it happened in.
    ///
    /// Already-wrapped errors are returned unchanged so the innermost stage wins.
    pub fn in_stage(self, stage: Stage, document: &str) -> Self {
        match self {
            wrapped @ OutlineError::Stage { .. } => wrapped,
            other => OutlineError::Stage {
                stage,
                document: document.to_string(),
                source: Box::new(other),
            },
        }
    }
}

impl From<lopdf::Error> for OutlineError {
    fn from(err: lopdf::Error) -> Self {
        OutlineError::Pdf(err.to_string())
    }
}

/// Convenience Result type alias for OutlineError.
pub type Result<T> = std::result::Result<T, OutlineError>;
