//! Notebook cells as seen by the extractor.

/// Type of cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// Executable code cell
    Code,
    /// Markdown, raw, or any other non-code cell
    Other,
}

impl CellKind {
    /// Classify a notebook `cell_type` tag.
    pub fn from_tag(tag: &str) -> Self {
        if tag == "code" {
            CellKind::Code
        } else {
            CellKind::Other
        }
    }
}

/// A single notebook cell, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Cell type
    pub kind: CellKind,

    /// Raw cell text
    pub source: String,
}

impl Cell {
    /// Create a code cell.
    pub fn code(source: impl Into<String>) -> Self {
        Self {
            kind: CellKind::Code,
            source: source.into(),
        }
    }

    /// Create a non-code cell (markdown, raw, ...).
    pub fn other(source: impl Into<String>) -> Self {
        Self {
            kind: CellKind::Other,
            source: source.into(),
        }
    }

    /// Whether this cell takes part in extraction.
    pub fn is_code(&self) -> bool {
        self.kind == CellKind::Code
    }
}
