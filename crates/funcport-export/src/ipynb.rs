//! Jupyter notebook (.ipynb) reading.
//!
//! Only the parts of the format the exporter needs are modelled: the cell
//! list with each cell's type and source. Everything else is carried along as
//! opaque JSON.

use std::fs;
use std::path::Path;

use funcport_core::{Cell, CellKind};
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, ExportResult};

/// Oldest format version with a top-level cell list.
const MIN_NBFORMAT: u32 = 4;

/// A Jupyter notebook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JupyterNotebook {
    /// Notebook metadata
    #[serde(default)]
    pub metadata: serde_json::Value,

    /// Format version
    pub nbformat: u32,

    /// Minor format version
    #[serde(default)]
    pub nbformat_minor: u32,

    /// Notebook cells
    #[serde(default)]
    pub cells: Vec<JupyterCell>,
}

/// A Jupyter cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JupyterCell {
    /// Cell type (`code`, `markdown`, `raw`)
    pub cell_type: String,

    /// Cell metadata
    #[serde(default)]
    pub metadata: serde_json::Value,

    /// Cell source
    pub source: CellSource,

    /// Cell outputs (for code cells)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Vec<serde_json::Value>>,

    /// Execution count (for code cells)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_count: Option<u32>,
}

/// Cell source, stored either as one string or as a list of lines.
///
/// In the list form every line but the last keeps its trailing newline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellSource {
    Text(String),
    Lines(Vec<String>),
}

impl CellSource {
    /// The source as a single string.
    pub fn text(&self) -> String {
        match self {
            CellSource::Text(text) => text.clone(),
            CellSource::Lines(lines) => lines.concat(),
        }
    }
}

impl JupyterNotebook {
    /// Read a notebook from a file.
    pub fn read_from_file(path: impl AsRef<Path>) -> ExportResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ExportError::ReadError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    /// Parse a notebook from its JSON text.
    pub fn from_json(content: &str) -> ExportResult<Self> {
        let notebook: Self = serde_json::from_str(content)?;
        if notebook.nbformat < MIN_NBFORMAT {
            return Err(ExportError::InvalidNotebook(format!(
                "nbformat {} is not supported (need {} or later)",
                notebook.nbformat, MIN_NBFORMAT
            )));
        }
        Ok(notebook)
    }

    /// Build a notebook from extractor cells.
    pub fn from_cells(cells: &[Cell]) -> Self {
        Self {
            metadata: serde_json::json!({}),
            nbformat: MIN_NBFORMAT,
            nbformat_minor: 5,
            cells: cells.iter().map(JupyterCell::from_cell).collect(),
        }
    }

    /// The cells in document order, ready for extraction.
    pub fn cells(&self) -> Vec<Cell> {
        self.cells
            .iter()
            .map(|cell| Cell {
                kind: CellKind::from_tag(&cell.cell_type),
                source: cell.source.text(),
            })
            .collect()
    }
}

impl JupyterCell {
    fn from_cell(cell: &Cell) -> Self {
        let source = CellSource::Lines(cell.source.split_inclusive('\n').map(String::from).collect());
        match cell.kind {
            CellKind::Code => Self {
                cell_type: "code".to_string(),
                metadata: serde_json::json!({}),
                source,
                outputs: Some(Vec::new()),
                execution_count: None,
            },
            CellKind::Other => Self {
                cell_type: "markdown".to_string(),
                metadata: serde_json::json!({}),
                source,
                outputs: None,
                execution_count: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTEBOOK: &str = r##"{
 "cells": [
  {
   "cell_type": "markdown",
   "metadata": {},
   "source": ["# Training\n", "Prose only."]
  },
  {
   "cell_type": "code",
   "execution_count": 3,
   "metadata": {"tags": []},
   "outputs": [{"output_type": "stream", "name": "stdout", "text": ["hi\n"]}],
   "source": ["import os\n", "print('hi')"]
  },
  {
   "cell_type": "code",
   "execution_count": null,
   "metadata": {},
   "outputs": [],
   "source": "x = 1\ny = 2"
  }
 ],
 "metadata": {"kernelspec": {"name": "python3", "display_name": "Python 3", "language": "python"}},
 "nbformat": 4,
 "nbformat_minor": 2
}"##;

    #[test]
    fn test_parse_cells() {
        let notebook = JupyterNotebook::from_json(NOTEBOOK).unwrap();
        let cells = notebook.cells();

        assert_eq!(cells.len(), 3);
        assert_eq!(cells[0], Cell::other("# Training\nProse only."));
        assert_eq!(cells[1], Cell::code("import os\nprint('hi')"));
        assert_eq!(cells[2], Cell::code("x = 1\ny = 2"));
    }

    #[test]
    fn test_old_format_rejected() {
        let err = JupyterNotebook::from_json(r#"{"nbformat": 3, "worksheets": []}"#).unwrap_err();
        assert!(matches!(err, ExportError::InvalidNotebook(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = JupyterNotebook::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ExportError::JsonError(_)));
    }

    #[test]
    fn test_from_cells_keeps_sources() {
        let cells = vec![Cell::code("a = 1\nb = 2\n"), Cell::other("notes")];
        let notebook = JupyterNotebook::from_cells(&cells);

        assert_eq!(
            notebook.cells[0].source,
            CellSource::Lines(vec!["a = 1\n".to_string(), "b = 2\n".to_string()])
        );
        assert_eq!(notebook.cells[1].cell_type, "markdown");

        let json = serde_json::to_string(&notebook).unwrap();
        let parsed = JupyterNotebook::from_json(&json).unwrap();
        assert_eq!(parsed.cells(), cells);
    }
}
