//! Export engine for funcport.
//!
//! Turns a `.ipynb` notebook into a function descriptor.
//!
//! # Architecture
//!
//! ```text
//! notebook.ipynb ──► JupyterNotebook ──► CellExtractor ──► source ──► CodeSink
//!                                              ▲                         │
//!                               NUCLIO_HANDLER_PATH                      ▼
//!                              (replaces extraction)          FunctionConfig ──► notebook.yaml
//! ```

mod config;
mod descriptor;
mod error;
mod ipynb;
mod sink;

pub use config::{CODE_TARGET_PATH_ENV, ExportConfig, HANDLER_NAME_ENV, HANDLER_PATH_ENV};
pub use descriptor::{
    BuildSpec, EnvVar, FunctionConfig, FunctionMetadata, FunctionSpec, OUTPUT_EXTENSION,
    normalize_name,
};
pub use error::{ExportError, ExportResult};
pub use ipynb::{CellSource, JupyterCell, JupyterNotebook};
pub use sink::{CodeSink, decode_source};

use std::fs;
use std::path::{Path, PathBuf};

use funcport_core::{Cell, CellExtractor};

/// Result of exporting one notebook.
#[derive(Debug, Clone)]
pub struct Export {
    /// The extracted (or substituted) function source
    pub code: String,

    /// The descriptor as built
    pub descriptor: FunctionConfig,

    /// The descriptor rendered as YAML
    pub yaml: String,
}

/// Extract the function source of a notebook file.
pub fn extract_code(notebook_path: impl AsRef<Path>, config: &ExportConfig) -> ExportResult<String> {
    let cells = load_cells(notebook_path.as_ref(), config)?;
    extract_cells(&cells, config)
}

/// Extract the function source of already-loaded cells.
pub fn extract_cells(cells: &[Cell], config: &ExportConfig) -> ExportResult<String> {
    let extractor = CellExtractor::with_matcher(config.matcher()?);
    Ok(extractor.extract_or_load(cells, config.handler_path())?)
}

/// Export a notebook file.
///
/// Nothing is written unless a code target path is configured, in which
/// case the source is written there before the descriptor is returned.
pub fn export_notebook(notebook_path: impl AsRef<Path>, config: &ExportConfig) -> ExportResult<Export> {
    let notebook_path = notebook_path.as_ref();
    let cells = load_cells(notebook_path, config)?;

    let export = export_cells(&cells, config)?;

    tracing::info!(
        "Exported {} → {} ({} cells)",
        notebook_path.display(),
        export.descriptor.spec.handler.as_deref().unwrap_or_default(),
        cells.len()
    );

    Ok(export)
}

/// Export already-loaded cells.
pub fn export_cells(cells: &[Cell], config: &ExportConfig) -> ExportResult<Export> {
    let code = extract_cells(cells, config)?;

    let mut descriptor = FunctionConfig::new();
    if let Some(name) = &config.name {
        descriptor.set_name(name);
    }
    descriptor.set_handler(config.handler().to_string());

    CodeSink::from_target(config.code_target_path.as_deref()).deliver(&code, &mut descriptor)?;
    let yaml = descriptor.render()?;

    Ok(Export {
        code,
        descriptor,
        yaml,
    })
}

/// The notebook's cells, or none when a handler file replaces the notebook.
fn load_cells(notebook_path: &Path, config: &ExportConfig) -> ExportResult<Vec<Cell>> {
    if config.handler_path().is_some() {
        return Ok(Vec::new());
    }
    Ok(JupyterNotebook::read_from_file(notebook_path)?.cells())
}

/// Write a rendered descriptor.
pub fn write_descriptor(export: &Export, path: impl AsRef<Path>) -> ExportResult<()> {
    let path = path.as_ref();
    fs::write(path, &export.yaml).map_err(|e| ExportError::WriteError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Get the default descriptor path for a notebook.
pub fn default_descriptor_path(notebook_path: impl AsRef<Path>) -> PathBuf {
    notebook_path.as_ref().with_extension(OUTPUT_EXTENSION)
}
