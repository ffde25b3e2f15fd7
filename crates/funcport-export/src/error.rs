//! Error types for notebook export.

use std::path::PathBuf;

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Errors that can occur while exporting a notebook.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Failed to read the notebook.
    #[error("Failed to read file {path}: {message}")]
    ReadError { path: PathBuf, message: String },

    /// Failed to write the source or the descriptor.
    #[error("Failed to write file {path}: {message}")]
    WriteError { path: PathBuf, message: String },

    /// Failed to deserialize the notebook JSON.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Failed to serialize the function descriptor.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The notebook does not have the expected structure.
    #[error("Invalid notebook: {0}")]
    InvalidNotebook(String),

    /// Extraction failed.
    #[error(transparent)]
    Core(#[from] funcport_core::Error),
}
