//! Error types for funcport-core.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for funcport-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in funcport-core.
#[derive(Debug, Error)]
pub enum Error {
    /// A directive kind outside the recognized set was requested.
    ///
    /// This is a caller bug, never a property of notebook content.
    #[error("unknown directive: {0}")]
    UnknownDirective(String),

    /// The handler source file that replaces extraction could not be read.
    #[error("failed to read handler source {}: {source}", path.display())]
    HandlerSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directive matcher was configured without namespace keywords.
    #[error("at least one directive namespace keyword is required")]
    NoKeywords,

    /// A namespace keyword produced an invalid directive pattern.
    #[error("invalid directive pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
