//! Delivery of the extracted source.

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;

use crate::descriptor::FunctionConfig;
use crate::error::{ExportError, ExportResult};

/// Where the function source ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeSink {
    /// Base64 inside `spec.build.functionSourceCode`.
    Embed,
    /// A file next to the descriptor; the descriptor carries no source.
    File(PathBuf),
}

impl CodeSink {
    pub fn from_target(target: Option<&Path>) -> Self {
        match target {
            Some(path) => CodeSink::File(path.to_path_buf()),
            None => CodeSink::Embed,
        }
    }

    /// Hand `code` over, updating `config` when the code is embedded.
    pub fn deliver(&self, code: &str, config: &mut FunctionConfig) -> ExportResult<()> {
        match self {
            CodeSink::Embed => {
                let encoded = base64::engine::general_purpose::STANDARD.encode(code.as_bytes());
                config.spec.build.function_source_code = Some(encoded);
            }
            CodeSink::File(path) => {
                fs::write(path, code).map_err(|e| ExportError::WriteError {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
                tracing::debug!("wrote function source to {}", path.display());
            }
        }
        Ok(())
    }
}

/// Decode an embedded `functionSourceCode` value.
pub fn decode_source(encoded: &str) -> Option<String> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .ok()?;
    String::from_utf8(bytes).ok()
}
