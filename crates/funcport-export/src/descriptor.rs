//! Serverless function descriptor.
//!
//! The descriptor is a nuclio `Function` document. Fields are declared in
//! alphabetical order so the YAML comes out with sorted keys.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use funcport_core::HEADER;

use crate::error::ExportResult;

/// Extension of rendered descriptor files.
pub const OUTPUT_EXTENSION: &str = "yaml";

const API_VERSION: &str = "nuclio.io/v1";
const DEFAULT_NAME: &str = "notebook";
const DEFAULT_RUNTIME: &str = "python:3.6";

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern must compile"));

/// A function descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionConfig {
    pub api_version: String,
    pub kind: String,
    pub metadata: FunctionMetadata,
    pub spec: FunctionSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionMetadata {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub build: BuildSpec,
    pub env: Vec<EnvVar>,
    /// `module:function` entry point
    pub handler: Option<String>,
    pub runtime: String,
    pub volumes: Vec<serde_yaml::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSpec {
    pub commands: Vec<String>,
    /// Base64 of the function source, when embedded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_source_code: Option<String>,
    pub no_base_images_pull: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

impl FunctionConfig {
    /// The default function document.
    pub fn new() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: "Function".to_string(),
            metadata: FunctionMetadata {
                name: DEFAULT_NAME.to_string(),
            },
            spec: FunctionSpec {
                build: BuildSpec {
                    commands: Vec::new(),
                    function_source_code: None,
                    no_base_images_pull: true,
                },
                env: Vec::new(),
                handler: None,
                runtime: DEFAULT_RUNTIME.to_string(),
                volumes: Vec::new(),
            },
        }
    }

    /// Set `metadata.name` from a user-supplied name.
    pub fn set_name(&mut self, name: &str) {
        self.metadata.name = normalize_name(name);
    }

    /// Set `spec.handler`.
    pub fn set_handler(&mut self, handler: impl Into<String>) {
        self.spec.handler = Some(handler.into());
    }

    /// Render as YAML, preceded by the generator header line.
    pub fn render(&self) -> ExportResult<String> {
        let yaml = serde_yaml::to_string(self)?;
        Ok(format!("{HEADER}{yaml}"))
    }

    /// Parse a rendered descriptor.
    pub fn parse(text: &str) -> ExportResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn a free-form name into a function name.
///
/// Whitespace runs and underscores become `-` and the result is lowercased.
pub fn normalize_name(name: &str) -> String {
    WHITESPACE_RUN
        .replace_all(name.trim(), "-")
        .replace('_', "-")
        .to_lowercase()
}
