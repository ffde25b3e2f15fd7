//! Export configuration.
//!
//! The function runtime conventions pass overrides through the environment:
//!
//! | Variable                  | Effect                                              |
//! |---------------------------|-----------------------------------------------------|
//! | `NUCLIO_HANDLER_PATH`     | export this file verbatim instead of the notebook   |
//! | `NUCLIO_HANDLER_NAME`     | handler function name                               |
//! | `NUCLIO_CODE_TARGET_PATH` | write the source here instead of embedding it       |
//!
//! Empty values count as unset.

use std::path::{Path, PathBuf};

use funcport_core::{DirectiveMatcher, HandlerRef};

use crate::error::ExportResult;

pub const HANDLER_PATH_ENV: &str = "NUCLIO_HANDLER_PATH";
pub const HANDLER_NAME_ENV: &str = "NUCLIO_HANDLER_NAME";
pub const CODE_TARGET_PATH_ENV: &str = "NUCLIO_CODE_TARGET_PATH";

/// Settings for one export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportConfig {
    /// Function name for the descriptor, normalized before use.
    pub name: Option<String>,

    /// Source file that replaces the notebook's extracted code.
    pub handler_path: Option<PathBuf>,

    /// Handler function name.
    pub handler_name: Option<String>,

    /// Where to write the source instead of embedding it.
    pub code_target_path: Option<PathBuf>,

    /// Directive namespace keywords; empty means the defaults.
    pub keywords: Vec<String>,
}

impl ExportConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        Self {
            handler_path: get(HANDLER_PATH_ENV).map(PathBuf::from),
            handler_name: get(HANDLER_NAME_ENV),
            code_target_path: get(CODE_TARGET_PATH_ENV).map(PathBuf::from),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_handler_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.handler_path = Some(path.into());
        self
    }

    pub fn with_handler_name(mut self, name: impl Into<String>) -> Self {
        self.handler_name = Some(name.into());
        self
    }

    pub fn with_code_target_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.code_target_path = Some(path.into());
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Directive matcher for the configured keywords.
    pub fn matcher(&self) -> ExportResult<DirectiveMatcher> {
        if self.keywords.is_empty() {
            return Ok(DirectiveMatcher::default());
        }
        Ok(DirectiveMatcher::new(self.keywords.iter().cloned())?)
    }

    /// Handler reference for the descriptor.
    pub fn handler(&self) -> HandlerRef {
        HandlerRef::resolve(self.handler_path.as_deref(), self.handler_name.as_deref())
    }

    /// Source file replacing extraction, if any.
    pub fn handler_path(&self) -> Option<&Path> {
        self.handler_path.as_deref()
    }
}
