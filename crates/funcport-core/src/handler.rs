//! Handler naming for exported functions.
//!
//! The descriptor points the function runtime at `<module>:<function>`. The
//! module is the handler file's stem when a handler file is configured, so a
//! file exported as `train.py` is imported as `train`.

use std::fmt;
use std::path::Path;

/// Fallback for both the module and the function name.
pub const DEFAULT_HANDLER: &str = "handler";

/// An importable `module:function` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerRef {
    pub module: String,
    pub function: String,
}

impl HandlerRef {
    /// Derive the reference from the configured handler file and name.
    pub fn resolve(handler_path: Option<&Path>, handler_name: Option<&str>) -> Self {
        let module = handler_path
            .and_then(module_name)
            .unwrap_or_else(|| DEFAULT_HANDLER.to_string());
        let function = handler_name.unwrap_or(DEFAULT_HANDLER).to_string();

        Self { module, function }
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.function)
    }
}

/// Format the handler reference as `module:function`.
pub fn handler_reference(handler_path: Option<&Path>, handler_name: Option<&str>) -> String {
    HandlerRef::resolve(handler_path, handler_name).to_string()
}

fn module_name(path: &Path) -> Option<String> {
    path.file_stem().map(|stem| stem.to_string_lossy().into_owned())
}
