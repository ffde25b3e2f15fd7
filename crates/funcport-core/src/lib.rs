//! Core engine for funcport notebook exports.
//!
//! This crate provides:
//! - Directive matching over notebook comments (`# mlrun: ignore`, ...)
//! - The cell extraction pass producing one exportable source file
//! - Rewriting of interactive-shell syntax into plain source
//! - Handler naming for the function descriptor

pub mod cell;
pub mod directive;
pub mod error;
pub mod extract;
pub mod handler;
pub mod normalize;

pub use cell::{Cell, CellKind};
pub use directive::{DEFAULT_KEYWORDS, Directive, DirectiveMatcher, has_directive};
pub use error::{Error, Result};
pub use extract::{CellExtractor, HEADER, extract};
pub use handler::{DEFAULT_HANDLER, HandlerRef, handler_reference};
pub use normalize::{IPythonNormalizer, NoopNormalizer, SourceNormalizer};
