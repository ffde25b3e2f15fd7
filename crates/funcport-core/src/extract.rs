//! Cell extraction.
//!
//! Walks the notebook's cells in document order and collects the code meant
//! for export:
//!
//! ```text
//! cell ──► ignore? ──yes──► skip
//!            │
//!            ▼
//!         end-code? ──yes──► stop
//!            │
//!            ▼
//!         start-code? ──yes──► reset to header
//!            │
//!            ▼
//!         drop comment, `!` and `%` lines ──► normalize ──► append
//! ```
//!
//! Directives are always detected on the raw cell text, before any line is
//! filtered.

use std::fs;
use std::path::Path;

use crate::cell::Cell;
use crate::directive::{Directive, DirectiveMatcher};
use crate::error::{Error, Result};
use crate::normalize::{IPythonNormalizer, SourceNormalizer};

/// First line of every extracted source.
pub const HEADER: &str = concat!(
    "# Generated by ",
    env!("CARGO_PKG_NAME"),
    " ",
    env!("CARGO_PKG_VERSION"),
    "\n"
);

const SHELL_ESCAPE: char = '!';
const MAGIC_ESCAPE: char = '%';

/// Extracts exportable source from notebook cells.
#[derive(Debug, Clone)]
pub struct CellExtractor<N = IPythonNormalizer> {
    matcher: DirectiveMatcher,
    normalizer: N,
}

impl CellExtractor {
    /// Create an extractor with the default keywords and IPython rewriting.
    pub fn new() -> Self {
        Self::with_matcher(DirectiveMatcher::default())
    }

    /// Create an extractor with custom directive keywords.
    pub fn with_matcher(matcher: DirectiveMatcher) -> Self {
        Self {
            matcher,
            normalizer: IPythonNormalizer,
        }
    }
}

impl Default for CellExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: SourceNormalizer> CellExtractor<N> {
    /// Swap the normalizer applied to each kept cell.
    pub fn with_normalizer<M: SourceNormalizer>(self, normalizer: M) -> CellExtractor<M> {
        CellExtractor {
            matcher: self.matcher,
            normalizer,
        }
    }

    /// The directive matcher in use.
    pub fn matcher(&self) -> &DirectiveMatcher {
        &self.matcher
    }

    /// Extract the exportable source from `cells`.
    ///
    /// The result always starts with [`HEADER`].
    pub fn extract<'a, I>(&self, cells: I) -> String
    where
        I: IntoIterator<Item = &'a Cell>,
    {
        let mut code = String::from(HEADER);

        for (index, cell) in cells.into_iter().enumerate().filter(|(_, c)| c.is_code()) {
            let source = cell.source.as_str();

            if self.matcher.has_directive(Directive::Ignore, source) {
                tracing::debug!("cell {index}: ignored");
                continue;
            }

            if self.matcher.has_directive(Directive::EndCode, source) {
                tracing::debug!("cell {index}: end of exported code");
                break;
            }

            if self.matcher.has_directive(Directive::StartCode, source) {
                tracing::debug!("cell {index}: start of exported code, dropping earlier cells");
                code.clear();
                code.push_str(HEADER);
            }

            let without_comments = self.filter_comments(source);
            if without_comments.trim().is_empty() {
                continue;
            }

            code.push_str(&self.handle_code_cell(&without_comments));
        }

        code
    }

    /// Extract, unless a handler file replaces the notebook entirely.
    ///
    /// When `handler_path` is given its content is returned verbatim and the
    /// cells are not looked at.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HandlerSource`] if the handler file cannot be read.
    pub fn extract_or_load<'a, I>(&self, cells: I, handler_path: Option<&Path>) -> Result<String>
    where
        I: IntoIterator<Item = &'a Cell>,
    {
        match handler_path {
            Some(path) => {
                tracing::debug!("using handler source {}", path.display());
                fs::read_to_string(path).map_err(|source| Error::HandlerSource {
                    path: path.to_path_buf(),
                    source,
                })
            }
            None => Ok(self.extract(cells)),
        }
    }

    fn filter_comments(&self, source: &str) -> String {
        source
            .lines()
            .filter(|line| !self.matcher.has_directive(Directive::Comment, line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Normalize the kept lines of a cell, or a lone newline if none are left.
    fn handle_code_cell(&self, source: &str) -> String {
        let kept: Vec<&str> = source
            .lines()
            .filter(|line| !self.matcher.has_directive(Directive::Comment, line))
            .filter(|line| !line.starts_with([SHELL_ESCAPE, MAGIC_ESCAPE]))
            .collect();

        if kept.is_empty() {
            return "\n".to_string();
        }

        self.normalizer.normalize(&kept.join("\n"))
    }
}

/// Extract with the default extractor.
pub fn extract(cells: &[Cell]) -> String {
    CellExtractor::new().extract(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::NoopNormalizer;

    fn body(code: &str) -> &str {
        code.strip_prefix(HEADER).expect("output must start with the header")
    }

    fn code_cells(sources: &[&str]) -> Vec<Cell> {
        sources.iter().map(|s| Cell::code(*s)).collect()
    }

    #[test]
    fn test_header_only_for_empty_notebook() {
        assert_eq!(extract(&[]), HEADER);
        assert!(HEADER.starts_with("# Generated by funcport-core "));
        assert!(HEADER.ends_with('\n'));
    }

    #[test]
    fn test_plain_cells_in_order() {
        let cells = code_cells(&["a = 1", "b = 2\nc = 3"]);
        assert_eq!(body(&extract(&cells)), "a = 1\nb = 2\nc = 3\n");
    }

    #[test]
    fn test_non_code_cells_skipped() {
        let cells = vec![
            Cell::code("a = 1"),
            Cell::other("# mlrun: end-code"),
            Cell::other("# Title\nprose"),
            Cell::code("b = 2"),
        ];
        assert_eq!(body(&extract(&cells)), "a = 1\nb = 2\n");
    }

    #[test]
    fn test_ignore_cell() {
        let cells = code_cells(&["# mlrun: ignore\nx=1", "y=2"]);
        assert_eq!(body(&extract(&cells)), "y=2\n");
    }

    #[test]
    fn test_ignore_wins_over_other_directives() {
        let cells = code_cells(&["a=1", "# mlrun: ignore\n# mlrun: end-code\nx=1", "b=2"]);
        assert_eq!(body(&extract(&cells)), "a=1\nb=2\n");

        let cells = code_cells(&["a=1", "# nuclio: start-code\n# nuclio: ignore", "b=2"]);
        assert_eq!(body(&extract(&cells)), "a=1\nb=2\n");
    }

    #[test]
    fn test_start_code_discards_earlier_cells() {
        let cells = code_cells(&["a=1", "# mlrun: start-code", "b=2"]);
        assert_eq!(body(&extract(&cells)), "b=2\n");
    }

    #[test]
    fn test_start_code_cell_content_kept() {
        let cells = code_cells(&["a=1", "# nuclio: start-code\nimport os", "b=2"]);
        assert_eq!(body(&extract(&cells)), "import os\nb=2\n");
    }

    #[test]
    fn test_end_code_stops_extraction() {
        let cells = code_cells(&["c=1", "# mlrun: end-code", "d=2"]);
        assert_eq!(body(&extract(&cells)), "c=1\n");

        let cells = code_cells(&["c=1", "e=3\n# mlrun: end-code", "# mlrun: start-code", "d=2"]);
        assert_eq!(body(&extract(&cells)), "c=1\n");
    }

    #[test]
    fn test_shell_and_magic_lines_dropped() {
        let cells = code_cells(&["!pip install x\nimport x\n%matplotlib inline\nx.run()"]);
        assert_eq!(body(&extract(&cells)), "import x\nx.run()\n");
    }

    #[test]
    fn test_comment_lines_dropped() {
        let cells = code_cells(&["# setup\nx = 1  # keep trailing\n    # indented note\ny = 2"]);
        assert_eq!(body(&extract(&cells)), "x = 1  # keep trailing\ny = 2\n");
    }

    #[test]
    fn test_comment_only_cell_contributes_nothing() {
        let cells = code_cells(&["a=1", "# just a note\n\n# another", "b=2"]);
        assert_eq!(body(&extract(&cells)), "a=1\nb=2\n");
    }

    #[test]
    fn test_magic_only_cell_contributes_blank_line() {
        let cells = code_cells(&["a=1", "!ls\n%time", "b=2"]);
        assert_eq!(body(&extract(&cells)), "a=1\n\nb=2\n");
    }

    #[test]
    fn test_custom_keywords() {
        let matcher = DirectiveMatcher::new(["export"]).unwrap();
        let extractor = CellExtractor::with_matcher(matcher);
        let cells = code_cells(&["a=1", "# export: start-code", "b=2", "# mlrun: end-code", "c=3"]);
        assert_eq!(body(&extractor.extract(&cells)), "b=2\nc=3\n");
    }

    #[test]
    fn test_custom_normalizer() {
        let extractor = CellExtractor::new().with_normalizer(NoopNormalizer);
        let cells = code_cells(&["x = %time f()"]);
        assert_eq!(body(&extractor.extract(&cells)), "x = %time f()\n");

        let cells = code_cells(&["x = %time f()"]);
        assert_eq!(
            body(&extract(&cells)),
            "x = get_ipython().run_line_magic('time', 'f()')\n"
        );
    }

    #[test]
    fn test_extract_or_load_without_override() {
        let cells = code_cells(&["a=1"]);
        let code = CellExtractor::new().extract_or_load(&cells, None).unwrap();
        assert_eq!(body(&code), "a=1\n");
    }

    #[test]
    fn test_extract_or_load_missing_file() {
        let cells = code_cells(&["a=1"]);
        let err = CellExtractor::new()
            .extract_or_load(&cells, Some(Path::new("/nonexistent/handler.py")))
            .unwrap_err();
        assert!(matches!(err, Error::HandlerSource { .. }));
        assert!(err.to_string().contains("/nonexistent/handler.py"));
    }
}
