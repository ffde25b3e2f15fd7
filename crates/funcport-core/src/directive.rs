//! Directive recognition for notebook comments.
//!
//! Directives are written as ordinary comments inside code cells:
//!
//! ```text
//! # mlrun: ignore
//! # nuclio: start-code
//! # mlrun:end-code
//! ```
//!
//! Matching is a lexical scan, not a parse. A directive may appear anywhere in
//! the scanned text, after any surrounding code, and a misspelled directive is
//! simply not a directive.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

/// Namespace keywords recognized when no other set is configured.
pub const DEFAULT_KEYWORDS: &[&str] = &["mlrun", "nuclio"];

/// A line starting (after whitespace) with a comment marker.
static COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*#.*").expect("comment pattern must compile"));

static DEFAULT_MATCHER: Lazy<DirectiveMatcher> = Lazy::new(|| {
    DirectiveMatcher::new(DEFAULT_KEYWORDS.iter().copied())
        .expect("default directive patterns must compile")
});

/// The kinds of text the matcher can classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    /// Any comment line, directive or not.
    Comment,
    /// Leave the whole cell out of the export.
    Ignore,
    /// Drop everything collected so far and start collecting from this cell.
    StartCode,
    /// Stop collecting; this cell and all later cells are left out.
    EndCode,
}

impl Directive {
    /// Directives that carry a namespace keyword.
    pub const MACROS: [Directive; 3] = [Directive::Ignore, Directive::StartCode, Directive::EndCode];

    /// The keyword as written in notebook comments.
    pub fn as_str(&self) -> &'static str {
        match self {
            Directive::Comment => "comment",
            Directive::Ignore => "ignore",
            Directive::StartCode => "start-code",
            Directive::EndCode => "end-code",
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Directive {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "comment" => Ok(Directive::Comment),
            "ignore" => Ok(Directive::Ignore),
            "start-code" => Ok(Directive::StartCode),
            "end-code" => Ok(Directive::EndCode),
            other => Err(Error::UnknownDirective(other.to_string())),
        }
    }
}

/// Classifies lines and cell bodies by the directives they carry.
///
/// The matcher is immutable once built and can be shared freely across
/// threads.
#[derive(Debug, Clone)]
pub struct DirectiveMatcher {
    keywords: Vec<String>,
    ignore: Regex,
    start_code: Regex,
    end_code: Regex,
}

impl DirectiveMatcher {
    /// Build a matcher accepting the given namespace keywords.
    ///
    /// Keywords are matched literally and case-sensitively.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoKeywords`] for an empty keyword set and
    /// [`Error::InvalidPattern`] if a pattern cannot be compiled.
    pub fn new<I, S>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keywords: Vec<String> = keywords.into_iter().map(Into::into).collect();
        if keywords.is_empty() {
            return Err(Error::NoKeywords);
        }

        let alternation = keywords
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");
        let compile =
            |directive: Directive| Regex::new(&format!(r"#\s*({alternation}):\s*{directive}"));

        let [ignore, start_code, end_code] = Directive::MACROS.map(compile);

        Ok(Self {
            ignore: ignore?,
            start_code: start_code?,
            end_code: end_code?,
            keywords,
        })
    }

    /// The shared matcher for [`DEFAULT_KEYWORDS`].
    pub fn global() -> &'static DirectiveMatcher {
        &DEFAULT_MATCHER
    }

    /// Namespace keywords this matcher accepts.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Check whether `text` carries `directive`.
    ///
    /// For [`Directive::Comment`] the text must start with a comment marker
    /// (leading whitespace allowed). For the other kinds the directive may
    /// appear anywhere in `text`, which can be a single line or a whole cell.
    pub fn has_directive(&self, directive: Directive, text: &str) -> bool {
        match directive {
            Directive::Comment => COMMENT_RE.is_match(text),
            Directive::Ignore => self.ignore.is_match(text),
            Directive::StartCode => self.start_code.is_match(text),
            Directive::EndCode => self.end_code.is_match(text),
        }
    }

    /// Like [`has_directive`](Self::has_directive), with the kind given by
    /// name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownDirective`] for a name outside the recognized
    /// set.
    pub fn has_directive_named(&self, kind: &str, text: &str) -> Result<bool> {
        let directive = kind.parse()?;
        Ok(self.has_directive(directive, text))
    }
}

impl Default for DirectiveMatcher {
    fn default() -> Self {
        DEFAULT_MATCHER.clone()
    }
}

/// Check `text` for `directive` using the default namespace keywords.
pub fn has_directive(directive: Directive, text: &str) -> bool {
    DEFAULT_MATCHER.has_directive(directive, text)
}
