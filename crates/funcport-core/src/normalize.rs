//! Rewriting interactive-shell syntax into plain Python source.
//!
//! Notebook cells may contain syntax that only the interactive shell
//! understands: shell escapes bound to variables, line magics, help queries,
//! pasted prompts. The extractor already drops lines that start with `!` or
//! `%`; whatever is left goes through a [`SourceNormalizer`] so the exported
//! file is importable by a plain interpreter.

use once_cell::sync::Lazy;
use regex::Regex;

/// Turns interactive cell text into plain source.
///
/// Implementations must return text ending in a newline.
pub trait SourceNormalizer {
    fn normalize(&self, source: &str) -> String;
}

/// Leaves the text alone apart from the trailing newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNormalizer;

impl SourceNormalizer for NoopNormalizer {
    fn normalize(&self, source: &str) -> String {
        let mut out = source.to_string();
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}

/// Rewrites IPython syntax into calls on `get_ipython()`.
///
/// Cleanup runs on the whole cell (leading blank lines, pasted prompts,
/// common indentation of the first line). After that only lines that begin
/// a statement are rewritten. Lines continuing an open bracket, a
/// triple-quoted string or a backslash continuation pass through untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct IPythonNormalizer;

static CLASSIC_PROMPT_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^>>>( |$)").expect("classic prompt pattern must compile"));
static CLASSIC_PROMPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(>>>|\.\.\.)( |$)").expect("classic prompt pattern must compile"));
static IPYTHON_PROMPT_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^In \[\d+\]: ").expect("ipython prompt pattern must compile"));
static IPYTHON_PROMPT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(In \[\d+\]: |\s*\.{3,}: ?)").expect("ipython prompt pattern must compile")
});

/// `targets = !command` or `targets = %magic args`
static ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)([A-Za-z_][\w.]*(?:\s*,\s*[A-Za-z_][\w.]*)*)\s*=\s*([!%])(.*)$")
        .expect("assignment pattern must compile")
});

/// `!command`, `!!command`, `%magic args`
static ESCAPED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\s*)(!!|!|%)([^%].*)$").expect("escape pattern must compile"));

/// `name?`, `name??`, `?name`, `??name`
static HELP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*)(\?{1,2})?([A-Za-z_][\w.]*)(\?{1,2})?\s*$").expect("help pattern must compile")
});

impl SourceNormalizer for IPythonNormalizer {
    fn normalize(&self, source: &str) -> String {
        let lines: Vec<&str> = source
            .lines()
            .skip_while(|line| line.trim().is_empty())
            .collect();

        let lines = strip_prompts(lines);
        let lines = strip_leading_indent(lines);

        let mut out = String::with_capacity(source.len() + 1);
        let mut logical = LogicalLines::default();
        for line in &lines {
            match logical.at_statement_start().then(|| transform_line(line)).flatten() {
                Some(rewritten) => out.push_str(&rewritten),
                None => {
                    logical.feed(line);
                    out.push_str(line);
                }
            }
            out.push('\n');
        }
        if out.is_empty() {
            out.push('\n');
        }
        out
    }
}

/// Remove `>>> ` / `In [1]: ` prompts when the first line starts with one or
/// the second line carries a prompt.
fn strip_prompts(lines: Vec<&str>) -> Vec<&str> {
    let Some(first) = lines.first() else {
        return lines;
    };
    let pasted = |start: &Regex, prompt: &Regex| {
        start.is_match(first) || lines.get(1).is_some_and(|second| prompt.is_match(second))
    };

    let prompt = if pasted(&CLASSIC_PROMPT_START, &CLASSIC_PROMPT) {
        &*CLASSIC_PROMPT
    } else if pasted(&IPYTHON_PROMPT_START, &IPYTHON_PROMPT) {
        &*IPYTHON_PROMPT
    } else {
        return lines;
    };

    lines
        .into_iter()
        .map(|line| match prompt.find(line) {
            Some(m) => &line[m.end()..],
            None => line,
        })
        .collect()
}

/// Dedent by the first line's indentation, where lines carry it.
fn strip_leading_indent(lines: Vec<&str>) -> Vec<&str> {
    let Some(first) = lines.first() else {
        return lines;
    };

    let indent_len = first.len() - first.trim_start().len();
    if indent_len == 0 {
        return lines;
    }
    let prefix = first[..indent_len].to_string();

    lines
        .into_iter()
        .map(|line| line.strip_prefix(prefix.as_str()).unwrap_or(line))
        .collect()
}

/// Tracks whether the next physical line starts a new statement.
#[derive(Debug, Default)]
struct LogicalLines {
    /// Open `(`, `[` and `{` brackets.
    depth: usize,
    /// Delimiter of an unterminated triple-quoted string.
    open_string: Option<&'static [u8]>,
    /// The previous line ended with a backslash.
    continued: bool,
}

impl LogicalLines {
    fn at_statement_start(&self) -> bool {
        self.depth == 0 && self.open_string.is_none() && !self.continued
    }

    /// Advance past one physical line of plain Python.
    fn feed(&mut self, line: &str) {
        let bytes = line.as_bytes();
        let mut i = 0;
        self.continued = false;

        while i < bytes.len() {
            if let Some(delim) = self.open_string {
                if bytes[i] == b'\\' {
                    i += 2;
                } else if bytes[i..].starts_with(delim) {
                    self.open_string = None;
                    i += delim.len();
                } else {
                    i += 1;
                }
                continue;
            }

            match bytes[i] {
                b'#' => break,
                b'\\' if i + 1 == bytes.len() => {
                    self.continued = true;
                    i += 1;
                }
                b'(' | b'[' | b'{' => {
                    self.depth += 1;
                    i += 1;
                }
                b')' | b']' | b'}' => {
                    self.depth = self.depth.saturating_sub(1);
                    i += 1;
                }
                quote @ (b'\'' | b'"') => {
                    let triple: &'static [u8] = if quote == b'"' { b"\"\"\"" } else { b"'''" };
                    if bytes[i..].starts_with(triple) {
                        self.open_string = Some(triple);
                        i += triple.len();
                    } else {
                        i = self.skip_string(bytes, i);
                    }
                }
                _ => i += 1,
            }
        }
    }

    /// Skip a single-quoted string starting at `start`, returning the index
    /// after its closing quote.
    fn skip_string(&mut self, bytes: &[u8], start: usize) -> usize {
        let quote = bytes[start];
        let mut i = start + 1;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' if i + 1 == bytes.len() => {
                    self.continued = true;
                    return bytes.len();
                }
                b'\\' => i += 2,
                b if b == quote => return i + 1,
                _ => i += 1,
            }
        }
        bytes.len()
    }
}

/// Rewrite one statement-leading line, or `None` when it is plain Python.
fn transform_line(line: &str) -> Option<String> {
    if let Some(caps) = ASSIGNMENT.captures(line) {
        let (indent, targets, escape, rest) = (&caps[1], &caps[2], &caps[3], &caps[4]);
        let call = if escape == "!" {
            getoutput(rest)
        } else {
            line_magic(rest)
        };
        return Some(format!("{indent}{targets} = {call}"));
    }

    if let Some(caps) = ESCAPED.captures(line) {
        let (indent, escape, rest) = (&caps[1], &caps[2], &caps[3]);
        let call = match escape {
            "!!" => getoutput(rest),
            "!" => format!("get_ipython().system({})", py_repr(rest)),
            _ => line_magic(rest),
        };
        return Some(format!("{indent}{call}"));
    }

    if let Some(caps) = HELP.captures(line) {
        let prefix = caps.get(2).map_or("", |m| m.as_str());
        let suffix = caps.get(4).map_or("", |m| m.as_str());
        if prefix.is_empty() != suffix.is_empty() {
            let magic = if prefix.len() + suffix.len() == 2 {
                "pinfo2"
            } else {
                "pinfo"
            };
            return Some(format!(
                "{}get_ipython().run_line_magic({}, {})",
                &caps[1],
                py_repr(magic),
                py_repr(&caps[3])
            ));
        }
    }

    None
}

fn getoutput(command: &str) -> String {
    format!("get_ipython().getoutput({})", py_repr(command))
}

fn line_magic(content: &str) -> String {
    let (name, args) = content.split_once(' ').unwrap_or((content, ""));
    format!(
        "get_ipython().run_line_magic({}, {})",
        py_repr(name),
        py_repr(args)
    )
}

/// Quote `s` the way Python's `repr` quotes a `str`.
pub fn py_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(source: &str) -> String {
        IPythonNormalizer.normalize(source)
    }

    #[test]
    fn test_plain_code_unchanged() {
        assert_eq!(normalize("x = 1\nprint(x)"), "x = 1\nprint(x)\n");
        assert_eq!(normalize("if a != b:\n    pass"), "if a != b:\n    pass\n");
    }

    #[test]
    fn test_leading_blank_lines_removed() {
        assert_eq!(normalize("\n  \nx = 1"), "x = 1\n");
    }

    #[test]
    fn test_assign_from_system() {
        assert_eq!(
            normalize("files = !ls -la"),
            "files = get_ipython().getoutput('ls -la')\n"
        );
    }

    #[test]
    fn test_assign_from_magic() {
        assert_eq!(
            normalize("t = %timeit -o sum(range(10))"),
            "t = get_ipython().run_line_magic('timeit', '-o sum(range(10))')\n"
        );
    }

    #[test]
    fn test_indented_escapes() {
        let source = "for i in range(3):\n    !echo {i}\n    %time f(i)\n    !!date";
        assert_eq!(
            normalize(source),
            "for i in range(3):\n    \
             get_ipython().system('echo {i}')\n    \
             get_ipython().run_line_magic('time', 'f(i)')\n    \
             get_ipython().getoutput('date')\n"
        );
    }

    #[test]
    fn test_help_queries() {
        assert_eq!(
            normalize("np.array?"),
            "get_ipython().run_line_magic('pinfo', 'np.array')\n"
        );
        assert_eq!(
            normalize("??len"),
            "get_ipython().run_line_magic('pinfo2', 'len')\n"
        );
        // A bare name is not a help query.
        assert_eq!(normalize("value"), "value\n");
    }

    #[test]
    fn test_prompts_stripped() {
        assert_eq!(normalize(">>> x = 1\n... y = 2"), "x = 1\ny = 2\n");
        assert_eq!(normalize("In [3]: x = 1\n   ...: y = 2"), "x = 1\ny = 2\n");
        // A prompt on the second line marks the cell as pasted too.
        assert_eq!(normalize("x = 1\n>>> y"), "x = 1\ny\n");
        assert_eq!(normalize("x = 1\n   ...: y"), "x = 1\ny\n");
        // Later lines alone do not.
        assert_eq!(normalize("x = 1\ny = 2\n>>> z"), "x = 1\ny = 2\n>>> z\n");
    }

    #[test]
    fn test_bracket_continuations_unchanged() {
        let comparison = "if (\n    a\n    != b\n):\n    pass";
        assert_eq!(normalize(comparison), format!("{comparison}\n"));

        let formatting = "message = (\n    \"Processed %d rows\"\n    % (count,)\n)";
        assert_eq!(normalize(formatting), format!("{formatting}\n"));

        // Closing brackets inside strings do not end the continuation.
        let nested = "call(\")\",\n    % x)\n!ls";
        assert_eq!(normalize(nested), "call(\")\",\n    % x)\nget_ipython().system('ls')\n");
    }

    #[test]
    fn test_docstring_lines_unchanged() {
        let source = "def ask():\n    \"\"\"Ask once.\n\n    Really?\n    %done\n    \"\"\"\n    return input()";
        assert_eq!(normalize(source), format!("{source}\n"));

        let single = "doc = '''\nvalue?\n'''\nvalue?";
        assert_eq!(
            normalize(single),
            "doc = '''\nvalue?\n'''\nget_ipython().run_line_magic('pinfo', 'value')\n"
        );
    }

    #[test]
    fn test_backslash_continuation_unchanged() {
        let source = "total = a + \\\n    !b";
        assert_eq!(normalize(source), format!("{source}\n"));
        // A comment ending in a backslash does not continue the line.
        assert_eq!(
            normalize("x = 1  # path\\\n!ls"),
            "x = 1  # path\\\nget_ipython().system('ls')\n"
        );
    }

    #[test]
    fn test_first_line_indent_removed() {
        assert_eq!(normalize("    x = 1\n    y = 2"), "x = 1\ny = 2\n");
        assert_eq!(normalize("  x = 1\ny = 2"), "x = 1\ny = 2\n");
    }

    #[test]
    fn test_py_repr_quoting() {
        assert_eq!(py_repr("ls"), "'ls'");
        assert_eq!(py_repr("it's"), "\"it's\"");
        assert_eq!(py_repr("say \"it's\""), "'say \"it\\'s\"'");
        assert_eq!(py_repr("a\\b"), "'a\\\\b'");
        assert_eq!(py_repr("tab\there"), "'tab\\there'");
    }

    #[test]
    fn test_noop_adds_newline_once() {
        assert_eq!(NoopNormalizer.normalize("x"), "x\n");
        assert_eq!(NoopNormalizer.normalize("x\n"), "x\n");
    }
}
