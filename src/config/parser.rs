//! Line-oriented parser for the restricted `.local-overrides.yaml` grammar.
//!
//! Only this subset is understood:
//!
//! ```yaml
//! pattern: .local
//! files:
//!   - override: AGENTS.local.md
//!     replaces:
//!       - AGENTS.md
//!       - CLAUDE.md
//! ```
//!
//! The input is first tokenized into [`Line`]s, then driven through a
//! three-state machine (`Top`, `InFiles`, `InReplaces`).  Lines the machine
//! cannot place are skipped and reported as warnings rather than failing the
//! whole parse.

use super::validation::ValidationWarning;

/// One `- override:` entry as written, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// Line number (1-based) of the `- override:` line.
    pub line: usize,
    /// The override path, unquoted.
    pub override_path: String,
    /// Targets in the order they were listed, possibly with repeats.
    pub targets: Vec<String>,
}

/// Parser output handed to [`validate`](super::validation::validate).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RawDocument {
    /// Value of the top-level `pattern:` key, if present.
    pub pattern: Option<String>,
    /// `files:` entries in file order.
    pub entries: Vec<RawEntry>,
    /// Lines that were skipped, with the reason.
    pub warnings: Vec<ValidationWarning>,
}

/// Classified content of a non-blank, non-comment line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind<'a> {
    /// `key:` or `key: value`.
    Key { key: &'a str, value: &'a str },
    /// `- text`
    Item(&'a str),
    /// Anything else.
    Other(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Line<'a> {
    number: usize,
    indent: usize,
    kind: LineKind<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Top,
    InFiles,
    InReplaces,
}

/// Split `content` into classified lines, dropping blanks and comments.
fn tokenize(content: &str) -> Vec<Line<'_>> {
    content
        .lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return None;
            }
            let indent = raw.len() - raw.trim_start().len();
            let kind = if trimmed == "-" {
                LineKind::Item("")
            } else if let Some(rest) = trimmed.strip_prefix("- ") {
                LineKind::Item(rest.trim())
            } else if let Some((key, value)) = split_key(trimmed) {
                LineKind::Key { key, value }
            } else {
                LineKind::Other(trimmed)
            };
            Some(Line {
                number: idx + 1,
                indent,
                kind,
            })
        })
        .collect()
}

/// Split `key: value` where `key` is a bare word.
fn split_key(text: &str) -> Option<(&str, &str)> {
    let (key, value) = text.split_once(':')?;
    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }
    if !(value.is_empty() || value.starts_with(char::is_whitespace)) {
        return None;
    }
    Some((key, value.trim()))
}

/// Trim a scalar, strip one layer of matching quotes, and drop a trailing
/// ` # comment`.
///
/// A comment only starts after the closing quote, so `#` inside quotes is
/// part of the value.
///
/// # Examples
///
/// ```
/// use local_overrides::config::parser::clean_value;
///
/// assert_eq!(clean_value("  \"AGENTS.md\" "), "AGENTS.md");
/// assert_eq!(clean_value("'a # b'"), "a # b");
/// assert_eq!(clean_value("'AGENTS.md' # mine"), "AGENTS.md");
/// assert_eq!(clean_value("AGENTS.md  # personal"), "AGENTS.md");
/// assert_eq!(clean_value("# only a comment"), "");
/// ```
#[must_use]
pub fn clean_value(raw: &str) -> String {
    let value = raw.trim();
    if value.starts_with('#') {
        return String::new();
    }
    for quote in ['"', '\''] {
        if let Some((inner, tail)) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.split_once(quote))
            && is_blank_or_comment(tail)
        {
            return inner.to_string();
        }
    }
    strip_inline_comment(value).to_string()
}

/// Whether the text after a closing quote is empty or a ` # comment`.
fn is_blank_or_comment(tail: &str) -> bool {
    let rest = tail.trim_start();
    rest.is_empty() || (rest.starts_with('#') && rest.len() < tail.len())
}

/// Strip inline comments (`#` preceded by whitespace) from a value.
fn strip_inline_comment(value: &str) -> &str {
    value
        .find(" #")
        .or_else(|| value.find("\t#"))
        .map_or(value, |idx| value.split_at(idx).0.trim_end())
}

/// Parser state carried across lines.
#[derive(Debug)]
struct Machine {
    state: State,
    /// Indentation of the `- override:` items, fixed by the first one seen.
    files_indent: Option<usize>,
    current: Option<RawEntry>,
    doc: RawDocument,
}

impl Machine {
    const fn new() -> Self {
        Self {
            state: State::Top,
            files_indent: None,
            current: None,
            doc: RawDocument {
                pattern: None,
                entries: Vec::new(),
                warnings: Vec::new(),
            },
        }
    }

    fn skip(&mut self, line: &Line<'_>, item: &str, message: &str) {
        self.doc
            .warnings
            .push(ValidationWarning::at_line(line.number, item, message));
    }

    fn finish_entry(&mut self) {
        if let Some(entry) = self.current.take() {
            self.doc.entries.push(entry);
        }
    }

    fn feed(&mut self, line: &Line<'_>) {
        if line.indent == 0
            && let LineKind::Key { key, value } = line.kind
        {
            self.finish_entry();
            self.state = State::Top;
            self.top_level_key(line, key, value);
            return;
        }

        match self.state {
            State::Top => {
                // Indented lines under an unrecognised top-level key belong
                // to that key and are ignored with it.
                if line.indent == 0 {
                    self.skip(line, text_of(line.kind), "unexpected line at top level");
                }
            }
            State::InFiles | State::InReplaces => self.files_line(line),
        }
    }

    fn top_level_key(&mut self, line: &Line<'_>, key: &str, value: &str) {
        match key {
            "pattern" => self.doc.pattern = Some(clean_value(value)),
            "files" => {
                self.state = State::InFiles;
                self.files_indent = None;
                let value = clean_value(value);
                if !(value.is_empty() || value == "[]") {
                    self.skip(line, &value, "inline `files:` values are not supported");
                }
            }
            other => self.skip(line, other, "unknown top-level key ignored"),
        }
    }

    fn files_line(&mut self, line: &Line<'_>) {
        match line.kind {
            LineKind::Item(text) => {
                if let Some(rest) = text.strip_prefix("override:") {
                    self.override_item(line, rest);
                } else if self.state == State::InReplaces && self.is_nested(line) {
                    let target = clean_value(text);
                    if target.is_empty() {
                        self.skip(line, text, "empty target path");
                    } else if let Some(entry) = self.current.as_mut() {
                        entry.targets.push(target);
                    }
                } else {
                    self.skip(line, text, "list entry is not `- override: <path>`");
                }
            }
            LineKind::Key { key: "replaces", value } => {
                if self.current.is_none() || !self.is_nested(line) {
                    self.skip(line, "replaces", "`replaces:` without a preceding `- override:`");
                } else if !clean_value(value).is_empty() {
                    self.state = State::InFiles;
                    self.skip(line, value, "`replaces:` must be followed by a list");
                } else {
                    self.state = State::InReplaces;
                }
            }
            LineKind::Key { key, .. } => {
                self.skip(line, key, "unknown key ignored");
            }
            LineKind::Other(text) => self.skip(line, text, "unparseable line"),
        }
    }

    fn override_item(&mut self, line: &Line<'_>, rest: &str) {
        let files_indent = *self.files_indent.get_or_insert(line.indent);
        if line.indent != files_indent {
            self.skip(
                line,
                rest.trim(),
                "`- override:` is not aligned with the other entries",
            );
            return;
        }
        self.finish_entry();
        self.state = State::InFiles;
        let override_path = clean_value(rest);
        if override_path.is_empty() {
            self.skip(line, "override", "empty override path");
            return;
        }
        self.current = Some(RawEntry {
            line: line.number,
            override_path,
            targets: Vec::new(),
        });
    }

    /// Whether `line` is indented under the current `- override:` item.
    fn is_nested(&self, line: &Line<'_>) -> bool {
        self.files_indent.is_some_and(|indent| line.indent > indent)
    }

    fn finish(mut self) -> RawDocument {
        self.finish_entry();
        self.doc
    }
}

const fn text_of<'a>(kind: LineKind<'a>) -> &'a str {
    match kind {
        LineKind::Key { key, .. } => key,
        LineKind::Item(text) | LineKind::Other(text) => text,
    }
}

/// Parse config text into a [`RawDocument`].
///
/// Never fails: lines that do not fit the grammar are skipped and recorded
/// in [`RawDocument::warnings`].  Structural rules (required pattern,
/// duplicate targets) are enforced afterwards by
/// [`validate`](super::validation::validate).
#[must_use]
pub fn parse(content: &str) -> RawDocument {
    let mut machine = Machine::new();
    for line in tokenize(content) {
        machine.feed(&line);
    }
    machine.finish()
}
