//! Attributed source lines.
//!
//! Every line handed to the block parser remembers where it came from: a
//! source identifier and a zero-based line offset. Diagnostics raised while
//! parsing are reported against that origin, so text generated by a
//! directive can still point back at the file it was extracted from.

use std::ops::Range;

use crate::node::SourceLocation;

/// Default tab width used when expanding tabs.
pub const DEFAULT_TAB_WIDTH: usize = 8;

/// A single line of input with its origin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLine {
    /// Line text without the line terminator.
    pub text: String,
    /// Source identifier (a file path, or a composite description).
    pub source: String,
    /// Zero-based line offset within `source`.
    pub offset: usize,
}

impl SourceLine {
    /// Whether the line contains only whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Number of leading spaces.
    #[must_use]
    pub fn indent(&self) -> usize {
        self.text.len() - self.text.trim_start_matches(' ').len()
    }

    /// One-based location of this line.
    #[must_use]
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.source.clone(), self.offset.saturating_add(1))
    }
}

/// An ordered list of attributed lines.
///
/// # Example
///
/// ```
/// use kdoc_renderer::StringList;
///
/// let mut lines = StringList::new();
/// lines.push("Hello", "drivers/foo.c", 41);
/// assert_eq!(lines.len(), 1);
/// assert_eq!(lines.location(0).unwrap().to_string(), "drivers/foo.c:42");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StringList {
    lines: Vec<SourceLine>,
}

impl StringList {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Split `text` into lines attributed to `source`, starting at offset 0.
    #[must_use]
    pub fn from_text(text: &str, source: &str, tab_width: usize) -> Self {
        let lines = string_to_lines(text, tab_width)
            .into_iter()
            .enumerate()
            .map(|(offset, text)| SourceLine {
                text,
                source: source.to_owned(),
                offset,
            })
            .collect();
        Self { lines }
    }

    /// Append a line.
    pub fn push(&mut self, text: impl Into<String>, source: impl Into<String>, offset: usize) {
        self.lines.push(SourceLine {
            text: text.into(),
            source: source.into(),
            offset,
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SourceLine> {
        self.lines.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SourceLine> {
        self.lines.iter()
    }

    /// Borrow the underlying lines.
    #[must_use]
    pub fn lines(&self) -> &[SourceLine] {
        &self.lines
    }

    /// One-based location of the line at `index`.
    #[must_use]
    pub fn location(&self, index: usize) -> Option<SourceLocation> {
        self.lines.get(index).map(SourceLine::location)
    }

    /// Copy a range of lines into a new list, keeping their attribution.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> Self {
        Self {
            lines: self.lines[range].to_vec(),
        }
    }

    /// Iterate over the line texts.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.text.as_str())
    }
}

impl From<Vec<SourceLine>> for StringList {
    fn from(lines: Vec<SourceLine>) -> Self {
        Self { lines }
    }
}

impl<'a> IntoIterator for &'a StringList {
    type Item = &'a SourceLine;
    type IntoIter = std::slice::Iter<'a, SourceLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

/// Split text into lines the way the parser expects them.
///
/// Vertical tabs and form feeds become spaces, lines are split on `\n`,
/// `\r\n`, `\r` and the other Unicode line boundaries, tabs are expanded to
/// `tab_width` columns, and trailing whitespace is removed. A trailing line
/// terminator does not produce an extra empty line.
///
/// ```
/// use kdoc_renderer::string_to_lines;
///
/// assert_eq!(string_to_lines("a\tb\r\nc  \n", 4), vec!["a   b", "c"]);
/// ```
#[must_use]
pub fn string_to_lines(text: &str, tab_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                lines.push(finish_line(&current, tab_width));
                current.clear();
            }
            '\n' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}' | '\u{2028}' | '\u{2029}' => {
                lines.push(finish_line(&current, tab_width));
                current.clear();
            }
            '\u{0b}' | '\u{0c}' => current.push(' '),
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        lines.push(finish_line(&current, tab_width));
    }

    lines
}

fn finish_line(line: &str, tab_width: usize) -> String {
    let mut expanded = expand_tabs(line, tab_width);
    expanded.truncate(expanded.trim_end().len());
    expanded
}

/// Expand tabs to the next multiple of `tab_width` columns.
///
/// A width of zero removes tabs.
fn expand_tabs(line: &str, tab_width: usize) -> String {
    if !line.contains('\t') {
        return line.to_owned();
    }

    let mut out = String::with_capacity(line.len() + tab_width);
    let mut column = 0;
    for c in line.chars() {
        if c == '\t' {
            if tab_width > 0 {
                let pad = tab_width - column % tab_width;
                out.extend(std::iter::repeat_n(' ', pad));
                column += pad;
            }
        } else {
            out.push(c);
            column += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_split_mixed_terminators() {
        assert_eq!(string_to_lines("a\nb\r\nc\rd", 8), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_trailing_newline_has_no_empty_line() {
        assert_eq!(string_to_lines("a\n", 8), vec!["a"]);
        assert_eq!(string_to_lines("a\n\n", 8), vec!["a", ""]);
        assert!(string_to_lines("", 8).is_empty());
    }

    #[test]
    fn test_blank_lines_kept() {
        assert_eq!(string_to_lines("a\n\nb", 8), vec!["a", "", "b"]);
    }

    #[test]
    fn test_tab_expansion_is_column_aware() {
        assert_eq!(string_to_lines("\tx", 8), vec!["        x"]);
        assert_eq!(string_to_lines("ab\tx", 4), vec!["ab  x"]);
        assert_eq!(string_to_lines("abcd\tx", 4), vec!["abcd    x"]);
    }

    #[test]
    fn test_zero_tab_width_removes_tabs() {
        assert_eq!(string_to_lines("a\tb", 0), vec!["ab"]);
    }

    #[test]
    fn test_whitespace_conversion() {
        assert_eq!(string_to_lines("a\u{0b}b\u{0c}c", 8), vec!["a b c"]);
    }

    #[test]
    fn test_trailing_whitespace_stripped() {
        assert_eq!(string_to_lines("text   \t\n", 8), vec!["text"]);
    }

    #[test]
    fn test_from_text_attribution() {
        let list = StringList::from_text("one\ntwo\n", "doc.rst", 8);
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(1).unwrap().offset, 1);
        assert_eq!(list.get(1).unwrap().source, "doc.rst");
        assert_eq!(list.location(1).unwrap().line, 2);
    }

    #[test]
    fn test_slice_keeps_offsets() {
        let list = StringList::from_text("a\nb\nc\n", "doc.rst", 8);
        let tail = list.slice(1..3);
        assert_eq!(tail.texts().collect::<Vec<_>>(), vec!["b", "c"]);
        assert_eq!(tail.get(0).unwrap().offset, 1);
    }

    #[test]
    fn test_indent() {
        let line = SourceLine {
            text: "   x".to_owned(),
            source: String::new(),
            offset: 0,
        };
        assert_eq!(line.indent(), 3);
        assert!(!line.is_blank());
    }
}
