//! Directive block syntax.
//!
//! Parses the `.. name:: argument` marker line and the `:key: value` option
//! list at the start of a directive body.

use std::sync::LazyLock;

use regex::Regex;

use crate::source::SourceLine;

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.\.\s+([A-Za-z0-9][\w:.+-]*?)::(?:\s+(.*))?$").unwrap());

static OPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:([^:\s][^:]*):(?:\s+(.*))?$").unwrap());

/// Name and argument text of a directive marker line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Marker<'a> {
    pub name: &'a str,
    pub argument: &'a str,
}

/// Parse a directive marker: `.. name:: argument`.
///
/// Returns `None` for comments and other explicit markup.
pub(crate) fn parse_marker(line: &str) -> Option<Marker<'_>> {
    let caps = MARKER_RE.captures(line)?;
    let name = caps.get(1)?.as_str();
    let argument = caps.get(2).map_or("", |m| m.as_str().trim());
    Some(Marker { name, argument })
}

/// Split a dedented directive body into options and the index where the
/// content starts.
///
/// Options must come first. Lines indented deeper than the option name
/// continue the previous value and are joined with a newline.
pub(crate) fn split_options(body: &[SourceLine]) -> (Vec<(String, String)>, usize) {
    let mut options: Vec<(String, String)> = Vec::new();
    let mut idx = 0;

    while let Some(line) = body.get(idx) {
        if line.is_blank() {
            break;
        }

        if line.indent() == 0 {
            let Some(caps) = OPTION_RE.captures(&line.text) else {
                break;
            };
            let name = caps.get(1).map_or("", |m| m.as_str()).trim();
            let value = caps.get(2).map_or("", |m| m.as_str()).trim();
            options.push((name.to_owned(), value.to_owned()));
        } else if let Some((_, value)) = options.last_mut() {
            let continuation = line.text.trim();
            if !value.is_empty() {
                value.push('\n');
            }
            value.push_str(continuation);
        } else {
            break;
        }

        idx += 1;
    }

    while body.get(idx).is_some_and(SourceLine::is_blank) {
        idx += 1;
    }

    (options, idx)
}
