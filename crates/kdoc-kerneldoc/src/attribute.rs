//! Source attribution of the tool's output.
//!
//! With `-enable-lineno` the tool writes `.. LINENO <n>` lines before each
//! block it emits. The markers are removed and every other line is tagged
//! with its line in the target file, so that problems in the generated text
//! are reported against the C source.

use std::sync::LazyLock;

use kdoc_renderer::{StringList, string_to_lines};
use regex::Regex;

static LINENO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\.\. LINENO ([0-9]+)$").unwrap());

/// Source label for generated lines: `<srcdir>/<docname>:<lineno>: <target>`.
#[must_use]
pub fn output_source(doc: &str, lineno: usize, target: &str) -> String {
    format!("{doc}:{lineno}: {target}")
}

/// Split tool output into lines attributed to `source`.
///
/// Offsets are zero-based. A marker sets the offset of the next line to
/// `n - 1`; the offset then advances by one per line.
///
/// ```
/// use kdoc_kerneldoc::attribute_output;
///
/// let lines = attribute_output(".. LINENO 5\nfoo\nbar\n", "doc:1: foo.c", 8);
/// let offsets: Vec<_> = lines.iter().map(|l| l.offset).collect();
/// assert_eq!(offsets, [4, 5]);
/// ```
#[must_use]
pub fn attribute_output(output: &str, source: &str, tab_width: usize) -> StringList {
    let mut result = StringList::new();
    let mut offset = 0usize;

    for line in string_to_lines(output, tab_width) {
        if let Some(caps) = LINENO_RE.captures(&line) {
            let digits = &caps[1];
            let lineno = digits.parse::<usize>().unwrap_or_else(|_| {
                tracing::debug!(lineno = digits, "LINENO out of range, clamping");
                usize::MAX
            });
            offset = lineno.saturating_sub(1);
            continue;
        }
        result.push(line, source, offset);
        offset = offset.saturating_add(1);
    }

    result
}
