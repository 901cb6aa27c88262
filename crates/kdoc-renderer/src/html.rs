//! HTML rendering of document nodes.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;

use crate::node::Node;

static LITERAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"``([^`]+)``").unwrap());
static STRONG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static EMPHASIS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*\s][^*]*)\*").unwrap());

/// Render nodes to an HTML fragment.
///
/// Top-level sections get `<h1>`, nested ones the next level down, capped at
/// `<h6>`. Comments are dropped.
///
/// ```
/// use kdoc_renderer::{Node, render_nodes};
///
/// let html = render_nodes(&[Node::paragraph("a < b")]);
/// assert_eq!(html, "<p>a &lt; b</p>\n");
/// ```
#[must_use]
pub fn render_nodes(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        render_node(&mut out, node, 1);
    }
    out
}

fn render_node(out: &mut String, node: &Node, level: usize) {
    match node {
        Node::Section {
            title, children, ..
        } => {
            let Some(title) = title else {
                for child in children {
                    render_node(out, child, level);
                }
                return;
            };
            let h = level.min(6);
            let _ = writeln!(out, r#"<section id="{}">"#, escape_html(&slugify(title)));
            let _ = writeln!(out, "<h{h}>{}</h{h}>", render_inline(title));
            for child in children {
                render_node(out, child, level + 1);
            }
            out.push_str("</section>\n");
        }
        Node::Paragraph { text, .. } => {
            let _ = writeln!(out, "<p>{}</p>", render_inline(text));
        }
        Node::LiteralBlock { text, .. } => {
            let _ = writeln!(out, "<pre><code>{}</code></pre>", escape_html(text));
        }
        Node::BlockQuote { children, .. } => {
            out.push_str("<blockquote>\n");
            for child in children {
                render_node(out, child, level);
            }
            out.push_str("</blockquote>\n");
        }
        Node::DefinitionList { items } => {
            out.push_str("<dl>\n");
            for item in items {
                let _ = writeln!(out, "<dt>{}</dt>", render_inline(&item.term));
                out.push_str("<dd>\n");
                for child in &item.children {
                    render_node(out, child, level);
                }
                out.push_str("</dd>\n");
            }
            out.push_str("</dl>\n");
        }
        Node::Directive { name, children, .. } => {
            let _ = writeln!(out, r#"<div class="directive {}">"#, escape_html(name));
            for child in children {
                render_node(out, child, level);
            }
            out.push_str("</div>\n");
        }
        Node::Comment { .. } => {}
        Node::Error { children } => {
            out.push_str("<div class=\"system-message error\">\n");
            for child in children {
                render_node(out, child, level);
            }
            out.push_str("</div>\n");
        }
    }
}

/// Escape text and convert ``literal``, **strong** and *emphasis* markup.
fn render_inline(text: &str) -> String {
    let escaped = escape_html(text);
    let with_code = LITERAL_RE.replace_all(&escaped, "<code>$1</code>");
    let with_strong = STRONG_RE.replace_all(&with_code, "<strong>$1</strong>");
    EMPHASIS_RE
        .replace_all(&with_strong, "<em>$1</em>")
        .into_owned()
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Convert a title to an anchor id.
fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true;

    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::DefinitionItem;
    use pretty_assertions::assert_eq;

    fn titled(title: &str, children: Vec<Node>) -> Node {
        Node::Section {
            title: Some(title.to_owned()),
            location: None,
            children,
        }
    }

    #[test]
    fn test_nested_sections() {
        let nodes = vec![titled(
            "Driver API",
            vec![titled("Init", vec![Node::paragraph("Call it once.")])],
        )];
        assert_eq!(
            render_nodes(&nodes),
            "<section id=\"driver-api\">\n<h1>Driver API</h1>\n\
             <section id=\"init\">\n<h2>Init</h2>\n<p>Call it once.</p>\n\
             </section>\n</section>\n"
        );
    }

    #[test]
    fn test_inline_markup() {
        assert_eq!(
            render_inline("``foo()`` returns **zero** or *negative*"),
            "<code>foo()</code> returns <strong>zero</strong> or <em>negative</em>"
        );
    }

    #[test]
    fn test_literal_block_is_escaped_verbatim() {
        let nodes = vec![Node::LiteralBlock {
            text: "if (a < b && *p)".to_owned(),
            location: None,
        }];
        assert_eq!(
            render_nodes(&nodes),
            "<pre><code>if (a &lt; b &amp;&amp; *p)</code></pre>\n"
        );
    }

    #[test]
    fn test_error_and_comment() {
        let nodes = vec![
            Node::Comment {
                text: "hidden".to_owned(),
                location: None,
            },
            Node::error_message("kernel-doc missing"),
        ];
        assert_eq!(
            render_nodes(&nodes),
            "<div class=\"system-message error\">\n<p>kernel-doc missing</p>\n</div>\n"
        );
    }

    #[test]
    fn test_definition_list() {
        let nodes = vec![Node::DefinitionList {
            items: vec![DefinitionItem {
                term: "``dev``".to_owned(),
                location: None,
                children: vec![Node::paragraph("the device")],
            }],
        }];
        assert_eq!(
            render_nodes(&nodes),
            "<dl>\n<dt><code>dev</code></dt>\n<dd>\n<p>the device</p>\n</dd>\n</dl>\n"
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("it's"), "it&#x27;s");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("struct drm_device"), "struct-drm-device");
        assert_eq!(slugify("What's New?"), "whats-new");
    }
}
