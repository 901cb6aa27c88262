//! Block parser for reStructuredText-lite.
//!
//! Recognised blocks:
//!
//! - paragraphs separated by blank lines
//! - section titles underlined with a repeated punctuation character
//! - literal blocks introduced by a paragraph ending in `::`
//! - block quotes (indented blocks)
//! - definition lists (a term followed directly by an indented definition)
//! - explicit markup: `.. name:: argument` directives and `..` comments
//!
//! Every node records the location of its first line, taken from the line's
//! own attribution rather than from its position in the input.

use crate::diagnostics::Severity;
use crate::directive::DirectiveArgs;
use crate::directive::parser::{parse_marker, split_options};
use crate::node::{DefinitionItem, Node, SourceLocation};
use crate::source::{SourceLine, StringList};
use crate::state::ParseState;

/// Characters allowed in section title underlines.
const TITLE_CHARS: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Unrecoverable parse failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("{location}: unexpected section title")]
    UnexpectedTitle { location: SourceLocation },
    #[error("{location}: title level inconsistent")]
    InconsistentTitleLevel { location: SourceLocation },
    #[error("parse target cannot hold child nodes")]
    InvalidTarget,
}

/// Section still accepting children.
struct OpenSection {
    level: usize,
    node: Node,
}

/// Underlined title found at a line.
struct Title {
    text: String,
    style: char,
    short_underline: bool,
}

impl ParseState {
    /// Parse a run of lines into block nodes.
    pub(crate) fn parse_body(
        &mut self,
        lines: &[SourceLine],
        match_titles: bool,
    ) -> Result<Vec<Node>, ParseError> {
        let base = self.section_level;
        let mut root = Vec::new();
        let mut open: Vec<OpenSection> = Vec::new();
        let mut idx = 0;

        while idx < lines.len() {
            let line = &lines[idx];

            if line.is_blank() {
                idx += 1;
                continue;
            }

            if line.indent() > 0 {
                let end = indented_end(lines, idx);
                let children = self.parse_body(&dedent(&lines[idx..end]), false)?;
                push_node(
                    &mut open,
                    &mut root,
                    Node::BlockQuote {
                        location: Some(line.location()),
                        children,
                    },
                );
                idx = end;
                continue;
            }

            if let Some(title) = detect_title(lines, idx) {
                let location = line.location();
                if !match_titles {
                    return Err(ParseError::UnexpectedTitle { location });
                }
                if title.short_underline {
                    self.warning(Some(lines[idx + 1].location()), "Title underline too short.");
                }

                let current = open.last().map_or(base, |s| s.level);
                let level = self.title_level(title.style, current, &location)?.max(base + 1);
                close_sections(&mut open, &mut root, level);
                open.push(OpenSection {
                    level,
                    node: Node::Section {
                        title: Some(title.text),
                        location: Some(location),
                        children: Vec::new(),
                    },
                });
                idx += 2;
                continue;
            }

            let current = open.last().map_or(base, |s| s.level);
            let (nodes, next) = if is_explicit_markup(&line.text) {
                self.parse_explicit(lines, idx, current)?
            } else if is_definition_start(lines, idx) {
                self.parse_definition_list(lines, idx)?
            } else {
                self.parse_paragraph(lines, idx)
            };

            for node in nodes {
                push_node(&mut open, &mut root, node);
            }
            idx = next;
        }

        close_sections(&mut open, &mut root, 0);
        Ok(root)
    }

    /// Resolve the level of a title style relative to the current level.
    fn title_level(
        &mut self,
        style: char,
        current: usize,
        location: &SourceLocation,
    ) -> Result<usize, ParseError> {
        if let Some(pos) = self.title_styles.iter().position(|&c| c == style) {
            let level = pos + 1;
            if level > current + 1 {
                return Err(ParseError::InconsistentTitleLevel {
                    location: location.clone(),
                });
            }
            return Ok(level);
        }

        if self.title_styles.len() == current {
            self.title_styles.push(style);
            Ok(current + 1)
        } else {
            Err(ParseError::InconsistentTitleLevel {
                location: location.clone(),
            })
        }
    }

    fn parse_explicit(
        &mut self,
        lines: &[SourceLine],
        idx: usize,
        section_level: usize,
    ) -> Result<(Vec<Node>, usize), ParseError> {
        let first = &lines[idx];
        let end = indented_end(lines, idx + 1).max(idx + 1);

        let Some(marker) = parse_marker(&first.text) else {
            let mut text = first.text[2..].trim().to_owned();
            for line in dedent(&lines[idx + 1..end]) {
                if !text.is_empty() {
                    text.push('\n');
                }
                text.push_str(&line.text);
            }
            let comment = Node::Comment {
                text,
                location: Some(first.location()),
            };
            return Ok((vec![comment], end));
        };

        let body = dedent(&lines[idx + 1..end]);
        let (options, content_start) = split_options(&body);
        let content = StringList::from(body[content_start..].to_vec());
        let nodes = self.run_directive(
            first,
            marker.name,
            marker.argument,
            options,
            content,
            section_level,
        )?;
        Ok((nodes, end))
    }

    fn run_directive(
        &mut self,
        marker_line: &SourceLine,
        name: &str,
        argument: &str,
        options: Vec<(String, String)>,
        content: StringList,
        section_level: usize,
    ) -> Result<Vec<Node>, ParseError> {
        let location = marker_line.location();

        let Some(mut handler) = self.registry().instantiate(name) else {
            let children = self.parse_body(content.lines(), false)?;
            return Ok(vec![Node::Directive {
                name: name.to_owned(),
                argument: argument.to_owned(),
                options,
                location: Some(location),
                children,
            }]);
        };

        if self.directive_depth >= self.max_directive_depth {
            let message = format!(
                "Maximum directive depth ({}) exceeded",
                self.max_directive_depth
            );
            self.warning(Some(location), message.clone());
            return Ok(vec![Node::error_message(message)]);
        }

        let args = DirectiveArgs {
            name: name.to_owned(),
            arguments: argument.split_whitespace().map(str::to_owned).collect(),
            options,
            content,
            lineno: location.line,
            location: Some(location.clone()),
        };

        let saved_level = std::mem::replace(&mut self.section_level, section_level);
        self.directive_depth += 1;
        let result = handler.run(args, self);
        self.directive_depth -= 1;
        self.section_level = saved_level;

        match result {
            Ok(nodes) => Ok(nodes),
            Err(err) => {
                let message = format!("Error in \"{name}\" directive: {err}.");
                self.report(Severity::Error, Some(location), message.clone());
                Ok(vec![Node::error_message(message)])
            }
        }
    }

    fn parse_definition_list(
        &mut self,
        lines: &[SourceLine],
        mut idx: usize,
    ) -> Result<(Vec<Node>, usize), ParseError> {
        let mut items = Vec::new();

        loop {
            let term = &lines[idx];
            let end = indented_end(lines, idx + 1);
            let children = self.parse_body(&dedent(&lines[idx + 1..end]), false)?;
            items.push(DefinitionItem {
                term: term.text.trim().to_owned(),
                location: Some(term.location()),
                children,
            });
            idx = end;

            let next = skip_blank(lines, idx);
            if next < lines.len() && is_definition_start(lines, next) {
                idx = next;
            } else {
                break;
            }
        }

        Ok((vec![Node::DefinitionList { items }], idx))
    }

    fn parse_paragraph(&mut self, lines: &[SourceLine], start: usize) -> (Vec<Node>, usize) {
        let mut end = start + 1;
        while end < lines.len() && !lines[end].is_blank() && lines[end].indent() == 0 {
            end += 1;
        }

        let location = lines[start].location();
        let mut text = lines[start..end]
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let mut nodes = Vec::new();

        if !text.ends_with("::") {
            if lines.get(end).is_some_and(|l| !l.is_blank()) {
                self.warning(Some(lines[end].location()), "Unexpected indentation.");
            }
            nodes.push(Node::Paragraph {
                text,
                location: Some(location),
            });
            return (nodes, end);
        }

        if text.trim() != "::" {
            let stripped = text[..text.len() - 2].to_owned();
            text = if stripped.ends_with(char::is_whitespace) {
                stripped.trim_end().to_owned()
            } else {
                format!("{stripped}:")
            };
            nodes.push(Node::Paragraph {
                text,
                location: Some(location),
            });
        }

        let literal_start = skip_blank(lines, end);
        if lines.get(literal_start).is_some_and(|l| l.indent() > 0) {
            let literal_end = indented_end(lines, literal_start);
            let literal = dedent(&lines[literal_start..literal_end])
                .iter()
                .map(|l| l.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            nodes.push(Node::LiteralBlock {
                text: literal,
                location: Some(lines[literal_start].location()),
            });
            return (nodes, literal_end);
        }

        let warn_at = lines.get(literal_start).unwrap_or(&lines[end - 1]).location();
        self.warning(Some(warn_at), "Literal block expected; none found.");
        (nodes, end)
    }
}

fn push_node(open: &mut [OpenSection], root: &mut Vec<Node>, node: Node) {
    match open.last_mut().and_then(|s| s.node.children_mut()) {
        Some(children) => children.push(node),
        None => root.push(node),
    }
}

/// Close open sections at `level` or deeper.
fn close_sections(open: &mut Vec<OpenSection>, root: &mut Vec<Node>, level: usize) {
    while open.last().is_some_and(|s| s.level >= level) {
        if let Some(section) = open.pop() {
            push_node(open, root, section.node);
        }
    }
}

fn is_explicit_markup(text: &str) -> bool {
    text == ".." || text.starts_with(".. ")
}

fn is_definition_start(lines: &[SourceLine], idx: usize) -> bool {
    let (Some(term), Some(next)) = (lines.get(idx), lines.get(idx + 1)) else {
        return false;
    };
    !term.is_blank()
        && term.indent() == 0
        && !is_explicit_markup(&term.text)
        && !next.is_blank()
        && next.indent() > 0
}

fn skip_blank(lines: &[SourceLine], mut idx: usize) -> usize {
    while lines.get(idx).is_some_and(SourceLine::is_blank) {
        idx += 1;
    }
    idx
}

/// End of the indented block starting at `start`, excluding trailing blanks.
fn indented_end(lines: &[SourceLine], start: usize) -> usize {
    let mut end = start;
    let mut last_text = start;
    while let Some(line) = lines.get(end) {
        if line.is_blank() {
            end += 1;
        } else if line.indent() > 0 {
            end += 1;
            last_text = end;
        } else {
            break;
        }
    }
    last_text
}

/// Remove the common indentation of non-blank lines.
fn dedent(lines: &[SourceLine]) -> Vec<SourceLine> {
    let min = lines
        .iter()
        .filter(|l| !l.is_blank())
        .map(SourceLine::indent)
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| SourceLine {
            text: if line.is_blank() {
                String::new()
            } else {
                line.text[min..].to_owned()
            },
            source: line.source.clone(),
            offset: line.offset,
        })
        .collect()
}

fn detect_title(lines: &[SourceLine], idx: usize) -> Option<Title> {
    let title = lines.get(idx)?;
    let underline = lines.get(idx + 1)?;
    if title.is_blank() || title.indent() > 0 || underline.is_blank() || underline.indent() > 0 {
        return None;
    }

    let underline_text = underline.text.trim_end();
    let style = underline_text.chars().next()?;
    if !TITLE_CHARS.contains(style) || !underline_text.chars().all(|c| c == style) {
        return None;
    }

    let title_text = title.text.trim();
    let first = title_text.chars().next()?;
    if TITLE_CHARS.contains(first) && title_text.chars().all(|c| c == first) {
        return None;
    }

    let title_len = title_text.chars().count();
    let underline_len = underline_text.chars().count();
    if underline_len < title_len && underline_len < 4 {
        return None;
    }

    Some(Title {
        text: title_text.to_owned(),
        style,
        short_underline: underline_len < title_len,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::directive::{Directive, DirectiveError, DirectiveRegistry};
    use crate::env::BuildEnvironment;
    use crate::extension::Application;
    use pretty_assertions::assert_eq;

    fn state_with(registry: DirectiveRegistry) -> ParseState {
        let env = Arc::new(BuildEnvironment::new("/docs", "index"));
        ParseState::new(env, Arc::new(registry), StringList::new())
    }

    fn parse(text: &str) -> (Vec<Node>, ParseState) {
        let mut state = state_with(DirectiveRegistry::new());
        let lines = StringList::from_text(text, "index.rst", 8);
        let nodes = state.parse_body(lines.lines(), true).unwrap();
        (nodes, state)
    }

    fn loc(line: usize) -> Option<SourceLocation> {
        Some(SourceLocation::new("index.rst", line))
    }

    #[test]
    fn test_paragraphs() {
        let (nodes, _) = parse("First line\nsecond line\n\nNext\n");
        assert_eq!(
            nodes,
            vec![
                Node::Paragraph {
                    text: "First line\nsecond line".to_owned(),
                    location: loc(1),
                },
                Node::Paragraph {
                    text: "Next".to_owned(),
                    location: loc(4),
                },
            ]
        );
    }

    #[test]
    fn test_nested_sections() {
        let (nodes, _) = parse("Top\n===\n\nintro\n\nSub\n---\n\nbody\n\nTop2\n====\n");
        assert_eq!(nodes.len(), 2);

        let Node::Section {
            title, children, ..
        } = &nodes[0]
        else {
            panic!("expected section");
        };
        assert_eq!(title.as_deref(), Some("Top"));
        assert_eq!(children.len(), 2);
        assert!(matches!(&children[1], Node::Section { title: Some(t), .. } if t == "Sub"));
        assert!(matches!(&nodes[1], Node::Section { title: Some(t), .. } if t == "Top2"));
    }

    #[test]
    fn test_inconsistent_title_level() {
        let mut state = state_with(DirectiveRegistry::new());
        let lines = StringList::from_text("A\n=\n\nB\n-\n\nC\n=\n\nD\n~\n", "index.rst", 8);
        let err = state.parse_body(lines.lines(), true).unwrap_err();
        assert_eq!(
            err,
            ParseError::InconsistentTitleLevel {
                location: SourceLocation::new("index.rst", 10)
            }
        );
    }

    #[test]
    fn test_title_without_match_titles() {
        let mut state = state_with(DirectiveRegistry::new());
        let lines = StringList::from_text("Title\n=====\n", "gen", 8);
        let err = state.parse_body(lines.lines(), false).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedTitle { .. }));
    }

    #[test]
    fn test_short_underline_warns() {
        let (nodes, state) = parse("Long title\n=====\n");
        assert!(matches!(&nodes[0], Node::Section { .. }));
        assert_eq!(
            state.diagnostics()[0].to_string(),
            "index.rst:2: WARNING: Title underline too short."
        );
    }

    #[test]
    fn test_literal_block() {
        let (nodes, _) = parse("Example::\n\n    int x;\n      y;\n\nAfter\n");
        assert_eq!(
            nodes,
            vec![
                Node::Paragraph {
                    text: "Example:".to_owned(),
                    location: loc(1),
                },
                Node::LiteralBlock {
                    text: "int x;\n  y;".to_owned(),
                    location: loc(3),
                },
                Node::Paragraph {
                    text: "After".to_owned(),
                    location: loc(6),
                },
            ]
        );
    }

    #[test]
    fn test_expanded_literal_marker() {
        let (nodes, _) = parse("::\n\n    code\n");
        assert_eq!(
            nodes,
            vec![Node::LiteralBlock {
                text: "code".to_owned(),
                location: loc(3),
            }]
        );

        let (nodes, _) = parse("Code ::\n\n    code\n");
        assert!(matches!(&nodes[0], Node::Paragraph { text, .. } if text == "Code"));
    }

    #[test]
    fn test_missing_literal_block_warns() {
        let (_, state) = parse("Example::\n\nNot indented\n");
        assert!(state.diagnostics()[0]
            .message
            .contains("Literal block expected"));
    }

    #[test]
    fn test_block_quote() {
        let (nodes, _) = parse("Para\n\n    quoted\n");
        assert_eq!(
            nodes[1],
            Node::BlockQuote {
                location: loc(3),
                children: vec![Node::Paragraph {
                    text: "quoted".to_owned(),
                    location: loc(3),
                }],
            }
        );
    }

    #[test]
    fn test_definition_list() {
        let (nodes, _) = parse("**Parameters**\n\n``int a``\n  first\n\n``int b``\n  second\n");
        let Node::DefinitionList { items } = &nodes[1] else {
            panic!("expected definition list, got {:?}", nodes[1]);
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].term, "``int a``");
        assert_eq!(items[1].location, loc(6));
        assert_eq!(
            items[1].children,
            vec![Node::Paragraph {
                text: "second".to_owned(),
                location: loc(7),
            }]
        );
    }

    #[test]
    fn test_generic_directive() {
        let (nodes, _) = parse(".. c:function:: int foo(void)\n\n   Does foo.\n\nAfter\n");
        assert_eq!(
            nodes[0],
            Node::Directive {
                name: "c:function".to_owned(),
                argument: "int foo(void)".to_owned(),
                options: Vec::new(),
                location: loc(1),
                children: vec![Node::Paragraph {
                    text: "Does foo.".to_owned(),
                    location: loc(3),
                }],
            }
        );
        assert!(matches!(&nodes[1], Node::Paragraph { text, .. } if text == "After"));
    }

    #[test]
    fn test_comment() {
        let (nodes, _) = parse(".. a comment\n   continued\n");
        assert_eq!(
            nodes,
            vec![Node::Comment {
                text: "a comment\ncontinued".to_owned(),
                location: loc(1),
            }]
        );
    }

    #[derive(Default)]
    struct Echo;

    impl Directive for Echo {
        fn run(
            &mut self,
            args: DirectiveArgs,
            state: &mut ParseState,
        ) -> Result<Vec<Node>, DirectiveError> {
            if args.arguments.is_empty() {
                return Err(DirectiveError::arguments("1 argument(s) required, 0 supplied"));
            }
            let mut target = Node::section();
            {
                let mut guard = state.switch_source_input(args.content.clone());
                guard.nested_parse(&mut target, true)?;
            }
            let mut nodes = vec![Node::paragraph(args.arguments.join(" "))];
            nodes.extend(target.into_children());
            Ok(nodes)
        }
    }

    fn echo_state() -> ParseState {
        let mut app = Application::new();
        app.add_directive::<Echo>("echo");
        let env = Arc::new(BuildEnvironment::new("/docs", "index"));
        ParseState::new(env, app.registry(), StringList::new())
    }

    #[test]
    fn test_registered_directive_output_is_spliced() {
        let mut state = echo_state();
        let lines = StringList::from_text(
            "Before\n\n.. echo:: hi there\n   :flag:\n\n   Inner\n\nAfter\n",
            "index.rst",
            8,
        );
        let nodes = state.parse_body(lines.lines(), true).unwrap();
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[1], Node::paragraph("hi there"));
        assert_eq!(
            nodes[2],
            Node::Paragraph {
                text: "Inner".to_owned(),
                location: loc(6),
            }
        );
    }

    #[test]
    fn test_directive_sections_nest_below_current_section() {
        let mut state = echo_state();
        let text = "Top\n===\n\n.. echo:: x\n\n   Inner\n   -----\n\n   text\n";
        let lines = StringList::from_text(text, "index.rst", 8);
        let nodes = state.parse_body(lines.lines(), true).unwrap();

        let Node::Section { children, .. } = &nodes[0] else {
            panic!("expected section");
        };
        assert!(matches!(&children[1], Node::Section { title: Some(t), .. } if t == "Inner"));
        assert_eq!(state.title_styles, vec!['=', '-']);
    }

    #[test]
    fn test_directive_error_becomes_error_node() {
        let mut state = echo_state();
        let lines = StringList::from_text(".. echo::\n", "index.rst", 8);
        let nodes = state.parse_body(lines.lines(), true).unwrap();

        assert_eq!(
            nodes,
            vec![Node::error_message(
                "Error in \"echo\" directive: 1 argument(s) required, 0 supplied."
            )]
        );
        assert_eq!(state.diagnostics()[0].severity, Severity::Error);
        assert_eq!(state.diagnostics()[0].location, loc(1));
    }

    #[test]
    fn test_directive_depth_limit() {
        #[derive(Default)]
        struct Recurse;

        impl Directive for Recurse {
            fn run(
                &mut self,
                _args: DirectiveArgs,
                state: &mut ParseState,
            ) -> Result<Vec<Node>, DirectiveError> {
                let lines = StringList::from_text(".. recurse::\n", "generated", 8);
                let mut target = Node::section();
                let mut guard = state.switch_source_input(lines);
                guard.nested_parse(&mut target, false)?;
                Ok(target.into_children())
            }
        }

        let mut app = Application::new();
        app.add_directive::<Recurse>("recurse");
        let env = Arc::new(BuildEnvironment::new("/docs", "index"));
        let mut state =
            ParseState::new(env, app.registry(), StringList::new()).with_max_directive_depth(3);

        let lines = StringList::from_text(".. recurse::\n", "index.rst", 8);
        let nodes = state.parse_body(lines.lines(), true).unwrap();

        assert!(nodes[0].is_error());
        assert!(state
            .diagnostics()
            .iter()
            .any(|d| d.message.contains("Maximum directive depth (3) exceeded")));
    }
}
