//! Document tree nodes.

use std::fmt;

/// One-based location of a node or diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SourceLocation {
    /// Source identifier.
    pub source: String,
    /// One-based line number.
    pub line: usize,
}

impl SourceLocation {
    #[must_use]
    pub fn new(source: impl Into<String>, line: usize) -> Self {
        Self {
            source: source.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.line)
    }
}

/// A term and its definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DefinitionItem {
    pub term: String,
    pub location: Option<SourceLocation>,
    pub children: Vec<Node>,
}

/// Block-level document node.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "type", rename_all = "snake_case")
)]
pub enum Node {
    /// Titled section. Untitled sections are used as parse targets.
    Section {
        title: Option<String>,
        location: Option<SourceLocation>,
        children: Vec<Node>,
    },
    Paragraph {
        text: String,
        location: Option<SourceLocation>,
    },
    LiteralBlock {
        text: String,
        location: Option<SourceLocation>,
    },
    BlockQuote {
        location: Option<SourceLocation>,
        children: Vec<Node>,
    },
    DefinitionList {
        items: Vec<DefinitionItem>,
    },
    /// A directive with no registered handler, kept with its parsed body.
    Directive {
        name: String,
        argument: String,
        options: Vec<(String, String)>,
        location: Option<SourceLocation>,
        children: Vec<Node>,
    },
    Comment {
        text: String,
        location: Option<SourceLocation>,
    },
    /// Visible error marker.
    Error { children: Vec<Node> },
}

impl Node {
    /// Empty untitled section, used as a nested parse target.
    #[must_use]
    pub fn section() -> Self {
        Self::Section {
            title: None,
            location: None,
            children: Vec::new(),
        }
    }

    /// Paragraph without source information.
    #[must_use]
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::Paragraph {
            text: text.into(),
            location: None,
        }
    }

    /// Error node wrapping a single paragraph.
    ///
    /// ```
    /// use kdoc_renderer::Node;
    ///
    /// let node = Node::error_message("kernel-doc missing");
    /// assert_eq!(node.children(), &[Node::paragraph("kernel-doc missing")]);
    /// ```
    #[must_use]
    pub fn error_message(text: impl Into<String>) -> Self {
        Self::Error {
            children: vec![Self::paragraph(text)],
        }
    }

    /// Child nodes of container nodes; empty for leaves.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Section { children, .. }
            | Self::BlockQuote { children, .. }
            | Self::Directive { children, .. }
            | Self::Error { children } => children,
            _ => &[],
        }
    }

    /// Mutable child list, or `None` if the node cannot hold children.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Self::Section { children, .. }
            | Self::BlockQuote { children, .. }
            | Self::Directive { children, .. }
            | Self::Error { children } => Some(children),
            _ => None,
        }
    }

    /// Consume the node and return its children.
    #[must_use]
    pub fn into_children(self) -> Vec<Node> {
        match self {
            Self::Section { children, .. }
            | Self::BlockQuote { children, .. }
            | Self::Directive { children, .. }
            | Self::Error { children } => children,
            _ => Vec::new(),
        }
    }

    #[must_use]
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Section { location, .. }
            | Self::Paragraph { location, .. }
            | Self::LiteralBlock { location, .. }
            | Self::BlockQuote { location, .. }
            | Self::Directive { location, .. }
            | Self::Comment { location, .. } => location.as_ref(),
            Self::DefinitionList { items } => items.first().and_then(|i| i.location.as_ref()),
            Self::Error { .. } => None,
        }
    }

    /// Whether this is an error marker.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}
