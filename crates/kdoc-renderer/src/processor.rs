//! Whole-document processing.

use std::sync::Arc;

use crate::diagnostics::Diagnostic;
use crate::directive::DirectiveRegistry;
use crate::env::BuildEnvironment;
use crate::node::Node;
use crate::parser::ParseError;
use crate::source::StringList;
use crate::state::{DEFAULT_MAX_DIRECTIVE_DEPTH, ParseState};

/// Result of processing one document.
#[derive(Debug)]
pub struct ProcessedDocument {
    /// Top-level nodes.
    pub nodes: Vec<Node>,
    /// Warnings and errors raised while parsing, in order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Parses a document and expands its directives.
///
/// One processor handles one document; it can be reused to process the same
/// document again after it changed.
pub struct DocumentProcessor {
    env: Arc<BuildEnvironment>,
    registry: Arc<DirectiveRegistry>,
    max_directive_depth: usize,
}

impl DocumentProcessor {
    #[must_use]
    pub fn new(env: Arc<BuildEnvironment>, registry: Arc<DirectiveRegistry>) -> Self {
        Self {
            env,
            registry,
            max_directive_depth: DEFAULT_MAX_DIRECTIVE_DEPTH,
        }
    }

    /// Set the maximum nesting of directive output containing directives.
    #[must_use]
    pub fn with_max_directive_depth(mut self, depth: usize) -> Self {
        self.max_directive_depth = depth;
        self
    }

    #[must_use]
    pub fn env(&self) -> &BuildEnvironment {
        &self.env
    }

    /// Parse `text` as the document's source.
    ///
    /// Directive failures are reported as diagnostics and error nodes; only
    /// structural problems such as inconsistent title levels fail the parse.
    pub fn process(&self, text: &str) -> Result<ProcessedDocument, ParseError> {
        let source = self.env.doc_path().display().to_string();
        let lines = StringList::from_text(text, &source, self.env.tab_width);

        let mut state = ParseState::new(
            Arc::clone(&self.env),
            Arc::clone(&self.registry),
            lines,
        )
        .with_max_directive_depth(self.max_directive_depth);

        let mut root = Node::section();
        state.nested_parse(&mut root, true)?;

        Ok(ProcessedDocument {
            nodes: root.into_children(),
            diagnostics: state.into_diagnostics(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::{Directive, DirectiveArgs, DirectiveError};
    use crate::extension::Application;
    use crate::node::SourceLocation;

    #[derive(Default)]
    struct Dependency;

    impl Directive for Dependency {
        fn run(
            &mut self,
            args: DirectiveArgs,
            state: &mut ParseState,
        ) -> Result<Vec<Node>, DirectiveError> {
            for path in &args.arguments {
                state.note_dependency(std::path::Path::new(path));
            }
            Ok(Vec::new())
        }
    }

    fn processor() -> DocumentProcessor {
        let mut app = Application::new();
        app.add_directive::<Dependency>("depends");
        let env = Arc::new(BuildEnvironment::new("/docs", "guide/intro"));
        DocumentProcessor::new(env, app.registry())
    }

    #[test]
    fn test_locations_use_document_path() {
        let doc = processor().process("Hello\n").unwrap();
        assert_eq!(
            doc.nodes[0].location(),
            Some(&SourceLocation::new("/docs/guide/intro.rst", 1))
        );
    }

    #[test]
    fn test_directive_dependencies_recorded() {
        let processor = processor();
        let doc = processor
            .process(".. depends:: /src/a.c /src/b.c\n\nText\n")
            .unwrap();

        assert_eq!(doc.nodes.len(), 1);
        assert_eq!(
            processor.env().dependency_log().dependencies("guide/intro"),
            vec![
                std::path::PathBuf::from("/src/a.c"),
                std::path::PathBuf::from("/src/b.c")
            ]
        );
    }

    #[test]
    fn test_parse_error_fails_document() {
        let result = processor().process("A\n=\n\nB\n-\n\nC\n=\n\nD\n~\n");
        assert!(matches!(
            result,
            Err(ParseError::InconsistentTitleLevel { .. })
        ));
    }

    #[test]
    fn test_diagnostics_returned() {
        let doc = processor().process("Example::\n\nNo literal\n").unwrap();
        assert_eq!(doc.diagnostics.len(), 1);
        assert_eq!(
            doc.diagnostics[0].location,
            Some(SourceLocation::new("/docs/guide/intro.rst", 3))
        );
    }
}
