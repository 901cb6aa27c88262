//! Parse state shared by the block parser and directive handlers.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use crate::diagnostics::{Diagnostic, Reporter, Severity};
use crate::directive::DirectiveRegistry;
use crate::env::BuildEnvironment;
use crate::node::{Node, SourceLocation};
use crate::parser::ParseError;
use crate::source::StringList;

/// Default limit for directives producing directives.
pub const DEFAULT_MAX_DIRECTIVE_DEPTH: usize = 10;

/// Mutable state for parsing one document.
///
/// Holds the current source input, the title styles seen so far, the
/// diagnostics reporter and the directive registry. Directive handlers receive
/// it to report problems, record dependencies and parse generated text.
pub struct ParseState {
    env: Arc<BuildEnvironment>,
    registry: Arc<DirectiveRegistry>,
    input: StringList,
    reporter: Reporter,
    pub(crate) title_styles: Vec<char>,
    pub(crate) section_level: usize,
    pub(crate) directive_depth: usize,
    pub(crate) max_directive_depth: usize,
}

impl ParseState {
    #[must_use]
    pub fn new(
        env: Arc<BuildEnvironment>,
        registry: Arc<DirectiveRegistry>,
        input: StringList,
    ) -> Self {
        Self {
            env,
            registry,
            input,
            reporter: Reporter::new(),
            title_styles: Vec::new(),
            section_level: 0,
            directive_depth: 0,
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

    #[must_use]
    pub(crate) fn registry(&self) -> &Arc<DirectiveRegistry> {
        &self.registry
    }

    /// The lines currently being parsed.
    #[must_use]
    pub fn input(&self) -> &StringList {
        &self.input
    }

    /// Location of line `index` of the current input.
    #[must_use]
    pub fn location(&self, index: usize) -> Option<SourceLocation> {
        self.input.location(index)
    }

    /// Record that the current document depends on `path`.
    pub fn note_dependency(&self, path: &std::path::Path) {
        self.env.note_dependency(path);
    }

    pub fn report(
        &mut self,
        severity: Severity,
        location: Option<SourceLocation>,
        message: impl Into<String>,
    ) {
        self.reporter.report(severity, location, message);
    }

    pub fn warning(&mut self, location: Option<SourceLocation>, message: impl Into<String>) {
        self.reporter.warning(location, message);
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.reporter.diagnostics()
    }

    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.reporter.into_diagnostics()
    }

    /// Make `input` the current source input until the guard is dropped.
    ///
    /// The previous input is restored when the guard goes out of scope,
    /// including when parsing inside the scope fails.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use kdoc_renderer::{BuildEnvironment, DirectiveRegistry, Node, ParseState, StringList};
    ///
    /// let env = Arc::new(BuildEnvironment::new("/docs", "index"));
    /// let doc = StringList::from_text("Document\n", "index.rst", 8);
    /// let mut state = ParseState::new(env, Arc::new(DirectiveRegistry::new()), doc);
    ///
    /// let generated = StringList::from_text("Generated text\n", "tool output", 8);
    /// let mut target = Node::section();
    /// {
    ///     let mut guard = state.switch_source_input(generated);
    ///     guard.nested_parse(&mut target, false).unwrap();
    /// }
    /// assert_eq!(target.children()[0].location().unwrap().source, "tool output");
    /// assert_eq!(state.input().get(0).unwrap().source, "index.rst");
    /// ```
    pub fn switch_source_input(&mut self, input: StringList) -> SourceInputGuard<'_> {
        let previous = std::mem::replace(&mut self.input, input);
        SourceInputGuard {
            state: self,
            previous: Some(previous),
        }
    }

    /// Parse the current input and append the resulting nodes to `target`.
    ///
    /// With `match_titles`, underlined titles open sections nested below the
    /// current section level; without it a title is an error. Title styles
    /// first seen in a parse that fails are forgotten again, so text parsed
    /// afterwards is unaffected.
    pub fn nested_parse(
        &mut self,
        target: &mut Node,
        match_titles: bool,
    ) -> Result<(), ParseError> {
        let children = target.children_mut().ok_or(ParseError::InvalidTarget)?;

        let input = self.input.clone();
        let known_styles = self.title_styles.len();
        let section_level = self.section_level;
        match self.parse_body(input.lines(), match_titles) {
            Ok(nodes) => {
                children.extend(nodes);
                Ok(())
            }
            Err(err) => {
                self.title_styles.truncate(known_styles);
                self.section_level = section_level;
                Err(err)
            }
        }
    }
}

/// Restores the previous source input on drop.
pub struct SourceInputGuard<'a> {
    state: &'a mut ParseState,
    previous: Option<StringList>,
}

impl Deref for SourceInputGuard<'_> {
    type Target = ParseState;

    fn deref(&self) -> &Self::Target {
        self.state
    }
}

impl DerefMut for SourceInputGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.state
    }
}

impl Drop for SourceInputGuard<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.state.input = previous;
        }
    }
}
