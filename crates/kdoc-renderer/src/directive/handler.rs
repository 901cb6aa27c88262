//! Directive handler trait.

use super::DirectiveArgs;
use crate::node::Node;
use crate::parser::ParseError;
use crate::state::ParseState;

/// Error returned by a directive handler.
///
/// The block parser reports it as a warning and replaces the directive with
/// an error node, so one bad directive never stops a document build.
#[derive(Debug, thiserror::Error)]
pub enum DirectiveError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    InvalidOption(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Other(String),
}

impl DirectiveError {
    #[must_use]
    pub fn arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }

    #[must_use]
    pub fn option(message: impl Into<String>) -> Self {
        Self::InvalidOption(message.into())
    }
}

/// Handler for a named directive.
///
/// A new instance is created for every directive block, so handlers may keep
/// per-invocation state in `self`.
///
/// # Thread Safety
///
/// Handlers implement `Send` only (not `Sync`) since each invocation gets its
/// own instance.
pub trait Directive: Send {
    /// Produce the nodes that replace the directive block.
    ///
    /// `state` gives access to the build environment, diagnostics and the
    /// nested parser.
    fn run(&mut self, args: DirectiveArgs, state: &mut ParseState)
    -> Result<Vec<Node>, DirectiveError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DirectiveError::arguments("1 argument(s) required, 0 supplied").to_string(),
            "1 argument(s) required, 0 supplied"
        );
        assert_eq!(
            DirectiveError::option("unknown option: \"foo\"").to_string(),
            "unknown option: \"foo\""
        );
    }
}
