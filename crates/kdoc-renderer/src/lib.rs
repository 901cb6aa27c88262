//! reStructuredText-lite document engine with pluggable directives.
//!
//! The engine splits source text into attributed lines ([`StringList`]),
//! parses them into a [`Node`] tree and hands explicit markup blocks to
//! directives registered on an [`Application`]. Directives can parse
//! generated text back into the tree by switching the source input with
//! [`ParseState::switch_source_input`] and calling
//! [`ParseState::nested_parse`], keeping each generated line's own source
//! attribution for diagnostics.
//!
//! # Architecture
//!
//! - [`Application`]: extension setup, config value declarations and the
//!   directive registry
//! - [`BuildEnvironment`]: per-document context shared with directives
//! - [`DocumentProcessor`]: parses one document into nodes and diagnostics
//! - [`render_nodes`]: HTML output
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use kdoc_renderer::{Application, BuildEnvironment, DocumentProcessor, render_nodes};
//!
//! let app = Application::new();
//! let env = Arc::new(BuildEnvironment::new("/docs", "index"));
//! let doc = DocumentProcessor::new(env, app.registry())
//!     .process("Title\n=====\n\nSome **bold** text.\n")
//!     .unwrap();
//!
//! assert!(doc.diagnostics.is_empty());
//! assert!(render_nodes(&doc.nodes).contains("<strong>bold</strong>"));
//! ```

mod diagnostics;
pub mod directive;
mod env;
mod extension;
mod html;
mod node;
mod parser;
mod processor;
mod source;
mod state;

pub use diagnostics::{Diagnostic, Reporter, Severity};
pub use directive::DirectiveRegistry;
pub use env::{BuildEnvironment, DependencyLog, SOURCE_SUFFIX};
pub use extension::{
    Application, ConfigValue, ConfigValueSpec, ConfigValues, ExtensionMetadata,
};
pub use html::{escape_html, render_nodes};
pub use node::{DefinitionItem, Node, SourceLocation};
pub use parser::ParseError;
pub use processor::{DocumentProcessor, ProcessedDocument};
pub use source::{DEFAULT_TAB_WIDTH, SourceLine, StringList, string_to_lines};
pub use state::{DEFAULT_MAX_DIRECTIVE_DEPTH, ParseState, SourceInputGuard};
