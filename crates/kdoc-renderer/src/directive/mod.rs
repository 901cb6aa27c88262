//! Pluggable directives for reStructuredText explicit markup.
//!
//! A directive block looks like this:
//!
//! ```text
//! .. kernel-doc:: drivers/gpu/drm/drm_atomic.c
//!    :export:
//!    :no-identifiers: drm_atomic_private
//!
//!    Optional content.
//! ```
//!
//! The block parser splits such a block into [`DirectiveArgs`] (arguments,
//! options and content) and looks the name up in the [`DirectiveRegistry`].
//! A registered name gets a fresh [`Directive`] instance whose returned nodes
//! are spliced into the document in place of the block. Unregistered names are
//! kept as generic directive nodes.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use kdoc_renderer::directive::{Directive, DirectiveArgs, DirectiveError};
//! use kdoc_renderer::{Application, BuildEnvironment, DocumentProcessor, Node, ParseState};
//!
//! #[derive(Default)]
//! struct Shout;
//!
//! impl Directive for Shout {
//!     fn run(&mut self, args: DirectiveArgs, _state: &mut ParseState)
//!         -> Result<Vec<Node>, DirectiveError>
//!     {
//!         let text = args.argument(0).ok_or(DirectiveError::arguments("one argument required"))?;
//!         Ok(vec![Node::paragraph(text.to_uppercase())])
//!     }
//! }
//!
//! let mut app = Application::new();
//! app.add_directive::<Shout>("shout");
//!
//! let env = Arc::new(BuildEnvironment::new("/docs", "index"));
//! let processor = DocumentProcessor::new(env, app.registry());
//! let doc = processor.process(".. shout:: hello\n").unwrap();
//! assert_eq!(doc.nodes, vec![Node::paragraph("HELLO")]);
//! ```

mod args;
mod handler;
pub(crate) mod parser;
mod registry;

pub use args::DirectiveArgs;
pub use handler::{Directive, DirectiveError};
pub use registry::{DirectiveFactory, DirectiveRegistry};
