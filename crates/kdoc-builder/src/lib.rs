//! Builds a tree of reStructuredText documents.
//!
//! [`Builder`] discovers `.rst` files under the source directory, processes
//! each one with the directives registered on an
//! [`Application`](kdoc_renderer::Application), writes HTML or JSON output
//! mirroring the source tree and records which files every document was
//! built from in `deps.json`.

mod builder;
mod scanner;

pub use builder::{
    BuildError, BuildReport, Builder, DEPENDENCIES_FILENAME, DocumentReport, OutputFormat,
};
pub use scanner::DocumentRef;
