//! The `kernel-doc` directive.
//!
//! Runs the kernel's `kernel-doc` comment extractor on a source file and
//! parses its reStructuredText output in place of the directive, keeping
//! track of which source line every generated line came from:
//!
//! ```text
//! .. kernel-doc:: drivers/gpu/drm/drm_atomic.c
//!    :export:
//!    :no-identifiers: drm_atomic_private
//! ```
//!
//! # Options
//!
//! | Option | Effect |
//! |--------|--------|
//! | `:export: [patterns]` | Exported symbols; patterns name extra files with export markers |
//! | `:internal: [patterns]` | Non-exported symbols |
//! | `:doc: title` | One `DOC:` section |
//! | `:identifiers: [names]` | Named symbols; empty means no `DOC:` sections |
//! | `:functions: [names]` | Alias of `:identifiers:` |
//! | `:no-identifiers: names` | Symbols to leave out, with any mode |
//! | `:tab-width: n` | Tab width for the generated text |
//!
//! The first of `export`, `internal`, `doc` and `identifiers` that is given
//! decides what is extracted.
//!
//! # Setup
//!
//! ```
//! use kdoc_renderer::Application;
//!
//! let mut app = Application::new();
//! let meta = app.setup_extension("kerneldoc", kdoc_kerneldoc::setup);
//! assert_eq!(meta.version, "1.0");
//! assert!(app.registry().contains("kernel-doc"));
//! ```

mod attribute;
mod command;
mod config;
mod directive;
mod invoke;
mod options;

use kdoc_renderer::{Application, ConfigValue, ExtensionMetadata};

pub use attribute::{attribute_output, output_source};
pub use command::{CommandBuilder, KernelDocCommand, cmd_str};
pub use config::{
    DEFAULT_VERBOSITY, KERNELDOC_BIN, KERNELDOC_SRCTREE, KERNELDOC_VERBOSITY, KernelDocConfig,
    VERBOSITY_ENV, verbosity_from_env,
};
pub use directive::{KernelDocDirective, PLACEHOLDER};
pub use invoke::{ExtractError, run};
pub use options::{KNOWN_OPTIONS, KernelDocOptions, OptionError, Selection};

/// Directive name.
pub const DIRECTIVE_NAME: &str = "kernel-doc";

/// Extension version.
pub const VERSION: &str = "1.0";

/// Declare the configuration values and register the directive.
pub fn setup(app: &mut Application) -> ExtensionMetadata {
    app.add_config_value(KERNELDOC_BIN, ConfigValue::Unset);
    app.add_config_value(KERNELDOC_SRCTREE, ConfigValue::Unset);
    app.add_config_value(KERNELDOC_VERBOSITY, ConfigValue::Int(DEFAULT_VERBOSITY));

    app.add_directive::<KernelDocDirective>(DIRECTIVE_NAME);

    ExtensionMetadata {
        version: VERSION,
        parallel_read_safe: true,
        parallel_write_safe: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup() {
        let mut app = Application::new();
        let meta = setup(&mut app);

        assert_eq!(
            meta,
            ExtensionMetadata {
                version: "1.0",
                parallel_read_safe: true,
                parallel_write_safe: true,
            }
        );
        let names: Vec<_> = app.config_specs().iter().map(|s| s.name).collect();
        assert_eq!(names, vec![KERNELDOC_BIN, KERNELDOC_SRCTREE, KERNELDOC_VERBOSITY]);
        assert_eq!(app.config_values().get_int(KERNELDOC_VERBOSITY), Some(1));
        assert_eq!(app.registry().names(), vec!["kernel-doc"]);
    }
}
