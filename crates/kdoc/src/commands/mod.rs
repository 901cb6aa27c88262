//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod command;

pub(crate) use build::BuildArgs;
pub(crate) use command::CommandArgs;

use kdoc_config::Config;
use kdoc_kerneldoc::{KERNELDOC_BIN, KERNELDOC_SRCTREE, KERNELDOC_VERBOSITY};
use kdoc_renderer::{Application, ConfigValue, ConfigValues};

/// Application with every bundled extension loaded.
pub(crate) fn application() -> Application {
    let mut app = Application::new();
    app.setup_extension("kerneldoc", kdoc_kerneldoc::setup);
    app
}

/// Extension config values: declared defaults overridden by `config`.
pub(crate) fn config_values(app: &Application, config: &Config) -> ConfigValues {
    let mut values = app.config_values();
    let kerneldoc = &config.kerneldoc_resolved;

    if let Some(bin) = &kerneldoc.bin {
        values.set(KERNELDOC_BIN, ConfigValue::Str(bin.clone()));
    }
    if let Some(srctree) = &kerneldoc.srctree {
        values.set(
            KERNELDOC_SRCTREE,
            ConfigValue::Str(srctree.display().to_string()),
        );
    }
    values.set(KERNELDOC_VERBOSITY, ConfigValue::Int(kerneldoc.verbosity));
    values
}
