//! Extension configuration values.

use std::path::PathBuf;

use kdoc_renderer::{ConfigValue, ConfigValues};

/// Path of the extraction tool.
pub const KERNELDOC_BIN: &str = "kerneldoc_bin";
/// Root that directive paths are relative to.
pub const KERNELDOC_SRCTREE: &str = "kerneldoc_srctree";
/// Whether the tool's stderr is echoed after a successful run.
pub const KERNELDOC_VERBOSITY: &str = "kerneldoc_verbosity";

/// Default for [`KERNELDOC_VERBOSITY`].
pub const DEFAULT_VERBOSITY: i64 = 1;

/// Environment variable with the per-run verbosity.
pub const VERBOSITY_ENV: &str = "V";

/// Extension settings read from the build configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KernelDocConfig {
    pub bin: Option<String>,
    pub srctree: Option<PathBuf>,
    pub verbosity: i64,
}

impl KernelDocConfig {
    /// Read the settings; unset or mistyped values fall back to defaults.
    #[must_use]
    pub fn from_values(values: &ConfigValues) -> Self {
        let verbosity = match values.get(KERNELDOC_VERBOSITY) {
            Some(ConfigValue::Int(v)) => *v,
            Some(ConfigValue::Bool(b)) => i64::from(*b),
            _ => DEFAULT_VERBOSITY,
        };
        Self {
            bin: values
                .get_str(KERNELDOC_BIN)
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
            srctree: values.get_str(KERNELDOC_SRCTREE).map(PathBuf::from),
            verbosity,
        }
    }
}

/// Per-run verbosity from the `V` environment variable.
///
/// Values that are not integers are ignored.
#[must_use]
pub fn verbosity_from_env() -> i64 {
    parse_verbosity(std::env::var(VERBOSITY_ENV).ok().as_deref())
}

fn parse_verbosity(value: Option<&str>) -> i64 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(0)
}
