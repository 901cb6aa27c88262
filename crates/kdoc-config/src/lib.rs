//! Configuration management for kdoc.
//!
//! Parses `kdoc.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! [docs]
//! source_dir = "Documentation"
//! output_dir = "build"
//! tab_width = 8
//!
//! [kerneldoc]
//! bin = "${srctree:-..}/scripts/kernel-doc"
//! srctree = ".."
//! verbosity = 1
//! ```
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `${VAR}` and `${VAR:-default}` are expanded in `docs.source_dir`,
//! `docs.output_dir`, `kerneldoc.bin` and `kerneldoc.srctree`.

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "kdoc.toml";

/// Default tab width for source documents.
pub const DEFAULT_TAB_WIDTH: usize = 8;

/// Largest accepted `docs.tab_width`.
const MAX_TAB_WIDTH: usize = 32;

/// Default `kerneldoc.verbosity`.
pub const DEFAULT_VERBOSITY: i64 = 1;

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    pub source_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub kerneldoc_bin: Option<String>,
    pub srctree: Option<PathBuf>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    docs: DocsConfigRaw,
    kerneldoc: KernelDocConfigRaw,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Resolved extraction tool configuration (set after loading).
    #[serde(skip)]
    pub kerneldoc_resolved: KernelDocConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw docs configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
    output_dir: Option<String>,
    tab_width: Option<usize>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocsConfig {
    /// Directory holding `.rst` sources.
    pub source_dir: PathBuf,
    /// Directory receiving rendered output.
    pub output_dir: PathBuf,
    pub tab_width: usize,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("docs"),
            output_dir: PathBuf::from("build"),
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }
}

/// Raw `[kerneldoc]` section.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct KernelDocConfigRaw {
    bin: Option<String>,
    srctree: Option<String>,
    verbosity: Option<i64>,
}

/// Resolved extraction tool settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelDocConfig {
    /// Tool path. Bare names are looked up on `PATH`.
    pub bin: Option<String>,
    /// Root that directive paths are relative to.
    pub srctree: Option<PathBuf>,
    /// Echo the tool's stderr on success when positive.
    pub verbosity: i64,
}

impl Default for KernelDocConfig {
    fn default() -> Self {
        Self {
            bin: None,
            srctree: None,
            verbosity: DEFAULT_VERBOSITY,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`kerneldoc.srctree`").
        field: String,
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `kdoc.toml` in current directory and parents,
    /// falling back to defaults relative to the current directory.
    ///
    /// CLI settings are applied after loading and path resolution.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.docs_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(bin) = &settings.kerneldoc_bin {
            self.kerneldoc_resolved.bin = Some(bin.clone());
        }
        if let Some(srctree) = &settings.srctree {
            self.kerneldoc_resolved.srctree = Some(srctree.clone());
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            docs: DocsConfigRaw::default(),
            kerneldoc: KernelDocConfigRaw::default(),
            docs_resolved: DocsConfig {
                source_dir: base.join("docs"),
                output_dir: base.join("build"),
                tab_width: DEFAULT_TAB_WIDTH,
            },
            kerneldoc_resolved: KernelDocConfig::default(),
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate resolved values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tab_width = self.docs_resolved.tab_width;
        if tab_width == 0 || tab_width > MAX_TAB_WIDTH {
            return Err(ConfigError::Validation(format!(
                "docs.tab_width must be between 1 and {MAX_TAB_WIDTH}"
            )));
        }

        if self.kerneldoc_resolved.bin.as_deref() == Some("") {
            return Err(ConfigError::Validation(
                "kerneldoc.bin cannot be empty".to_owned(),
            ));
        }

        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let expand = |value: &mut Option<String>, field: &str| -> Result<(), ConfigError> {
            if let Some(v) = value {
                *v = expand::expand_env(v, field)?;
            }
            Ok(())
        };

        expand(&mut self.docs.source_dir, "docs.source_dir")?;
        expand(&mut self.docs.output_dir, "docs.output_dir")?;
        expand(&mut self.kerneldoc.bin, "kerneldoc.bin")?;
        expand(&mut self.kerneldoc.srctree, "kerneldoc.srctree")?;
        Ok(())
    }

    /// Resolve relative paths against the config file directory.
    ///
    /// A `kerneldoc.bin` without a path separator stays a bare command name.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.docs_resolved = DocsConfig {
            source_dir: resolve(self.docs.source_dir.as_deref(), "docs"),
            output_dir: resolve(self.docs.output_dir.as_deref(), "build"),
            tab_width: self.docs.tab_width.unwrap_or(DEFAULT_TAB_WIDTH),
        };

        let bin = self.kerneldoc.bin.as_deref().map(|bin| {
            if bin.contains('/') {
                config_dir.join(bin).display().to_string()
            } else {
                bin.to_owned()
            }
        });

        self.kerneldoc_resolved = KernelDocConfig {
            bin,
            srctree: self.kerneldoc.srctree.as_deref().map(|s| config_dir.join(s)),
            verbosity: self.kerneldoc.verbosity.unwrap_or(DEFAULT_VERBOSITY),
        };
    }
}
