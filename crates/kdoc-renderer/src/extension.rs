//! Extension registration.
//!
//! Extensions declare configuration values and register directives on an
//! [`Application`] before any document is built. Each extension reports
//! whether it tolerates documents being read and written in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use crate::directive::{Directive, DirectiveRegistry};

/// Metadata returned by an extension's setup function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtensionMetadata {
    pub version: &'static str,
    pub parallel_read_safe: bool,
    pub parallel_write_safe: bool,
}

/// A configuration value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigValue {
    Unset,
    Str(String),
    Int(i64),
    Bool(bool),
}

/// Declaration of a configuration value and its default.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigValueSpec {
    pub name: &'static str,
    pub default: ConfigValue,
}

/// Configuration values keyed by name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigValues {
    values: HashMap<String, ConfigValue>,
}

impl ConfigValues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous one.
    pub fn set(&mut self, name: impl Into<String>, value: ConfigValue) {
        self.values.insert(name.into(), value);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ConfigValue> {
        self.values.get(name)
    }

    /// String value, or `None` if unset or not a string.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ConfigValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Integer value, or `None` if unset or not an integer.
    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ConfigValue::Int(i)) => Some(*i),
            _ => None,
        }
    }
}

/// Registry of directives, configuration schema and loaded extensions.
///
/// # Example
///
/// ```
/// use kdoc_renderer::{Application, ConfigValue, ExtensionMetadata};
///
/// let mut app = Application::new();
/// let meta = app.setup_extension("noop", |app| {
///     app.add_config_value("noop_level", ConfigValue::Int(1));
///     ExtensionMetadata {
///         version: "1.0",
///         parallel_read_safe: true,
///         parallel_write_safe: true,
///     }
/// });
/// assert!(meta.parallel_read_safe);
/// assert_eq!(app.config_values().get_int("noop_level"), Some(1));
/// ```
#[derive(Default)]
pub struct Application {
    directives: DirectiveRegistry,
    config_specs: Vec<ConfigValueSpec>,
    extensions: Vec<(String, ExtensionMetadata)>,
}

impl Application {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run an extension's setup function and remember its metadata.
    pub fn setup_extension<F>(&mut self, name: &str, setup: F) -> ExtensionMetadata
    where
        F: FnOnce(&mut Self) -> ExtensionMetadata,
    {
        let metadata = setup(self);
        tracing::debug!(extension = name, version = metadata.version, "Loaded extension");
        self.extensions.push((name.to_owned(), metadata));
        metadata
    }

    /// Declare a configuration value with its default.
    pub fn add_config_value(&mut self, name: &'static str, default: ConfigValue) {
        self.config_specs.retain(|spec| spec.name != name);
        self.config_specs.push(ConfigValueSpec { name, default });
    }

    /// Register a directive type; a fresh instance handles every invocation.
    pub fn add_directive<D>(&mut self, name: &str)
    where
        D: Directive + Default + 'static,
    {
        self.directives
            .register(name, Arc::new(|| Box::new(D::default()) as Box<dyn Directive>));
    }

    /// Register a directive built by a factory closure.
    pub fn add_directive_with<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn Directive> + Send + Sync + 'static,
    {
        self.directives.register(name, Arc::new(factory));
    }

    #[must_use]
    pub fn config_specs(&self) -> &[ConfigValueSpec] {
        &self.config_specs
    }

    /// Configuration values populated with declared defaults.
    #[must_use]
    pub fn config_values(&self) -> ConfigValues {
        let mut values = ConfigValues::new();
        for spec in &self.config_specs {
            values.set(spec.name, spec.default.clone());
        }
        values
    }

    /// Shareable snapshot of the registered directives.
    #[must_use]
    pub fn registry(&self) -> Arc<DirectiveRegistry> {
        Arc::new(self.directives.clone())
    }

    #[must_use]
    pub fn extensions(&self) -> &[(String, ExtensionMetadata)] {
        &self.extensions
    }

    /// Whether every loaded extension allows parallel reading.
    #[must_use]
    pub fn parallel_read_safe(&self) -> bool {
        self.extensions.iter().all(|(_, m)| m.parallel_read_safe)
    }

    /// Whether every loaded extension allows parallel writing.
    #[must_use]
    pub fn parallel_write_safe(&self) -> bool {
        self.extensions.iter().all(|(_, m)| m.parallel_write_safe)
    }
}
