//! Directive lookup by name.

use std::collections::HashMap;
use std::sync::Arc;

use super::Directive;

/// Creates a directive handler for one invocation.
pub type DirectiveFactory = dyn Fn() -> Box<dyn Directive> + Send + Sync;

/// Registered directives keyed by name.
#[derive(Clone, Default)]
pub struct DirectiveRegistry {
    factories: HashMap<String, Arc<DirectiveFactory>>,
}

impl DirectiveRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory, replacing any previous one with the same name.
    pub fn register(&mut self, name: &str, factory: Arc<DirectiveFactory>) {
        self.factories.insert(name.to_owned(), factory);
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Create a fresh handler for `name`.
    #[must_use]
    pub fn instantiate(&self, name: &str) -> Option<Box<dyn Directive>> {
        self.factories.get(name).map(|factory| factory())
    }

    /// Registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for DirectiveRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectiveRegistry")
            .field("names", &self.names())
            .finish()
    }
}
