//! Per-document build environment and the shared dependency log.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::extension::ConfigValues;
use crate::source::DEFAULT_TAB_WIDTH;

/// Suffix of source documents.
pub const SOURCE_SUFFIX: &str = ".rst";

/// Records which files each document's output depends on.
///
/// Append-only for the duration of a build and shared between all documents,
/// so it is safe to use from parallel document builds.
#[derive(Debug, Default)]
pub struct DependencyLog {
    entries: Mutex<BTreeMap<String, BTreeSet<PathBuf>>>,
}

impl DependencyLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `docname` depends on `path`.
    pub fn note(&self, docname: &str, path: PathBuf) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(docname.to_owned())
            .or_default()
            .insert(path);
    }

    /// Dependencies recorded for a document, in sorted order.
    #[must_use]
    pub fn dependencies(&self, docname: &str) -> Vec<PathBuf> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(docname)
            .map(|deps| deps.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Copy of all recorded dependencies.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, BTreeSet<PathBuf>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget everything; called at the start of a full build.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Everything a directive may need to know about the document being built.
#[derive(Debug)]
pub struct BuildEnvironment {
    /// Root of the documentation sources.
    pub srcdir: PathBuf,
    /// Document name: path relative to `srcdir` without suffix.
    pub docname: String,
    /// Tab width used when splitting text into lines.
    pub tab_width: usize,
    /// Extension configuration values.
    pub config: ConfigValues,
    dependencies: Arc<DependencyLog>,
}

impl BuildEnvironment {
    #[must_use]
    pub fn new(srcdir: impl Into<PathBuf>, docname: impl Into<String>) -> Self {
        Self {
            srcdir: srcdir.into(),
            docname: docname.into(),
            tab_width: DEFAULT_TAB_WIDTH,
            config: ConfigValues::default(),
            dependencies: Arc::new(DependencyLog::new()),
        }
    }

    #[must_use]
    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: ConfigValues) -> Self {
        self.config = config;
        self
    }

    /// Share a dependency log with other documents of the same build.
    #[must_use]
    pub fn with_dependency_log(mut self, log: Arc<DependencyLog>) -> Self {
        self.dependencies = log;
        self
    }

    /// Path of the document's source file.
    #[must_use]
    pub fn doc_path(&self) -> PathBuf {
        self.srcdir.join(format!("{}{SOURCE_SUFFIX}", self.docname))
    }

    /// Record that the current document depends on `path`.
    ///
    /// Relative paths are made absolute against the working directory.
    pub fn note_dependency(&self, path: &Path) {
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        self.dependencies.note(&self.docname, path);
    }

    #[must_use]
    pub fn dependency_log(&self) -> &Arc<DependencyLog> {
        &self.dependencies
    }
}
