//! Document tree build.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use kdoc_config::DocsConfig;
use kdoc_renderer::{
    Application, BuildEnvironment, ConfigValues, DependencyLog, Diagnostic, DocumentProcessor,
    DirectiveRegistry, Node, Severity, render_nodes,
};
use rayon::prelude::*;
use serde::Serialize;

use crate::scanner::{self, DocumentRef};

/// File the dependency log is written to, inside the output directory.
pub const DEPENDENCIES_FILENAME: &str = "deps.json";

/// Error returned by the builder.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Not a source document: {}", .0.display())]
    NotADocument(PathBuf),
}

impl BuildError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Output format of rendered documents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Html,
    /// Node tree and diagnostics as JSON.
    Json,
}

impl OutputFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Json => "json",
        }
    }
}

/// Outcome of building one document.
#[derive(Debug)]
pub struct DocumentReport {
    pub docname: String,
    /// Written output file; `None` when the document could not be parsed.
    pub output: Option<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Outcome of a build.
#[derive(Debug)]
pub struct BuildReport {
    pub documents: Vec<DocumentReport>,
    /// Files each document was built from, besides its own source.
    pub dependencies: BTreeMap<String, BTreeSet<PathBuf>>,
}

impl BuildReport {
    /// Number of diagnostics at warning level or above.
    #[must_use]
    pub fn problem_count(&self) -> usize {
        self.documents
            .iter()
            .flat_map(|d| &d.diagnostics)
            .filter(|d| d.severity >= Severity::Warning)
            .count()
    }
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    docname: &'a str,
    nodes: &'a [Node],
    diagnostics: &'a [Diagnostic],
}

/// Builds every document of a source tree with the directives of an
/// [`Application`].
///
/// Documents are processed in parallel when every loaded extension declares
/// itself parallel read safe.
pub struct Builder {
    app: Application,
    docs: DocsConfig,
    config: ConfigValues,
    format: OutputFormat,
}

impl Builder {
    /// Create a builder using the application's default config values.
    #[must_use]
    pub fn new(app: Application, docs: DocsConfig) -> Self {
        let config = app.config_values();
        Self {
            app,
            docs,
            config,
            format: OutputFormat::default(),
        }
    }

    /// Replace the config values passed to directives.
    #[must_use]
    pub fn with_config_values(mut self, config: ConfigValues) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Build the given source files, or every document when `paths` is empty.
    ///
    /// Document-level problems end up in the report; only I/O failures and
    /// paths outside the source directory fail the build.
    pub fn build(&self, paths: &[PathBuf]) -> Result<BuildReport, BuildError> {
        let documents = self.select(paths)?;
        let log = Arc::new(DependencyLog::new());
        let registry = self.app.registry();

        let reports: Vec<DocumentReport> = if self.app.parallel_read_safe() {
            documents
                .par_iter()
                .map(|doc| self.build_document(doc, &registry, &log))
                .collect::<Result<_, _>>()?
        } else {
            documents
                .iter()
                .map(|doc| self.build_document(doc, &registry, &log))
                .collect::<Result<_, _>>()?
        };

        let dependencies = log.snapshot();
        self.write_dependencies(&dependencies)?;

        let report = BuildReport {
            documents: reports,
            dependencies,
        };
        tracing::info!(
            documents = report.documents.len(),
            problems = report.problem_count(),
            "Build finished"
        );
        Ok(report)
    }

    fn select(&self, paths: &[PathBuf]) -> Result<Vec<DocumentRef>, BuildError> {
        if paths.is_empty() {
            return Ok(scanner::scan(&self.docs.source_dir));
        }

        paths
            .iter()
            .map(|path| {
                let absolute = std::path::absolute(path).map_err(|e| BuildError::io(path, e))?;
                let source_dir = std::path::absolute(&self.docs.source_dir)
                    .map_err(|e| BuildError::io(&self.docs.source_dir, e))?;
                let docname = scanner::docname_for(&source_dir, &absolute)
                    .ok_or_else(|| BuildError::NotADocument(path.clone()))?;
                Ok(DocumentRef {
                    docname,
                    path: absolute,
                })
            })
            .collect()
    }

    fn build_document(
        &self,
        doc: &DocumentRef,
        registry: &Arc<DirectiveRegistry>,
        log: &Arc<DependencyLog>,
    ) -> Result<DocumentReport, BuildError> {
        let text = fs::read_to_string(&doc.path).map_err(|e| BuildError::io(&doc.path, e))?;

        let env = BuildEnvironment::new(self.docs.source_dir.clone(), doc.docname.clone())
            .with_tab_width(self.docs.tab_width)
            .with_config(self.config.clone())
            .with_dependency_log(Arc::clone(log));
        let processor = DocumentProcessor::new(Arc::new(env), Arc::clone(registry));

        let processed = match processor.process(&text) {
            Ok(processed) => processed,
            Err(e) => {
                tracing::error!(docname = %doc.docname, error = %e, "Failed to parse document");
                return Ok(DocumentReport {
                    docname: doc.docname.clone(),
                    output: None,
                    diagnostics: vec![Diagnostic {
                        severity: Severity::Severe,
                        location: None,
                        message: e.to_string(),
                    }],
                });
            }
        };

        let content = match self.format {
            OutputFormat::Html => render_nodes(&processed.nodes),
            OutputFormat::Json => serde_json::to_string_pretty(&JsonDocument {
                docname: &doc.docname,
                nodes: &processed.nodes,
                diagnostics: &processed.diagnostics,
            })?,
        };

        let output = self
            .docs
            .output_dir
            .join(format!("{}.{}", doc.docname, self.format.extension()));
        write_file(&output, &content)?;
        tracing::debug!(docname = %doc.docname, output = %output.display(), "Wrote document");

        Ok(DocumentReport {
            docname: doc.docname.clone(),
            output: Some(output),
            diagnostics: processed.diagnostics,
        })
    }

    fn write_dependencies(
        &self,
        dependencies: &BTreeMap<String, BTreeSet<PathBuf>>,
    ) -> Result<(), BuildError> {
        let path = self.docs.output_dir.join(DEPENDENCIES_FILENAME);
        let content = serde_json::to_string_pretty(dependencies)?;
        write_file(&path, &content)
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| BuildError::io(path, e))
}
