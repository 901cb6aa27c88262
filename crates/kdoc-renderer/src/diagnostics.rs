//! Diagnostics collected while parsing a document.

use std::fmt;

use crate::node::SourceLocation;

/// Diagnostic severity, in increasing order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(rename_all = "lowercase"))]
pub enum Severity {
    Info,
    Warning,
    Error,
    Severe,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Severe => "SEVERE",
        };
        f.write_str(label)
    }
}

/// A message attached to a source location.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Diagnostic {
    pub severity: Severity,
    pub location: Option<SourceLocation>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{location}: {}: {}", self.severity, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

/// Collects diagnostics and mirrors them to `tracing`.
#[derive(Debug, Default)]
pub struct Reporter {
    diagnostics: Vec<Diagnostic>,
}

impl Reporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn report(
        &mut self,
        severity: Severity,
        location: Option<SourceLocation>,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            severity,
            location,
            message: message.into(),
        };

        match severity {
            Severity::Info => tracing::debug!("{diagnostic}"),
            Severity::Warning => tracing::warn!("{diagnostic}"),
            Severity::Error | Severity::Severe => tracing::error!("{diagnostic}"),
        }

        self.diagnostics.push(diagnostic);
    }

    pub fn warning(&mut self, location: Option<SourceLocation>, message: impl Into<String>) {
        self.report(Severity::Warning, location, message);
    }

    pub fn error(&mut self, location: Option<SourceLocation>, message: impl Into<String>) {
        self.report(Severity::Error, location, message);
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
