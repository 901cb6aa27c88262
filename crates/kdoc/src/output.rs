//! Colored terminal output utilities.

use console::{Style, Term};
use kdoc_renderer::{Diagnostic, Severity};

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
        }
    }

    /// Print an info message.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print a warning message (yellow).
    pub(crate) fn warning(&self, msg: &str) {
        let _ = self.term.write_line(&self.yellow.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Print a diagnostic colored by severity; info is plain.
    pub(crate) fn diagnostic(&self, diagnostic: &Diagnostic) {
        let msg = diagnostic.to_string();
        match diagnostic.severity {
            Severity::Info => self.info(&msg),
            Severity::Warning => self.warning(&msg),
            Severity::Error | Severity::Severe => self.error(&msg),
        }
    }
}
