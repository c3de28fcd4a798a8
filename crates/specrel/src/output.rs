//! Styled stderr output for the CLI.

use console::{Style, Term};

/// Writes user-facing status lines to stderr.
pub(crate) struct Output {
    term: Term,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    pub(crate) fn info(&self, msg: &str) {
        self.line(&Style::new(), msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.line(&Style::new().green(), msg);
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.line(&Style::new().yellow(), msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.line(&Style::new().red().bold(), msg);
    }

    fn line(&self, style: &Style, msg: &str) {
        let _ = self.term.write_line(&style.apply_to(msg).to_string());
    }
}
