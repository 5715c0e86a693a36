//! Terminal output for the receipts CLI.
//!
//! Status lines go to stderr with a right-aligned coloured verb, in the
//! style of Cargo. stdout carries only machine-readable output (decoded
//! JSON, encoded markup).

use std::io::{self, IsTerminal, Write};
use std::path::Path;

use crate::validation::{Diagnostic, Severity, ValidationResult};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

/// Width of the verb column.
const VERB_WIDTH: usize = 12;

/// Status printer for stderr.
///
/// Colour is on when stderr is a terminal.
pub struct Printer {
    color: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self::with_color(io::stderr().is_terminal())
    }

    pub fn with_color(color: bool) -> Self {
        Self { color }
    }

    /// Work in progress, e.g. `     Minting clayton-high-school/2025-02-01.md`.
    pub fn status(&self, verb: &str, message: &str) {
        self.line(GREEN, verb, message);
    }

    pub fn success(&self, verb: &str, message: &str) {
        self.line(GREEN, verb, message);
    }

    pub fn info(&self, verb: &str, message: &str) {
        self.line(CYAN, verb, message);
    }

    pub fn warning(&self, verb: &str, message: &str) {
        self.line(YELLOW, verb, message);
    }

    pub fn error(&self, verb: &str, message: &str) {
        self.line(RED, verb, message);
    }

    pub fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    pub fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    pub fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }

    /// One validation finding, indented under the file's status line.
    pub fn diagnostic(&self, diagnostic: &Diagnostic) {
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "{}", self.format_diagnostic(diagnostic));
    }

    /// Closing line for a validation run.
    pub fn validation_summary(&self, result: &ValidationResult) {
        let errors = plural(result.error_count(), "error", "errors");
        let warnings = plural(result.warning_count(), "warning", "warnings");
        if result.has_errors() {
            self.error("Failed", &format!("{}, {}", errors, warnings));
        } else if result.warning_count() > 0 {
            self.warning("Passed", &format!("with {}", warnings));
        } else {
            self.success("Passed", "no issues");
        }
    }

    pub fn format_diagnostic(&self, d: &Diagnostic) -> String {
        let label = match d.severity {
            Severity::Error => self.paint(&format!("{BOLD}{RED}"), "error"),
            Severity::Warning => self.paint(&format!("{BOLD}{YELLOW}"), "warning"),
        };
        let mut out = format!("  {}[{}]", label, d.code);
        if let Some(field) = &d.field {
            out.push(' ');
            out.push_str(&self.cyan(field));
        }
        out.push_str(": ");
        out.push_str(&d.message);
        if let Some(help) = &d.help {
            out.push_str(&format!("\n    {}", self.dim(&format!("help: {}", help))));
        }
        out
    }

    fn paint(&self, style: &str, text: &str) -> String {
        if self.color {
            format!("{style}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn line(&self, color: &str, verb: &str, message: &str) {
        let mut stderr = io::stderr().lock();
        if self.color {
            let _ = writeln!(stderr, "{BOLD}{color}{verb:>VERB_WIDTH$}{RESET} {message}");
        } else {
            let _ = writeln!(stderr, "{verb:>VERB_WIDTH$} {message}");
        }
    }
}

/// `plural(1, "receipt", "receipts")` is "1 receipt".
pub fn plural(n: usize, singular: &str, pluralized: &str) -> String {
    format!("{} {}", n, if n == 1 { singular } else { pluralized })
}

/// Path relative to the working directory when it is underneath it.
pub fn display_path(path: &Path) -> String {
    let relative = std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf));
    match relative {
        Some(p) if p.as_os_str().is_empty() => ".".to_string(),
        Some(p) => p.display().to_string(),
        None => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural() {
        assert_eq!(plural(0, "receipt", "receipts"), "0 receipts");
        assert_eq!(plural(1, "receipt", "receipts"), "1 receipt");
        assert_eq!(plural(3, "file", "files"), "3 files");
    }

    #[test]
    fn test_display_path_outside_cwd() {
        let p = Path::new("/nonexistent/path/to/file");
        assert_eq!(display_path(p), "/nonexistent/path/to/file");
    }

    #[test]
    fn test_format_diagnostic_plain() {
        let printer = Printer::with_color(false);
        let d = Diagnostic::warning("receipts::validate::score-range", "Score 120 is outside 0-100")
            .at("inspection.score")
            .with_help("Scores are out of 100");

        assert_eq!(
            printer.format_diagnostic(&d),
            "  warning[receipts::validate::score-range] inspection.score: Score 120 is outside 0-100\n    help: Scores are out of 100"
        );
    }

    #[test]
    fn test_format_diagnostic_coloured() {
        let printer = Printer::with_color(true);
        let d = Diagnostic::error("receipts::validate::bad-date", "nope");

        let out = printer.format_diagnostic(&d);
        assert!(out.contains(RED));
        assert!(out.ends_with(": nope"));
    }
}
