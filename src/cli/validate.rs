//! Validate command.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::discovery::{detect_file_kind, read_json, read_markdown, FileKind, Project};
use crate::error::{ReceiptError, Result};
use crate::output::{display_path, plural, Printer};
use crate::validation::{validate_receipt, ValidationResult};

/// Check receipts against the receipt shape
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Files to validate (default: every receipt in the tree)
    pub files: Vec<PathBuf>,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

pub fn run(args: ValidateArgs, project: &Project, printer: &Printer) -> Result<()> {
    let files = if args.files.is_empty() {
        let scan = project.scan();
        let mut files = scan.json;
        files.extend(scan.markdown);
        files.sort();
        files
    } else {
        args.files
    };

    let mut total = ValidationResult::new();
    for path in &files {
        let result = validate_file(path)?;
        if result.is_ok() {
            printer.status("Checked", &display_path(path));
        } else if result.has_errors() {
            printer.error("Invalid", &display_path(path));
        } else {
            printer.warning("Checked", &display_path(path));
        }
        for diagnostic in result.iter() {
            printer.diagnostic(diagnostic);
        }
        total.merge(result);
    }

    printer.info("Validated", &plural(files.len(), "file", "files"));
    printer.validation_summary(&total);

    if total.has_errors() || (args.strict && total.warning_count() > 0) {
        return Err(ReceiptError::Validation {
            message: format!(
                "{}, {}",
                plural(total.error_count(), "error", "errors"),
                plural(total.warning_count(), "warning", "warnings")
            ),
            help: Some("Fix the fields listed above and run again".to_string()),
        });
    }
    Ok(())
}

/// Decode one receipt file and check it.
pub fn validate_file(path: &Path) -> Result<ValidationResult> {
    let root = match detect_file_kind(path) {
        Some(FileKind::Json) => read_json(path)?,
        Some(FileKind::Markdown) => read_markdown(path)?,
        None => {
            return Err(ReceiptError::Validation {
                message: format!("{} is not a .md or .json receipt", path.display()),
                help: None,
            })
        }
    };
    Ok(validate_receipt(&root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_validate_file_markdown() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("r.md");
        fs::write(&path, "---\njurisdiction: x\n---\n").unwrap();

        let result = validate_file(&path).unwrap();
        assert!(result.has_errors());
    }

    #[test]
    fn test_validate_file_rejects_other_extensions() {
        assert!(validate_file(Path::new("notes.txt")).is_err());
    }
}
