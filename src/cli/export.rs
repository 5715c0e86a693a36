//! Export command: JSON sidecars for markdown receipts.

use clap::Args;

use crate::discovery::Project;
use crate::error::Result;
use crate::export::export_all;
use crate::output::{display_path, plural, Printer};

/// Write JSON sidecars next to markdown receipts
#[derive(Args, Debug)]
pub struct ExportArgs {}

pub fn run(_args: ExportArgs, project: &Project, printer: &Printer) -> Result<()> {
    let report = export_all(&project.scan())?;

    for path in &report.skipped {
        printer.warning("Skipping", &format!("{} (no front matter)", display_path(path)));
    }

    if report.written.is_empty() {
        printer.warning("Finished", "found no markdown receipts to convert");
    } else {
        printer.success(
            "Exported",
            &plural(report.written.len(), "JSON sidecar", "JSON sidecars"),
        );
    }
    Ok(())
}
