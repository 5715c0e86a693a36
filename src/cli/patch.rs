//! Patch-urls command.

use clap::Args;

use crate::discovery::Project;
use crate::error::Result;
use crate::output::{display_path, plural, Printer};
use crate::patch::patch_all;

/// Normalize and override receipt source URLs
#[derive(Args, Debug)]
pub struct PatchArgs {}

pub fn run(_args: PatchArgs, project: &Project, printer: &Printer) -> Result<()> {
    if project.manifest.source_overrides.is_empty() {
        printer.info("Note", "no source_overrides in the manifest, only normalizing");
    }

    let changed = patch_all(&project.scan(), &project.manifest)?;
    for path in &changed {
        printer.status("Patched", &display_path(path));
    }
    printer.success(
        "Finished",
        &format!("{} changed", plural(changed.len(), "file", "files")),
    );
    Ok(())
}
