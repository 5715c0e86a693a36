//! Ingest command: UCR records to markdown receipts.

use std::path::PathBuf;

use clap::Args;

use crate::discovery::Project;
use crate::error::Result;
use crate::ingest::ingest_all;
use crate::output::{display_path, plural, Printer};

/// Mint markdown receipts from upstream UCR JSON records
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Directory of UCR records (default: manifest `ingest`)
    #[arg(long)]
    pub from: Option<PathBuf>,

    /// Receipt tree to write into (default: manifest `receipts`)
    #[arg(long)]
    pub to: Option<PathBuf>,
}

pub fn run(args: IngestArgs, project: &Project, printer: &Printer) -> Result<()> {
    let from = args.from.unwrap_or_else(|| project.ingest_dir());
    let to = args.to.unwrap_or_else(|| project.receipts_dir());

    let written = ingest_all(&from, &to, &project.manifest)?;
    for path in &written {
        printer.status("Minted", &display_path(path));
    }
    printer.success(
        "Finished",
        &format!("{} into {}", plural(written.len(), "receipt", "receipts"), display_path(&to)),
    );
    Ok(())
}
