//! Feed command.

use std::path::PathBuf;

use clap::Args;

use crate::aggregate::{build_feed, write_json_guarded, WriteOutcome};
use crate::discovery::{LoadResult, Project};
use crate::error::Result;
use crate::output::{display_path, plural, Printer};

/// Build the recent-inspections feed
#[derive(Args, Debug)]
pub struct FeedArgs {
    /// Maximum number of items (default: manifest `feed_limit`)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output path (default: manifest `feed`)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn run(args: FeedArgs, project: &Project, printer: &Printer) -> Result<()> {
    let loaded = project.load();
    report_skipped(&loaded, printer);

    let limit = args.limit.unwrap_or(project.manifest.feed_limit);
    let output = args.output.unwrap_or_else(|| project.feed_path());
    let feed = build_feed(loaded.iter(), limit);

    match write_json_guarded(&output, &feed)? {
        WriteOutcome::Written(n) => {
            printer.success("Wrote", &format!("{} ({})", display_path(&output), plural(n, "item", "items")))
        }
        WriteOutcome::SkippedEmpty => printer.warning(
            "Skipping",
            &format!("no receipts found, left {} intact", display_path(&output)),
        ),
    }
    Ok(())
}

/// Mention files the loader left out.
pub(crate) fn report_skipped(loaded: &LoadResult, printer: &Printer) {
    for skipped in &loaded.skipped {
        printer.warning(
            "Skipping",
            &format!("{} {}", display_path(&skipped.path), printer.dim(&format!("({})", skipped.reason))),
        );
    }
}
