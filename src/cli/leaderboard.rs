//! Leaderboard command.

use std::path::PathBuf;

use clap::Args;

use crate::aggregate::{build_leaderboard, write_json_guarded, WriteOutcome};
use crate::date::{is_iso_date, today_utc};
use crate::discovery::Project;
use crate::error::{ReceiptError, Result};
use crate::output::{display_path, plural, Printer};

use super::feed::report_skipped;

/// Build the per-venue leaderboard
#[derive(Args, Debug)]
pub struct LeaderboardArgs {
    /// Reference date, YYYY-MM-DD (default: today, UTC)
    #[arg(long)]
    pub today: Option<String>,

    /// Output path (default: manifest `leaderboard`)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn run(args: LeaderboardArgs, project: &Project, printer: &Printer) -> Result<()> {
    let today = match args.today {
        Some(date) if is_iso_date(&date) => date,
        Some(date) => {
            return Err(ReceiptError::Validation {
                message: format!("--today '{}' is not a date", date),
                help: Some("Use YYYY-MM-DD".to_string()),
            })
        }
        None => today_utc(),
    };

    let loaded = project.load();
    report_skipped(&loaded, printer);

    let output = args.output.unwrap_or_else(|| project.leaderboard_path());
    let rows = build_leaderboard(loaded.iter(), &today);

    match write_json_guarded(&output, &rows)? {
        WriteOutcome::Written(n) => {
            printer.success("Wrote", &format!("{} ({})", display_path(&output), plural(n, "row", "rows")))
        }
        WriteOutcome::SkippedEmpty => printer.warning(
            "Skipping",
            &format!("no receipts found, left {} intact", display_path(&output)),
        ),
    }
    Ok(())
}
