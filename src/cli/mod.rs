pub mod completions;
pub mod decode;
pub mod encode;
pub mod export;
pub mod feed;
pub mod ingest;
pub mod leaderboard;
pub mod patch;
pub mod validate;

use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::discovery::{self, Project};
use crate::error::{ReceiptError, Result};

/// receipts - Public inspection receipts toolchain
#[derive(Parser, Debug)]
#[command(name = "receipts")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to receipts.yaml (default: ./receipts.yaml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mint markdown receipts from upstream UCR JSON records
    Ingest(ingest::IngestArgs),

    /// Write JSON sidecars next to markdown receipts
    Export(export::ExportArgs),

    /// Build the recent-inspections feed
    Feed(feed::FeedArgs),

    /// Build the per-venue leaderboard
    Leaderboard(leaderboard::LeaderboardArgs),

    /// Normalize and override receipt source URLs
    PatchUrls(patch::PatchArgs),

    /// Check receipts against the receipt shape
    Validate(validate::ValidateArgs),

    /// Decode front matter to JSON on stdout
    Decode(decode::DecodeArgs),

    /// Encode JSON to front-matter markup on stdout
    Encode(encode::EncodeArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// The project named by `--config`, or the one in the working directory.
pub fn load_project(config: Option<&Path>) -> Result<Project> {
    match config {
        Some(path) => discovery::open(path),
        None => discovery::discover("."),
    }
}

/// Read a file, or stdin when no path (or `-`) is given.
pub(crate) fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .map_err(|e| ReceiptError::io(path, "Failed to read", e)),
        _ => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}
