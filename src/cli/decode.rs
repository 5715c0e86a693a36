//! Decode command: markup to JSON.

use std::path::PathBuf;

use clap::Args;

use crate::error::{ReceiptError, Result};
use crate::export::to_json;
use crate::markup::{decode, extract_envelope};

use super::read_input;

/// Decode front matter to JSON on stdout
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Receipt document to read (default: stdin)
    pub file: Option<PathBuf>,

    /// Input is bare markup, not a `---` delimited document
    #[arg(long)]
    pub raw: bool,
}

pub fn run(args: DecodeArgs) -> Result<()> {
    let input = read_input(args.file.as_deref())?;

    let markup = if args.raw {
        input.as_str()
    } else {
        extract_envelope(&input).ok_or_else(|| ReceiptError::Parse {
            message: "No front matter found".to_string(),
            help: Some("Pass --raw to decode bare markup".to_string()),
        })?
    };

    println!("{}", to_json(&decode(markup))?);
    Ok(())
}
