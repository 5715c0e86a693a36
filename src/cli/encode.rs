//! Encode command: JSON to markup.

use std::path::PathBuf;

use clap::Args;

use crate::error::{ReceiptError, Result};
use crate::markup::{encode_at, wrap_envelope, Value};

use super::read_input;

/// Encode JSON to front-matter markup on stdout
#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// JSON file to read (default: stdin)
    pub file: Option<PathBuf>,

    /// Starting indentation level (two spaces per level)
    #[arg(long, default_value = "0")]
    pub indent: usize,

    /// Wrap the markup in `---` delimiters
    #[arg(long, conflicts_with = "indent")]
    pub envelope: bool,
}

pub fn run(args: EncodeArgs) -> Result<()> {
    let input = read_input(args.file.as_deref())?;
    let value: Value = serde_json::from_str(&input).map_err(|e| ReceiptError::Parse {
        message: format!("Invalid JSON: {}", e),
        help: None,
    })?;

    let markup = encode_at(&value, args.indent)?;
    if args.envelope {
        print!("{}", wrap_envelope(&markup, ""));
    } else {
        println!("{}", markup);
    }
    Ok(())
}
