//! Receipt loader - reads paired files into typed receipts.
//!
//! A JSON sidecar wins over its markdown document. When the sidecar is
//! missing or unreadable the markdown envelope is decoded instead. Files
//! that yield nothing usable are reported as skipped, never as errors.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ReceiptError, Result};
use crate::markup::{decode, extract_envelope, Value};
use crate::types::Receipt;

use super::scanner::{ReceiptFiles, ScanResult};

/// Which file a receipt was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Json,
    Markdown,
}

#[derive(Debug, Clone)]
pub struct LoadedReceipt {
    pub path: PathBuf,
    pub origin: Origin,
    pub receipt: Receipt,
}

/// A record that was left out, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct LoadResult {
    pub receipts: Vec<LoadedReceipt>,
    pub skipped: Vec<Skipped>,
}

impl LoadResult {
    pub fn len(&self) -> usize {
        self.receipts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receipts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Receipt> {
        self.receipts.iter().map(|r| &r.receipt)
    }
}

/// Load every paired record in the scan.
pub fn load_receipts(scan: &ScanResult) -> LoadResult {
    let mut result = LoadResult::default();

    for files in scan.pairs() {
        match load_pair(&files) {
            Ok(loaded) => {
                let missing = missing_key_field(&loaded.receipt);
                match missing {
                    Some(field) => result.skipped.push(Skipped {
                        path: loaded.path,
                        reason: format!("no {}", field),
                    }),
                    None => result.receipts.push(loaded),
                }
            }
            Err(e) => result.skipped.push(Skipped {
                path: files.display_path().to_path_buf(),
                reason: e.to_string(),
            }),
        }
    }

    result
}

/// Load one record, preferring its JSON sidecar.
pub fn load_pair(files: &ReceiptFiles) -> Result<LoadedReceipt> {
    let mut json_error = None;

    if let Some(path) = &files.json {
        match read_json(path).and_then(|v| Receipt::from_value(&v)) {
            Ok(receipt) => {
                return Ok(LoadedReceipt {
                    path: path.clone(),
                    origin: Origin::Json,
                    receipt,
                })
            }
            Err(e) => json_error = Some(e),
        }
    }

    if let Some(path) = &files.markdown {
        let receipt = Receipt::from_value(&read_markdown(path)?)?;
        return Ok(LoadedReceipt {
            path: path.clone(),
            origin: Origin::Markdown,
            receipt,
        });
    }

    Err(json_error.unwrap_or_else(|| ReceiptError::Parse {
        message: format!("No files for {}", files.stem.display()),
        help: None,
    }))
}

/// Read a JSON receipt into a value tree, keeping key order.
pub fn read_json(path: &Path) -> Result<Value> {
    let content =
        fs::read_to_string(path).map_err(|e| ReceiptError::io(path, "Failed to read", e))?;

    serde_json::from_str(&content).map_err(|e| ReceiptError::Parse {
        message: format!("{}: {}", path.display(), e),
        help: None,
    })
}

/// Read a markdown receipt's envelope into a value tree.
pub fn read_markdown(path: &Path) -> Result<Value> {
    let content =
        fs::read_to_string(path).map_err(|e| ReceiptError::io(path, "Failed to read", e))?;

    let markup = extract_envelope(&content).ok_or_else(|| ReceiptError::Parse {
        message: format!("{}: no front matter", path.display()),
        help: Some("Receipts start with a block between two `---` lines".to_string()),
    })?;

    Ok(decode(markup))
}

/// Records must name a venue and a date to be placed anywhere.
fn missing_key_field(receipt: &Receipt) -> Option<&'static str> {
    if receipt.inspection.date.is_empty() {
        Some("inspection.date")
    } else if receipt.entity.name.is_empty() {
        Some("entity.name")
    } else {
        None
    }
}
