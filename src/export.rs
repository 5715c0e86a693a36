//! JSON sidecars for markdown receipts.
//!
//! Each `<stem>.md` with an envelope gets a `<stem>.json` next to it holding
//! the decoded tree, keys in document order.

use std::fs;
use std::path::{Path, PathBuf};

use crate::discovery::ScanResult;
use crate::error::{ReceiptError, Result};
use crate::markup::{decode, extract_envelope, Value};

#[derive(Debug, Default)]
pub struct ExportReport {
    pub written: Vec<PathBuf>,
    /// Markdown files without an envelope.
    pub skipped: Vec<PathBuf>,
}

/// Pretty JSON for a decoded tree.
pub fn to_json(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| ReceiptError::Parse {
        message: format!("Tree is not representable as JSON: {}", e),
        help: None,
    })
}

/// Write the sidecar for one document. `None` when it has no envelope.
pub fn export_markdown(path: &Path) -> Result<Option<PathBuf>> {
    let content =
        fs::read_to_string(path).map_err(|e| ReceiptError::io(path, "Failed to read", e))?;
    let Some(markup) = extract_envelope(&content) else {
        return Ok(None);
    };

    let out = path.with_extension("json");
    fs::write(&out, to_json(&decode(markup))?)
        .map_err(|e| ReceiptError::io(&out, "Failed to write", e))?;
    Ok(Some(out))
}

pub fn export_all(scan: &ScanResult) -> Result<ExportReport> {
    let mut report = ExportReport::default();
    for path in &scan.markdown {
        match export_markdown(path)? {
            Some(out) => report.written.push(out),
            None => report.skipped.push(path.clone()),
        }
    }
    Ok(report)
}
