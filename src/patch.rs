//! Source URL patching across the receipt tree.
//!
//! Every receipt's `source.url` is replaced by the best known link: a
//! manifest override (by inspection id, then venue name), else the existing
//! URL normalized to https, else the county portal.

use std::fs;
use std::path::{Path, PathBuf};

use crate::discovery::{read_json, FileKind, Manifest, ScanResult};
use crate::error::{ReceiptError, Result};
use crate::markup::{decode, encode, locate, wrap_envelope, Mapping, Value};

/// Force `https://` onto a URL-ish string. Blank input stays blank.
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() || url.starts_with("https://") {
        return url.to_string();
    }
    if let Some(rest) = url.strip_prefix("http://") {
        return format!("https://{}", rest);
    }
    if url.starts_with("//") {
        return format!("https:{}", url);
    }
    format!("https://{}", url.trim_start_matches('/'))
}

/// The URL a receipt should carry.
pub fn choose_url(manifest: &Manifest, id: &str, name: &str, existing: &str) -> String {
    if let Some(url) = manifest.source_override(id.trim(), name.trim()) {
        return url.to_string();
    }
    let normalized = normalize_url(existing);
    if normalized.is_empty() {
        manifest.default_source_url.clone()
    } else {
        normalized
    }
}

/// Rewrite `source.url` in a receipt tree. Returns whether anything changed.
pub fn patch_value(root: &mut Value, manifest: &Manifest) -> bool {
    let text = |path: &str| root.pointer(path).and_then(Value::to_text).unwrap_or_default();
    let id = text("inspection.id");
    let name = text("entity.name");
    let existing = root.pointer("source.url").and_then(Value::as_str).map(str::to_string);

    let url = choose_url(manifest, &id, &name, existing.as_deref().unwrap_or(""));
    if existing.as_deref() == Some(url.as_str()) {
        return false;
    }

    let Some(map) = root.as_mapping_mut() else {
        return false;
    };
    match map.get_mut("source").and_then(Value::as_mapping_mut) {
        Some(source) => source.insert("url", url),
        None => map.insert("source", Mapping::new().with("url", url)),
    }
    true
}

/// Patch a JSON receipt in place. Returns whether the file was rewritten.
pub fn patch_json_file(path: &Path, manifest: &Manifest) -> Result<bool> {
    let mut root = read_json(path)?;
    if !patch_value(&mut root, manifest) {
        return Ok(false);
    }

    let json = serde_json::to_string_pretty(&root).map_err(|e| ReceiptError::Parse {
        message: format!("Failed to serialize {}: {}", path.display(), e),
        help: None,
    })?;
    fs::write(path, json).map_err(|e| ReceiptError::io(path, "Failed to write", e))?;
    Ok(true)
}

/// Patch a markdown receipt in place, keeping the text around the envelope.
///
/// Documents without an envelope are left alone.
pub fn patch_markdown_file(path: &Path, manifest: &Manifest) -> Result<bool> {
    let content =
        fs::read_to_string(path).map_err(|e| ReceiptError::io(path, "Failed to read", e))?;
    let Some(envelope) = locate(&content) else {
        return Ok(false);
    };

    let mut root = decode(envelope.markup);
    if !patch_value(&mut root, manifest) {
        return Ok(false);
    }

    let document = format!(
        "{}{}",
        envelope.preamble,
        wrap_envelope(&encode(&root)?, envelope.body)
    );
    fs::write(path, document).map_err(|e| ReceiptError::io(path, "Failed to write", e))?;
    Ok(true)
}

/// Patch every receipt file in a scan. Returns the rewritten paths.
pub fn patch_all(scan: &ScanResult, manifest: &Manifest) -> Result<Vec<PathBuf>> {
    let files = scan
        .json
        .iter()
        .map(|p| (p, FileKind::Json))
        .chain(scan.markdown.iter().map(|p| (p, FileKind::Markdown)));

    let mut changed = Vec::new();
    for (path, kind) in files {
        let rewritten = match kind {
            FileKind::Json => patch_json_file(path, manifest)?,
            FileKind::Markdown => patch_markdown_file(path, manifest)?,
        };
        if rewritten {
            changed.push(path.clone());
        }
    }
    Ok(changed)
}
