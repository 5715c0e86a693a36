//! File system scanner for discovering receipt files.
//!
//! Recursively scans the receipt tree for `.md` documents and `.json`
//! sidecars, then pairs files that share a directory and stem.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::manifest::Manifest;

/// Result of scanning a directory for receipt files.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Markdown receipt documents, in walk order.
    pub markdown: Vec<PathBuf>,
    /// JSON sidecars, in walk order.
    pub json: Vec<PathBuf>,
}

/// The files backing one receipt: `<dir>/<stem>.json` and/or `<dir>/<stem>.md`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptFiles {
    /// `<dir>/<stem>` without an extension.
    pub stem: PathBuf,
    pub json: Option<PathBuf>,
    pub markdown: Option<PathBuf>,
}

impl ReceiptFiles {
    /// The file to name in messages, the JSON sidecar when there is one.
    pub fn display_path(&self) -> &Path {
        self.json
            .as_deref()
            .or(self.markdown.as_deref())
            .unwrap_or(&self.stem)
    }
}

impl ScanResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.markdown.len() + self.json.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn merge(&mut self, other: ScanResult) {
        self.markdown.extend(other.markdown);
        self.json.extend(other.json);
    }

    /// Group files by directory and stem, ordered by that key.
    pub fn pairs(&self) -> Vec<ReceiptFiles> {
        let mut grouped: BTreeMap<PathBuf, ReceiptFiles> = BTreeMap::new();

        for path in &self.json {
            slot(&mut grouped, path).json = Some(path.clone());
        }
        for path in &self.markdown {
            slot(&mut grouped, path).markdown = Some(path.clone());
        }

        grouped.into_values().collect()
    }
}

fn slot<'a>(grouped: &'a mut BTreeMap<PathBuf, ReceiptFiles>, path: &Path) -> &'a mut ReceiptFiles {
    let stem = path.with_extension("");
    grouped.entry(stem.clone()).or_insert_with(|| ReceiptFiles {
        stem,
        json: None,
        markdown: None,
    })
}

/// Kind of receipt file, by extension (case-insensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Markdown,
    Json,
}

pub fn detect_file_kind(path: &Path) -> Option<FileKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "md" => Some(FileKind::Markdown),
        "json" => Some(FileKind::Json),
        _ => None,
    }
}

/// Scan a directory for receipt files.
///
/// Entries are visited sorted by file name so that repeated runs see files
/// in the same order. A missing root yields an empty result.
pub fn scan_directory(root: &Path, manifest: &Manifest) -> ScanResult {
    let mut result = ScanResult::new();

    if !root.exists() {
        return result;
    }

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();

        let relative = path.strip_prefix(root).unwrap_or(path);
        if manifest.is_excluded(relative) {
            continue;
        }

        match detect_file_kind(path) {
            Some(FileKind::Markdown) => result.markdown.push(path.to_path_buf()),
            Some(FileKind::Json) => result.json.push(path.to_path_buf()),
            None => {}
        }
    }

    result
}
