//! Project discovery and receipt loading.
//!
//! A project is a directory with an optional `receipts.yaml` manifest. All
//! manifest paths are resolved against the manifest's directory.
//!
//! # Example
//!
//! ```ignore
//! use receipts::discovery::discover;
//!
//! let project = discover(".")?;
//! let loaded = project.load();
//! println!("Loaded {} receipts", loaded.len());
//! ```

mod loader;
mod manifest;
mod scanner;

use std::path::{Path, PathBuf};

use crate::error::Result;

pub use loader::{
    load_pair, load_receipts, read_json, read_markdown, LoadResult, LoadedReceipt, Origin, Skipped,
};
pub use manifest::{Manifest, DEFAULT_SOURCE_URL};
pub use scanner::{detect_file_kind, scan_directory, FileKind, ReceiptFiles, ScanResult};

/// The name of the manifest file.
pub const MANIFEST_FILENAME: &str = "receipts.yaml";

/// A project root and its configuration.
#[derive(Debug, Clone)]
pub struct Project {
    /// Directory manifest paths are relative to.
    pub root: PathBuf,

    /// The loaded manifest (default if no receipts.yaml found).
    pub manifest: Manifest,

    /// Whether a receipts.yaml manifest was found.
    pub has_manifest: bool,
}

impl Project {
    /// Resolve a manifest path against the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn receipts_dir(&self) -> PathBuf {
        self.resolve(&self.manifest.receipts)
    }

    pub fn ingest_dir(&self) -> PathBuf {
        self.resolve(&self.manifest.ingest)
    }

    pub fn feed_path(&self) -> PathBuf {
        self.resolve(&self.manifest.feed)
    }

    pub fn leaderboard_path(&self) -> PathBuf {
        self.resolve(&self.manifest.leaderboard)
    }

    /// Scan the receipt tree.
    pub fn scan(&self) -> ScanResult {
        scan_directory(&self.receipts_dir(), &self.manifest)
    }

    /// Scan and load every receipt in the tree.
    pub fn load(&self) -> LoadResult {
        load_receipts(&self.scan())
    }
}

/// Discover a project in a directory.
///
/// Looks for `receipts.yaml` in `root`; without one the defaults apply,
/// still relative to `root`.
pub fn discover(root: impl AsRef<Path>) -> Result<Project> {
    let root = root.as_ref().to_path_buf();

    let manifest_path = root.join(MANIFEST_FILENAME);
    let (manifest, has_manifest) = if manifest_path.exists() {
        (Manifest::load(&manifest_path)?, true)
    } else {
        (Manifest::default(), false)
    };

    Ok(Project {
        root,
        manifest,
        has_manifest,
    })
}

/// Open a project from an explicit manifest path.
pub fn open(manifest_path: &Path) -> Result<Project> {
    let manifest = Manifest::load(manifest_path)?;
    let root = manifest_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    Ok(Project {
        root,
        manifest,
        has_manifest: true,
    })
}
