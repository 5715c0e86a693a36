//! Project manifest (receipts.yaml) parsing.
//!
//! The manifest locates the receipt tree and derived outputs, and carries
//! the naming tables used when minting receipts from upstream records.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ReceiptError, Result};

/// The county inspection portal, used when a receipt has no usable source URL.
pub const DEFAULT_SOURCE_URL: &str =
    "https://stlouiscountymo.gov/st-louis-county-departments/public-health/food-and-restaurants/inspections/";

/// Project manifest loaded from receipts.yaml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Root of the receipt tree (`<venue-slug>/<date>.md|json`).
    pub receipts: PathBuf,

    /// Directory of upstream UCR JSON records.
    pub ingest: PathBuf,

    /// Output path of the recent-inspections feed.
    pub feed: PathBuf,

    /// Output path of the per-venue leaderboard.
    pub leaderboard: PathBuf,

    /// Maximum number of feed items.
    pub feed_limit: usize,

    pub jurisdiction: String,
    pub issuer: String,

    /// Stamped into `proof.attested_by` on minted receipts.
    pub attested_by: Option<String>,

    /// Canonical venue name -> mailing address.
    pub address_book: BTreeMap<String, String>,

    /// Upstream spelling -> canonical venue name.
    pub aliases: BTreeMap<String, String>,

    /// Canonical venue name -> parent facility.
    pub parents: BTreeMap<String, String>,

    /// Inspection id or venue name -> source URL.
    pub source_overrides: BTreeMap<String, String>,

    pub default_source_url: String,

    /// Patterns to exclude from the receipt walk.
    pub excludes: Vec<String>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            receipts: PathBuf::from("fixtures/receipts"),
            ingest: PathBuf::from("fixtures/ingest"),
            feed: PathBuf::from("fixtures/feed.json"),
            leaderboard: PathBuf::from("fixtures/leaderboard.json"),
            feed_limit: 20,
            jurisdiction: "St. Louis County, MO".to_string(),
            issuer: "St. Louis County Department of Public Health".to_string(),
            attested_by: None,
            address_book: BTreeMap::new(),
            aliases: BTreeMap::new(),
            parents: BTreeMap::new(),
            source_overrides: BTreeMap::new(),
            default_source_url: DEFAULT_SOURCE_URL.to_string(),
            excludes: vec![],
        }
    }
}

impl Manifest {
    /// Load manifest from a receipts.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ReceiptError::io(path, "Failed to read manifest", e))?;

        Self::parse(&content)
    }

    /// Parse manifest from YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        // An empty file deserializes as unit, not as an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| ReceiptError::Parse {
            message: format!("Invalid manifest: {}", e),
            help: Some("Check receipts.yaml syntax".to_string()),
        })
    }

    /// Fold an upstream venue spelling to its canonical name.
    pub fn canonical_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn parent_of(&self, name: &str) -> Option<&str> {
        self.parents.get(name).map(String::as_str)
    }

    /// Known mailing address, or empty.
    pub fn address_of(&self, name: &str) -> &str {
        self.address_book.get(name).map(String::as_str).unwrap_or("")
    }

    /// Override URL for a receipt, by inspection id first and then venue name.
    pub fn source_override(&self, id: &str, name: &str) -> Option<&str> {
        [id, name]
            .into_iter()
            .filter(|key| !key.is_empty())
            .find_map(|key| self.source_overrides.get(key))
            .map(String::as_str)
    }

    /// Check if a path should be excluded based on exclude patterns.
    ///
    /// Patterns are matched against `/`-separated path text: `*.ext` matches a
    /// suffix, `dir/*` and `**/dir/*` match anything under a `dir` component,
    /// and anything else matches as a substring.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path = path.to_string_lossy().replace('\\', "/");
        self.excludes.iter().any(|pattern| matches_pattern(&path, pattern))
    }
}

fn matches_pattern(path: &str, pattern: &str) -> bool {
    let pattern = pattern.strip_prefix("**/").unwrap_or(pattern);

    if let Some(dir) = pattern.strip_suffix("/*") {
        return path.starts_with(&format!("{}/", dir)) || path.contains(&format!("/{}/", dir));
    }
    if let Some(suffix) = pattern.strip_prefix('*') {
        if !suffix.contains('/') {
            return path.ends_with(suffix);
        }
    }
    path.contains(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_manifest() {
        let manifest = Manifest::parse("feed_limit: 5").unwrap();

        assert_eq!(manifest.feed_limit, 5);
        assert_eq!(manifest.receipts, PathBuf::from("fixtures/receipts"));
        assert!(manifest.aliases.is_empty());
    }

    #[test]
    fn test_parse_full_manifest() {
        let yaml = r#"
receipts: data/receipts
ingest: data/ucr
feed: public/feed.json
leaderboard: public/leaderboard.json
feed_limit: 10
jurisdiction: Example County
issuer: Example Health Dept
attested_by: Records Desk
address_book:
  Clayton High School: 1 Mark Twain Cir
aliases:
  Clayton HS - Cafeteria: Clayton High School
parents:
  Stuber Concession: Clayton High School
source_overrides:
  insp-42: https://example.org/42
default_source_url: https://example.org/
excludes:
  - "**/drafts/*"
"#;
        let manifest = Manifest::parse(yaml).unwrap();

        assert_eq!(manifest.receipts, PathBuf::from("data/receipts"));
        assert_eq!(manifest.feed_limit, 10);
        assert_eq!(manifest.attested_by.as_deref(), Some("Records Desk"));
        assert_eq!(manifest.canonical_name("Clayton HS - Cafeteria"), "Clayton High School");
        assert_eq!(manifest.parent_of("Stuber Concession"), Some("Clayton High School"));
        assert_eq!(manifest.address_of("Clayton High School"), "1 Mark Twain Cir");
        assert_eq!(manifest.default_source_url, "https://example.org/");
    }

    #[test]
    fn test_parse_empty_manifest() {
        let manifest = Manifest::parse("").unwrap();
        assert_eq!(manifest, Manifest::default());
    }

    #[test]
    fn test_parse_invalid_manifest() {
        assert!(Manifest::parse("feed_limit: lots").is_err());
    }

    #[test]
    fn test_unknown_names_pass_through() {
        let manifest = Manifest::default();

        assert_eq!(manifest.canonical_name("Somewhere Else"), "Somewhere Else");
        assert_eq!(manifest.parent_of("Somewhere Else"), None);
        assert_eq!(manifest.address_of("Somewhere Else"), "");
    }

    #[test]
    fn test_source_override_prefers_id() {
        let mut manifest = Manifest::default();
        manifest.source_overrides.insert("insp-1".into(), "https://by-id".into());
        manifest.source_overrides.insert("Venue".into(), "https://by-name".into());

        assert_eq!(manifest.source_override("insp-1", "Venue"), Some("https://by-id"));
        assert_eq!(manifest.source_override("insp-2", "Venue"), Some("https://by-name"));
        assert_eq!(manifest.source_override("", ""), None);
    }

    #[test]
    fn test_is_excluded() {
        let manifest = Manifest {
            excludes: vec!["*.bak".to_string(), "**/drafts/*".to_string()],
            ..Default::default()
        };

        assert!(manifest.is_excluded(Path::new("clayton/2025-01-01.md.bak")));
        assert!(manifest.is_excluded(Path::new("receipts/drafts/2025-01-01.md")));
        assert!(manifest.is_excluded(Path::new("drafts/x.md")));
        assert!(!manifest.is_excluded(Path::new("receipts/clayton/2025-01-01.md")));
    }
}
