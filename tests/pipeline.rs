//! End-to-end runs over a throwaway project built from the fixtures.

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use receipts::aggregate::WriteOutcome;
use receipts::discovery::{discover, Origin, Project};
use receipts::markup::{decode, extract_envelope};
use receipts::{build_feed, build_leaderboard, export, ingest, patch, validate_receipt, write_json_guarded};
use tempfile::{tempdir, TempDir};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn copy_fixture(name: &str, to: &Path) {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::copy(fixtures_dir().join(name), to).unwrap();
}

/// A project with the fixture manifest, both UCR records, and one
/// hand-written receipt.
fn project() -> (TempDir, Project) {
    let dir = tempdir().unwrap();
    copy_fixture("receipts.yaml", &dir.path().join("receipts.yaml"));
    for name in ["clayton-stuber-2025-02-01.json", "ladue-2025-01-15.json"] {
        copy_fixture(&format!("ingest/{}", name), &dir.path().join("ingest").join(name));
    }
    copy_fixture(
        "receipt.md",
        &dir.path().join("receipts/clayton-high-school/2025-03-14.md"),
    );

    let project = discover(dir.path()).unwrap();
    (dir, project)
}

#[test]
fn test_fixture_receipt_is_valid() {
    let source = fs::read_to_string(fixtures_dir().join("receipt.md")).unwrap();
    let markup = extract_envelope(&source).unwrap();

    let result = validate_receipt(&decode(markup));

    assert!(result.is_ok(), "{:?}", result.codes());
}

#[test]
fn test_ingest_mints_valid_receipts() {
    let (_dir, project) = project();

    let written = ingest::ingest_all(&project.ingest_dir(), &project.receipts_dir(), &project.manifest)
        .unwrap();

    let relative: Vec<_> = written
        .iter()
        .map(|p| p.strip_prefix(project.receipts_dir()).unwrap().to_path_buf())
        .collect();
    assert_eq!(
        relative,
        vec![
            Path::new("clayton-high-school-stuber-gymnasium-concession").join("2025-02-01.md"),
            Path::new("ladue-horton-watkins-high-school").join("2025-01-15.md"),
        ]
    );

    for path in &written {
        let source = fs::read_to_string(path).unwrap();
        let tree = decode(extract_envelope(&source).unwrap());
        let result = validate_receipt(&tree);
        assert!(!result.has_errors(), "{}: {:?}", path.display(), result.codes());
    }

    let stuber = fs::read_to_string(&written[0]).unwrap();
    assert!(stuber.contains("  parent: Clayton High School\n"));
    assert!(stuber.contains("  attested_by: Records Desk\n"));
    assert!(stuber.contains("  id: clayton-high-school-stuber-gymnasium-concession-2025-02-01-fu\n"));
}

#[test]
fn test_export_then_load_prefers_sidecars() {
    let (_dir, project) = project();
    ingest::ingest_all(&project.ingest_dir(), &project.receipts_dir(), &project.manifest).unwrap();

    let report = export::export_all(&project.scan()).unwrap();
    assert_eq!(report.written.len(), 3);
    assert!(report.skipped.is_empty());

    let loaded = project.load();
    assert_eq!(loaded.len(), 3);
    assert!(loaded.skipped.is_empty());
    assert!(loaded.receipts.iter().all(|r| r.origin == Origin::Json));
}

#[test]
fn test_feed_and_leaderboard() {
    let (dir, project) = project();
    ingest::ingest_all(&project.ingest_dir(), &project.receipts_dir(), &project.manifest).unwrap();
    let loaded = project.load();

    let feed = build_feed(loaded.iter(), project.manifest.feed_limit);
    let dates: Vec<_> = feed.iter().map(|i| i.date.as_str()).collect();
    assert_eq!(dates, vec!["2025-03-14", "2025-02-01", "2025-01-15"]);
    assert_eq!(feed[0].receipt_cid, "bafy-clayton-20250314");
    assert_eq!(feed[0].critical_count, 1);

    let rows = build_leaderboard(loaded.iter(), "2025-06-30");
    let standings: Vec<_> = rows.iter().map(|r| (r.school.as_str(), r.latest_score)).collect();
    assert_eq!(
        standings,
        vec![
            ("Ladue Horton Watkins High School", 97.0),
            ("Clayton High School", 92.0),
            ("Clayton High School — Stuber Gymnasium Concession", 88.0),
        ]
    );
    assert_eq!(rows[2].parent, "Clayton High School");
    assert_eq!(rows[2].criticals_ytd, 1);

    let outcome = write_json_guarded(&project.feed_path(), &feed).unwrap();
    assert_eq!(outcome, WriteOutcome::Written(3));
    assert!(dir.path().join("out/feed.json").exists());
}

#[test]
fn test_empty_tree_leaves_outputs_alone() {
    let dir = tempdir().unwrap();
    let project = discover(dir.path()).unwrap();
    fs::create_dir_all(dir.path().join("fixtures")).unwrap();
    fs::write(project.feed_path(), "[]").unwrap();

    let feed = build_feed(project.load().iter(), 20);
    let outcome = write_json_guarded(&project.feed_path(), &feed).unwrap();

    assert_eq!(outcome, WriteOutcome::SkippedEmpty);
    assert_eq!(fs::read_to_string(project.feed_path()).unwrap(), "[]");
}

#[test]
fn test_patch_urls_uses_overrides_and_normalizes() {
    let (_dir, project) = project();
    ingest::ingest_all(&project.ingest_dir(), &project.receipts_dir(), &project.manifest).unwrap();

    let changed = patch::patch_all(&project.scan(), &project.manifest).unwrap();
    assert_eq!(changed.len(), 2);

    let urls: Vec<_> = project
        .load()
        .iter()
        .map(|r| (r.entity.name.clone(), r.source.url.clone()))
        .collect();
    assert_eq!(
        urls,
        vec![
            (
                "Clayton High School".to_string(),
                "https://example.org/inspections/123".to_string()
            ),
            (
                "Clayton High School — Stuber Gymnasium Concession".to_string(),
                "https://example.org/inspections/88".to_string()
            ),
            (
                "Ladue Horton Watkins High School".to_string(),
                "https://example.org/inspections/ladue-77".to_string()
            ),
        ]
    );

    let again = patch::patch_all(&project.scan(), &project.manifest).unwrap();
    assert!(again.is_empty());
}

#[test]
fn test_patch_keeps_narrative_body() {
    let (_dir, project) = project();
    let path = project.receipts_dir().join("clayton-high-school/2025-03-14.md");
    let mut manifest = project.manifest.clone();
    manifest
        .source_overrides
        .insert("2025-0314-01".to_string(), "https://example.org/new".to_string());

    assert!(patch::patch_markdown_file(&path, &manifest).unwrap());

    let source = fs::read_to_string(&path).unwrap();
    assert!(source.ends_with("---\n\nInspector notes: follow-up scheduled for April.\n"));
    assert!(source.contains("  url: https://example.org/new\n"));
    assert!(source.contains("      narrative: |-\n        Raw chicken stored above produce in the walk-in.\n"));
}
