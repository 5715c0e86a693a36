//! Minting receipt documents from upstream civic records (UCR).
//!
//! Each UCR JSON file becomes `<receipts>/<venue-slug>/<observed>.md`, with
//! the venue name folded through the manifest's alias table and the proof
//! block stamped with a payload checksum.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::discovery::{detect_file_kind, FileKind, Manifest};
use crate::error::{ReceiptError, Result};
use crate::markup::{encode, wrap_envelope, Value};
use crate::types::{Entity, Inspection, Proof, Receipt, Source, Ucr};

pub const RECEIPT_VERSION: u32 = 1;
pub const RECEIPT_KIND: &str = "food_inspection";
pub const ENTITY_TYPE: &str = "school";
pub const PROOF_METHOD: &str = "human-transcribed";

/// An upstream record together with its raw tree.
///
/// The raw tree keeps the payload's source key order for checksumming.
#[derive(Debug, Clone)]
pub struct UcrRecord {
    pub ucr: Ucr,
    pub raw: Value,
}

impl UcrRecord {
    pub fn parse(json: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(json).map_err(|e| ReceiptError::Parse {
            message: format!("Invalid UCR JSON: {}", e),
            help: None,
        })?;
        let ucr: Ucr = serde_json::from_str(json).map_err(|e| ReceiptError::Parse {
            message: format!("Unexpected UCR shape: {}", e),
            help: Some("Expected schema, subject, payload, evidence, time and cid".to_string()),
        })?;
        Ok(Self { ucr, raw })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json =
            fs::read_to_string(path).map_err(|e| ReceiptError::io(path, "Failed to read", e))?;
        Self::parse(&json).map_err(|e| match e {
            ReceiptError::Parse { message, help } => ReceiptError::Parse {
                message: format!("{}: {}", path.display(), message),
                help,
            },
            other => other,
        })
    }
}

/// A minted receipt and the document text rendered for it.
#[derive(Debug, Clone)]
pub struct Minted {
    /// Path relative to the receipts root.
    pub relative_path: PathBuf,
    pub receipt: Receipt,
    pub document: String,
}

/// Lowercase, with every run of characters outside `[a-z0-9]` collapsed to
/// one `-` and no leading or trailing `-`.
pub fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut gap = false;
    for c in s.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if gap && !out.is_empty() {
                out.push('-');
            }
            out.push(c);
            gap = false;
        } else {
            gap = true;
        }
    }
    out
}

/// `<venue-slug>-<observed>-<rt|fu>`, where `fu` marks follow-up inspections.
pub fn fallback_id(venue: &str, observed: &str, inspection_type: &str) -> String {
    let type_key = if inspection_type.to_lowercase().contains("follow") {
        "fu"
    } else {
        "rt"
    };
    format!("{}-{}-{}", slug(venue), observed, type_key)
}

/// Hex SHA-256 of the compact JSON rendering of a payload tree.
pub fn payload_checksum(payload: &Value) -> Result<String> {
    let json = serde_json::to_string(payload).map_err(|e| ReceiptError::Parse {
        message: format!("Payload is not representable as JSON: {}", e),
        help: None,
    })?;
    Ok(format!("{:x}", Sha256::digest(json.as_bytes())))
}

/// Build the receipt for one upstream record.
pub fn convert(record: &UcrRecord, manifest: &Manifest) -> Result<Receipt> {
    let ucr = &record.ucr;
    let venue = manifest.canonical_name(&ucr.subject.id).to_string();

    let id = match ucr.payload.inspection_id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => fallback_id(&venue, &ucr.time.observed, &ucr.payload.inspection_type),
    };

    let checksum = match ucr.evidence.checksum_sha256.as_deref() {
        Some(sum) if !sum.is_empty() => sum.to_string(),
        _ => payload_checksum(record.raw.get("payload").unwrap_or(&Value::Null))?,
    };

    Ok(Receipt {
        receipt_version: Some(RECEIPT_VERSION),
        kind: Some(RECEIPT_KIND.to_string()),
        jurisdiction: manifest.jurisdiction.clone(),
        issuer: manifest.issuer.clone(),
        entity: Entity {
            kind: ENTITY_TYPE.to_string(),
            parent: manifest.parent_of(&venue).map(str::to_string),
            address: Some(manifest.address_of(&venue).to_string()),
            name: venue,
        },
        source: Source {
            system: ucr.evidence.source_system.clone(),
            url: ucr.evidence.source_url.clone(),
            fetched_at: Some(ucr.time.ingested.clone()),
        },
        inspection: Inspection {
            id,
            kind: ucr.payload.inspection_type.clone(),
            date: ucr.time.observed.clone(),
            score: ucr.payload.score_100,
            grade_raw: ucr.payload.grade_raw.clone(),
            critical_violations: ucr.critical_count(),
            noncritical_violations: ucr.noncritical_count(),
            violations: Some(ucr.payload.violations.clone()),
        },
        proof: Some(Proof {
            method: Some(PROOF_METHOD.to_string()),
            attested_by: manifest.attested_by.clone(),
            payload_checksum_sha256: Some(checksum),
            cid: Some(ucr.cid.clone()),
            schema: Some(ucr.schema.clone()),
        }),
    })
}

/// Convert and render one record.
pub fn mint(record: &UcrRecord, manifest: &Manifest) -> Result<Minted> {
    let receipt = convert(record, manifest)?;
    let markup = encode(&receipt.to_value())?;
    let relative_path = Path::new(&slug(&receipt.entity.name))
        .join(format!("{}.md", receipt.inspection.date));

    Ok(Minted {
        relative_path,
        document: wrap_envelope(&markup, ""),
        receipt,
    })
}

/// The UCR files directly inside the ingest directory, sorted by name.
pub fn ingest_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| detect_file_kind(p) == Some(FileKind::Json))
        .collect()
}

/// Mint every UCR file in `ingest_dir` into `receipts_dir`.
///
/// Returns the written paths. Fails without writing anything when the
/// ingest directory holds no records, or when any record fails to parse.
pub fn ingest_all(ingest_dir: &Path, receipts_dir: &Path, manifest: &Manifest) -> Result<Vec<PathBuf>> {
    let files = ingest_files(ingest_dir);
    if files.is_empty() {
        return Err(ReceiptError::Validation {
            message: format!("No ingest JSON in {}", ingest_dir.display()),
            help: Some("Place UCR records (*.json) in the manifest's ingest directory".to_string()),
        });
    }

    let minted = files
        .iter()
        .map(|path| UcrRecord::load(path).and_then(|record| mint(&record, manifest)))
        .collect::<Result<Vec<_>>>()?;

    let mut written = Vec::with_capacity(minted.len());
    for item in minted {
        let path = receipts_dir.join(&item.relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ReceiptError::io(parent, "Failed to create directory", e))?;
        }
        fs::write(&path, &item.document)
            .map_err(|e| ReceiptError::io(&path, "Failed to write", e))?;
        written.push(path);
    }

    Ok(written)
}
