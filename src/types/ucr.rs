//! Upstream civic records (UCR) consumed by ingest.

use serde::{Deserialize, Serialize};

use crate::types::Violation;

/// One upstream inspection record, as delivered in `fixtures/ingest/*.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ucr {
    pub schema: String,
    pub subject: Subject,
    pub payload: Payload,
    pub evidence: Evidence,
    pub time: Time,
    pub cid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    #[serde(rename = "type")]
    pub kind: String,
    /// The venue name as the upstream system spells it.
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub inspection_id: Option<String>,
    pub inspection_type: String,
    pub score_100: f64,
    #[serde(default)]
    pub grade_raw: Option<String>,
    #[serde(default)]
    pub violations: Vec<Violation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub source_system: String,
    pub source_url: String,
    #[serde(default)]
    pub checksum_sha256: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Time {
    /// Inspection date, `YYYY-MM-DD`.
    pub observed: String,
    pub ingested: String,
}

impl Ucr {
    pub fn critical_count(&self) -> u32 {
        self.payload.violations.iter().filter(|v| v.critical).count() as u32
    }

    pub fn noncritical_count(&self) -> u32 {
        self.payload.violations.iter().filter(|v| !v.critical).count() as u32
    }
}
