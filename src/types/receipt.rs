//! The receipt record decoded from a document's front matter.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ReceiptError, Result};
use crate::markup::{Mapping, Value};

/// One inspection record plus provenance and proof metadata.
///
/// Deserialization is lenient: every field defaults, and text fields accept
/// numbers and booleans (the decoder reads `code: 101` as a number). Shape
/// checks live in [`crate::validation`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Receipt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_version: Option<u32>,
    #[serde(deserialize_with = "opt_text", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "text")]
    pub jurisdiction: String,
    #[serde(deserialize_with = "text")]
    pub issuer: String,
    pub entity: Entity,
    pub source: Source,
    pub inspection: Inspection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

/// The inspected facility.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Entity {
    #[serde(rename = "type", deserialize_with = "text")]
    pub kind: String,
    #[serde(deserialize_with = "text")]
    pub name: String,
    #[serde(deserialize_with = "opt_text")]
    pub parent: Option<String>,
    #[serde(deserialize_with = "opt_text", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Where the inspection was published.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Source {
    #[serde(deserialize_with = "text")]
    pub system: String,
    #[serde(deserialize_with = "text")]
    pub url: String,
    #[serde(deserialize_with = "opt_text", skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Inspection {
    #[serde(deserialize_with = "text")]
    pub id: String,
    #[serde(rename = "type", deserialize_with = "text")]
    pub kind: String,
    /// `YYYY-MM-DD`
    #[serde(deserialize_with = "text")]
    pub date: String,
    pub score: f64,
    #[serde(deserialize_with = "opt_text")]
    pub grade_raw: Option<String>,
    pub critical_violations: u32,
    pub noncritical_violations: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations: Option<Vec<Violation>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Violation {
    #[serde(deserialize_with = "text")]
    pub code: String,
    #[serde(deserialize_with = "text")]
    pub title: String,
    #[serde(deserialize_with = "text")]
    pub narrative: String,
    pub critical: bool,
    pub corrected_on_site: bool,
}

/// Attestation fields. All optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Proof {
    #[serde(deserialize_with = "opt_text", skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(deserialize_with = "opt_text", skip_serializing_if = "Option::is_none")]
    pub attested_by: Option<String>,
    #[serde(deserialize_with = "opt_text", skip_serializing_if = "Option::is_none")]
    pub payload_checksum_sha256: Option<String>,
    #[serde(deserialize_with = "opt_text", skip_serializing_if = "Option::is_none")]
    pub cid: Option<String>,
    #[serde(deserialize_with = "opt_text", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

impl Receipt {
    /// Read a receipt out of a decoded value tree.
    pub fn from_value(value: &Value) -> Result<Self> {
        let json = serde_json::to_value(value).map_err(|e| ReceiptError::Parse {
            message: format!("Receipt is not representable as JSON: {}", e),
            help: None,
        })?;
        serde_json::from_value(json).map_err(|e| ReceiptError::Parse {
            message: format!("Receipt has an unexpected shape: {}", e),
            help: Some("Run `receipts validate` for a field-by-field report".to_string()),
        })
    }

    /// Build the value tree in canonical key order, ready for encoding.
    ///
    /// `entity.parent` and `inspection.grade_raw` are always written (null
    /// when unknown); other optional fields only when present.
    pub fn to_value(&self) -> Value {
        let mut root = Mapping::new();
        if let Some(version) = self.receipt_version {
            root.insert("receipt_version", version);
        }
        if let Some(kind) = &self.kind {
            root.insert("kind", kind.as_str());
        }
        root.insert("jurisdiction", self.jurisdiction.as_str());
        root.insert("issuer", self.issuer.as_str());

        let mut entity = Mapping::new()
            .with("type", self.entity.kind.as_str())
            .with("name", self.entity.name.as_str())
            .with("parent", self.entity.parent.clone());
        if let Some(address) = &self.entity.address {
            entity.insert("address", address.as_str());
        }
        root.insert("entity", entity);

        let mut source = Mapping::new()
            .with("system", self.source.system.as_str())
            .with("url", self.source.url.as_str());
        if let Some(fetched_at) = &self.source.fetched_at {
            source.insert("fetched_at", fetched_at.as_str());
        }
        root.insert("source", source);

        let inspection = &self.inspection;
        let mut body = Mapping::new()
            .with("id", inspection.id.as_str())
            .with("type", inspection.kind.as_str())
            .with("date", inspection.date.as_str())
            .with("score", inspection.score)
            .with("grade_raw", inspection.grade_raw.clone())
            .with("critical_violations", inspection.critical_violations)
            .with("noncritical_violations", inspection.noncritical_violations);
        if let Some(violations) = &inspection.violations {
            let items = violations
                .iter()
                .map(|v| {
                    Value::Mapping(
                        Mapping::new()
                            .with("code", v.code.as_str())
                            .with("title", v.title.as_str())
                            .with("critical", v.critical)
                            .with("corrected_on_site", v.corrected_on_site)
                            .with("narrative", v.narrative.as_str()),
                    )
                })
                .collect::<Vec<_>>();
            body.insert("violations", items);
        }
        root.insert("inspection", body);

        if let Some(proof) = &self.proof {
            let fields = [
                ("method", &proof.method),
                ("attested_by", &proof.attested_by),
                ("payload_checksum_sha256", &proof.payload_checksum_sha256),
                ("cid", &proof.cid),
                ("schema", &proof.schema),
            ];
            let proof: Mapping = fields
                .into_iter()
                .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
                .collect();
            root.insert("proof", proof);
        }

        Value::Mapping(root)
    }

    /// The proof CID, or an empty string.
    pub fn cid(&self) -> &str {
        self.proof
            .as_ref()
            .and_then(|p| p.cid.as_deref())
            .unwrap_or("")
    }
}

/// A scalar read leniently as text.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Lenient {
    fn into_text(self) -> String {
        match self {
            Lenient::Text(s) => s,
            Lenient::Int(n) => n.to_string(),
            Lenient::Float(n) => n.to_string(),
            Lenient::Bool(b) => b.to_string(),
        }
    }
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(opt_text(deserializer)?.unwrap_or_default())
}

fn opt_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    Ok(Option::<Lenient>::deserialize(deserializer)?.map(Lenient::into_text))
}
