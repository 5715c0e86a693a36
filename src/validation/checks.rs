//! Shape checks for decoded receipts.
//!
//! Each check takes the decoded root `&Value` and returns a `ValidationResult`.

use crate::date::is_iso_date;
use crate::markup::Value;

use super::warning::{Diagnostic, ValidationResult};

/// Value types a field may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Text,
    /// Text, or a number the decoder coerced (ids and codes).
    TextLike,
    NullableText,
    Number,
    Bool,
    Mapping,
    Sequence,
}

impl Expect {
    fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (Expect::Text, Value::Text(_)) => true,
            (Expect::TextLike, Value::Text(_) | Value::Number(_)) => true,
            (Expect::NullableText, Value::Text(_) | Value::Null) => true,
            (Expect::Number, Value::Number(_)) => true,
            (Expect::Bool, Value::Bool(_)) => true,
            (Expect::Mapping, Value::Mapping(_)) => true,
            (Expect::Sequence, Value::Sequence(_)) => true,
            _ => false,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Expect::Text => "text",
            Expect::TextLike => "text or number",
            Expect::NullableText => "text or null",
            Expect::Number => "number",
            Expect::Bool => "bool",
            Expect::Mapping => "mapping",
            Expect::Sequence => "sequence",
        }
    }
}

const REQUIRED: &[(&str, Expect)] = &[
    ("jurisdiction", Expect::Text),
    ("issuer", Expect::Text),
    ("entity", Expect::Mapping),
    ("entity.type", Expect::Text),
    ("entity.name", Expect::Text),
    ("source", Expect::Mapping),
    ("source.system", Expect::Text),
    ("source.url", Expect::Text),
    ("inspection", Expect::Mapping),
    ("inspection.id", Expect::TextLike),
    ("inspection.type", Expect::Text),
    ("inspection.date", Expect::Text),
    ("inspection.score", Expect::Number),
    ("inspection.critical_violations", Expect::Number),
    ("inspection.noncritical_violations", Expect::Number),
];

const OPTIONAL: &[(&str, Expect)] = &[
    ("receipt_version", Expect::Number),
    ("kind", Expect::Text),
    ("entity.parent", Expect::NullableText),
    ("entity.address", Expect::NullableText),
    ("source.fetched_at", Expect::Text),
    ("inspection.grade_raw", Expect::NullableText),
    ("inspection.violations", Expect::Sequence),
    ("proof", Expect::Mapping),
    ("proof.cid", Expect::Text),
];

const VIOLATION_FIELDS: &[(&str, Expect)] = &[
    ("code", Expect::TextLike),
    ("title", Expect::Text),
    ("narrative", Expect::Text),
    ("critical", Expect::Bool),
    ("corrected_on_site", Expect::Bool),
];

const TOP_LEVEL: &[&str] = &[
    "receipt_version",
    "kind",
    "jurisdiction",
    "issuer",
    "entity",
    "source",
    "inspection",
    "proof",
];

/// The root must be a mapping for any other check to make sense.
pub fn check_root(root: &Value) -> ValidationResult {
    let mut result = ValidationResult::new();
    if root.as_mapping().is_none() {
        result.push(
            Diagnostic::error(
                "receipts::validate::not-a-mapping",
                format!("Receipt root is a {}, expected a mapping", root.kind()),
            )
            .with_help("Front matter must consist of `key: value` lines"),
        );
    }
    result
}

/// Check required and optional fields for presence and type.
pub fn check_fields(root: &Value) -> ValidationResult {
    let mut result = ValidationResult::new();

    for &(path, expect) in REQUIRED {
        match root.pointer(path) {
            None | Some(Value::Null) => {
                // A missing parent already reported covers its children.
                if parent_present(root, path) {
                    result.push(
                        Diagnostic::error(
                            "receipts::validate::missing-field",
                            format!("Required field is missing (expected {})", expect.describe()),
                        )
                        .at(path),
                    );
                }
            }
            Some(value) => check_type(&mut result, path, value, expect),
        }
    }

    for &(path, expect) in OPTIONAL {
        if let Some(value) = root.pointer(path) {
            if !value.is_null() || expect == Expect::NullableText {
                check_type(&mut result, path, value, expect);
            }
        }
    }

    result
}

/// Check every violation entry's fields.
pub fn check_violations(root: &Value) -> ValidationResult {
    let mut result = ValidationResult::new();
    let Some(items) = root.pointer("inspection.violations").and_then(Value::as_sequence) else {
        return result;
    };

    for (index, item) in items.iter().enumerate() {
        let base = format!("inspection.violations.{}", index);
        if item.as_mapping().is_none() {
            check_type(&mut result, &base, item, Expect::Mapping);
            continue;
        }
        for &(key, expect) in VIOLATION_FIELDS {
            let path = format!("{}.{}", base, key);
            match item.get(key) {
                Some(value) if !value.is_null() => check_type(&mut result, &path, value, expect),
                _ => result.push(
                    Diagnostic::error(
                        "receipts::validate::missing-field",
                        format!("Violation field is missing (expected {})", expect.describe()),
                    )
                    .at(path),
                ),
            }
        }
    }

    result
}

/// The inspection date must be a real `YYYY-MM-DD` calendar date.
pub fn check_date(root: &Value) -> ValidationResult {
    let mut result = ValidationResult::new();
    if let Some(date) = root.pointer("inspection.date").and_then(Value::as_str) {
        if !is_iso_date(date) {
            result.push(
                Diagnostic::error(
                    "receipts::validate::bad-date",
                    format!("'{}' is not a YYYY-MM-DD date", date),
                )
                .at("inspection.date")
                .with_help("Dates are compared as text, so they must be zero-padded ISO dates"),
            );
        }
    }
    result
}

/// Scores are on a 100-point scale.
pub fn check_score(root: &Value) -> ValidationResult {
    let mut result = ValidationResult::new();
    if let Some(score) = root.pointer("inspection.score").and_then(Value::as_f64) {
        if !(0.0..=100.0).contains(&score) {
            result.push(
                Diagnostic::warning(
                    "receipts::validate::score-range",
                    format!("Score {} is outside 0-100", score),
                )
                .at("inspection.score"),
            );
        }
    }
    result
}

/// Summary counts should agree with the violations list when both are present.
pub fn check_violation_counts(root: &Value) -> ValidationResult {
    let mut result = ValidationResult::new();
    let Some(items) = root.pointer("inspection.violations").and_then(Value::as_sequence) else {
        return result;
    };

    let critical = items
        .iter()
        .filter(|v| v.get("critical").and_then(Value::as_bool) == Some(true))
        .count();
    let noncritical = items
        .iter()
        .filter(|v| v.get("critical").and_then(Value::as_bool) == Some(false))
        .count();

    for (path, listed) in [
        ("inspection.critical_violations", critical),
        ("inspection.noncritical_violations", noncritical),
    ] {
        if let Some(declared) = root.pointer(path).and_then(Value::as_f64) {
            if declared != listed as f64 {
                result.push(
                    Diagnostic::warning(
                        "receipts::validate::count-mismatch",
                        format!("Declares {} but the violations list has {}", declared, listed),
                    )
                    .at(path),
                );
            }
        }
    }

    result
}

/// Top-level keys outside the receipt shape are probably typos.
pub fn check_unknown_fields(root: &Value) -> ValidationResult {
    let mut result = ValidationResult::new();
    if let Some(map) = root.as_mapping() {
        for key in map.keys().filter(|k| !TOP_LEVEL.contains(k)) {
            result.push(
                Diagnostic::warning(
                    "receipts::validate::unknown-field",
                    format!("Unknown top-level field '{}'", key),
                )
                .at(key),
            );
        }
    }
    result
}

fn check_type(result: &mut ValidationResult, path: &str, value: &Value, expect: Expect) {
    if !expect.accepts(value) {
        result.push(
            Diagnostic::error(
                "receipts::validate::wrong-type",
                format!("Expected {}, found {}", expect.describe(), value.kind()),
            )
            .at(path),
        );
    }
}

/// Whether the mapping that would hold `path` exists.
fn parent_present(root: &Value, path: &str) -> bool {
    match path.rsplit_once('.') {
        Some((parent, _)) => root.pointer(parent).and_then(Value::as_mapping).is_some(),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::decode;

    #[test]
    fn test_missing_entity_reported_once() {
        let root = decode("jurisdiction: x\nissuer: y");
        let result = check_fields(&root);

        let fields: Vec<_> = result.iter().filter_map(|d| d.field.as_deref()).collect();
        assert_eq!(fields, vec!["entity", "source", "inspection"]);
    }

    #[test]
    fn test_wrong_type() {
        let root = decode("inspection:\n  score: high");
        let result = check_fields(&root);

        let wrong: Vec<_> = result
            .iter()
            .filter(|d| d.code == "receipts::validate::wrong-type")
            .filter_map(|d| d.field.as_deref())
            .collect();
        assert_eq!(wrong, vec!["inspection.score"]);
    }

    #[test]
    fn test_numeric_id_accepted() {
        let root = decode("inspection:\n  id: 12345");
        let result = check_fields(&root);

        assert!(result.iter().all(|d| d.field.as_deref() != Some("inspection.id")));
    }

    #[test]
    fn test_nullable_parent() {
        let root = decode("entity:\n  parent:\n  address: 12");
        let result = check_fields(&root);

        let fields: Vec<_> = result
            .iter()
            .filter(|d| d.code == "receipts::validate::wrong-type")
            .filter_map(|d| d.field.as_deref())
            .collect();
        assert_eq!(fields, vec!["entity.address"]);
    }

    #[test]
    fn test_bad_date() {
        assert!(check_date(&decode("inspection:\n  date: 2025-02-30")).has_errors());
        assert!(check_date(&decode("inspection:\n  date: 2025-02-28")).is_ok());
    }

    #[test]
    fn test_score_range() {
        let result = check_score(&decode("inspection:\n  score: 120"));
        assert_eq!(result.warning_count(), 1);
    }

    #[test]
    fn test_violation_counts() {
        let markup = "\
inspection:
  critical_violations: 2
  noncritical_violations: 1
  violations:
    - code: C1
      critical: true
    - code: N1
      critical: false
";
        let result = check_violation_counts(&decode(markup));

        let fields: Vec<_> = result.iter().filter_map(|d| d.field.as_deref()).collect();
        assert_eq!(fields, vec!["inspection.critical_violations"]);
    }

    #[test]
    fn test_violation_fields() {
        let markup = "\
inspection:
  violations:
    - code: C1
      title: Storage
      narrative: x
      critical: yes
      corrected_on_site: false
";
        let result = check_violations(&decode(markup));

        assert_eq!(result.error_count(), 1);
        assert_eq!(
            result.iter().next().unwrap().field.as_deref(),
            Some("inspection.violations.0.critical")
        );
    }

    #[test]
    fn test_unknown_fields() {
        let result = check_unknown_fields(&decode("jurisdiction: x\njurisdction: y"));
        assert_eq!(result.warning_count(), 1);
    }
}
