//! Shape validation for receipts.
//!
//! Runs a suite of checks against a decoded front-matter tree and reports
//! errors and warnings. Used by `receipts validate`.

mod checks;
mod warning;

pub use warning::{Diagnostic, Severity, ValidationResult};

use crate::markup::Value;

/// Run all validation checks against a decoded receipt.
pub fn validate_receipt(root: &Value) -> ValidationResult {
    let mut result = checks::check_root(root);
    if result.has_errors() {
        return result;
    }

    result.merge(checks::check_fields(root));
    result.merge(checks::check_violations(root));
    result.merge(checks::check_date(root));
    result.merge(checks::check_score(root));
    result.merge(checks::check_violation_counts(root));
    result.merge(checks::check_unknown_fields(root));

    result
}
