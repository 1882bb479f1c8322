//! Core memory types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::signature::Signature;

/// A persisted record pairing an error signature with a reusable remedy and
/// confidence metadata.
///
/// Owned exclusively by the fix store and mutated in place on repeated hits:
/// `success_count` increments and `success_rate` is recomputed as
/// `count / (count + 1)` - a smoothing curve that approaches 1 with repeated
/// hits, not a true frequency ratio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnedFix {
    /// Content-derived identity key.
    pub error_signature: Signature,
    /// Exception class name, e.g. `IndexError`.
    pub error_type: String,
    /// Generalized path bucket, e.g. `api/*.py`.
    pub file_pattern: String,
    /// Human-readable description of the fix.
    pub fix_strategy: String,
    /// Reusable fixed source; a fix without it cannot be mechanically applied.
    pub fixed_code: Option<String>,
    /// Number of times this fix has been stored.
    pub success_count: u32,
    /// Confidence in [0, 1].
    pub success_rate: f64,
    /// When the fix was first learned.
    pub created_at: DateTime<Utc>,
}

/// One entry of the exact-text memory log, the unit the remote context
/// service stores and returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextRecord {
    /// Raw error text as the developer supplied it.
    pub error: String,
    /// The fix that answered it.
    pub fix: String,
    /// When the record was stored.
    pub timestamp: DateTime<Utc>,
}

impl ContextRecord {
    /// Create a record stamped with the current time.
    pub fn new(error: impl Into<String>, fix: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            fix: fix.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_record_serializes_wire_fields() {
        let record = ContextRecord::new("IndexError: oops", "Check bounds");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"error\":\"IndexError: oops\""));
        assert!(json.contains("\"fix\":\"Check bounds\""));
        assert!(json.contains("\"timestamp\""));
    }

    #[test]
    fn learned_fix_round_trips_through_json() {
        let report = crate::ErrorReport::new("IndexError", "api/a.py", "oops");
        let fix = LearnedFix {
            error_signature: Signature::of(&report),
            error_type: "IndexError".to_string(),
            file_pattern: "api/*.py".to_string(),
            fix_strategy: "Fixed IndexError".to_string(),
            fixed_code: Some("items.get(10)".to_string()),
            success_count: 2,
            success_rate: 2.0 / 3.0,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&fix).unwrap();
        let parsed: LearnedFix = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.error_signature, fix.error_signature);
        assert_eq!(parsed.success_count, 2);
    }
}
