//! Deterministic error signatures.
//!
//! A signature is the cache key for learned fixes: a SHA-256 digest over the
//! error type, the generalized file pattern, and the error message. It is a
//! cache key, not a security boundary - the hash only needs to be stable and
//! collision-resistant enough to deduplicate errors.
//!
//! There is no fuzzy matching at this layer: a single differing character in
//! the message produces a different signature. Broader reuse comes from the
//! file pattern, which collapses many concrete paths into one bucket.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::report::ErrorReport;

/// Extension used when a path has none.
const DEFAULT_EXTENSION: &str = "txt";

/// Derive the generalized file pattern for a path (e.g. `api/*.py`).
///
/// Normalizes separators to `/`, keeps only the first path segment and the
/// extension, trading precision for hit rate: every file under `api/` with
/// the same extension lands in the same bucket.
pub fn file_pattern(file_path: &str) -> String {
    let normalized = file_path.replace('\\', "/");

    let ext = match normalized.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => DEFAULT_EXTENSION,
    };

    let mut segments = normalized.split('/');
    let first = segments.next().unwrap_or_default();
    if segments.next().is_some() {
        format!("{first}/*.{ext}")
    } else {
        format!("*.{ext}")
    }
}

/// Deterministic identity key for an error, derived from its content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature(String);

impl Signature {
    /// Compute the signature for an error report.
    pub fn of(report: &ErrorReport) -> Self {
        let pattern = file_pattern(&report.file_path);
        let context = format!(
            "{}:{}:{}",
            report.error_type, pattern, report.error_message
        );
        let mut hasher = Sha256::new();
        hasher.update(context.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// The full hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened digest for log lines.
    pub fn short(&self) -> &str {
        &self.0[..16]
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
