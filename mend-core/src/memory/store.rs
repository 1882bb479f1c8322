//! Fix storage trait and in-memory implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use super::error::MemoryError;
use super::types::LearnedFix;
use crate::report::ErrorReport;
use crate::signature::{Signature, file_pattern};
use crate::types::FixResult;

/// Maximum number of fixes returned per lookup.
pub const MAX_SIMILAR: usize = 5;

/// Storage operations for learned fixes.
///
/// The store holds at most one [`LearnedFix`] per signature; signatures are
/// content-derived, so re-storing the same (type, pattern, message) triple
/// always updates the existing record rather than creating a duplicate.
#[async_trait]
pub trait FixStore: Send + Sync {
    /// All stored fixes whose `error_type` exactly equals the query, ordered
    /// by descending `success_rate` (ties broken by insertion order), at
    /// most [`MAX_SIMILAR`] results.
    async fn get_by_type(&self, error_type: &str) -> Result<Vec<LearnedFix>, MemoryError>;

    /// Store a fix under its signature.
    ///
    /// An existing signature increments `success_count` and recomputes
    /// `success_rate = count / (count + 1)`; a new one is created with
    /// `success_count = 1`, `fixed_code` taken verbatim from the result, and
    /// `fix_strategy` defaulting to `"Fixed {error_type}"` when the caller
    /// supplies none.
    async fn upsert(
        &self,
        signature: &Signature,
        report: &ErrorReport,
        fix: &FixResult,
    ) -> Result<LearnedFix, MemoryError>;

    /// Number of stored fixes.
    async fn count(&self) -> Result<u64, MemoryError>;
}

/// Process-local fix store.
///
/// Entries live in insertion order so that equal success rates rank
/// first-stored-first. The single write lock serializes upserts, which
/// satisfies the at-most-one-writer-per-signature requirement when the store
/// is shared across concurrent resolutions; reads stay concurrent.
pub struct InMemoryFixStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    entries: Vec<LearnedFix>,
    index: HashMap<Signature, usize>,
}

impl InMemoryFixStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }
}

impl Default for InMemoryFixStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FixStore for InMemoryFixStore {
    async fn get_by_type(&self, error_type: &str) -> Result<Vec<LearnedFix>, MemoryError> {
        let inner = self.inner.read().await;
        let mut matches: Vec<LearnedFix> = inner
            .entries
            .iter()
            .filter(|fix| fix.error_type == error_type)
            .cloned()
            .collect();

        // Stable sort keeps insertion order among equal rates.
        matches.sort_by(|a, b| {
            b.success_rate
                .partial_cmp(&a.success_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(MAX_SIMILAR);
        Ok(matches)
    }

    async fn upsert(
        &self,
        signature: &Signature,
        report: &ErrorReport,
        fix: &FixResult,
    ) -> Result<LearnedFix, MemoryError> {
        let mut inner = self.inner.write().await;

        if let Some(position) = inner.index.get(signature).copied() {
            let entry = &mut inner.entries[position];
            entry.success_count += 1;
            let count = f64::from(entry.success_count);
            entry.success_rate = (count / (count + 1.0)).min(1.0);
            debug!(
                signature = signature.short(),
                success_count = entry.success_count,
                "updated fix"
            );
            return Ok(entry.clone());
        }

        let strategy = if fix.fix_strategy.is_empty() {
            format!("Fixed {}", report.error_type)
        } else {
            fix.fix_strategy.clone()
        };
        let learned = LearnedFix {
            error_signature: signature.clone(),
            error_type: report.error_type.clone(),
            file_pattern: file_pattern(&report.file_path),
            fix_strategy: strategy,
            fixed_code: fix.fixed_code.clone(),
            success_count: 1,
            success_rate: 0.5,
            created_at: Utc::now(),
        };

        let position = inner.entries.len();
        inner.entries.push(learned.clone());
        inner.index.insert(signature.clone(), position);
        debug!(signature = signature.short(), "stored fix");
        Ok(learned)
    }

    async fn count(&self) -> Result<u64, MemoryError> {
        Ok(self.inner.read().await.entries.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FixResult, ModelTier};

    // Verify the trait is object-safe
    #[test]
    fn fix_store_is_object_safe() {
        fn _takes_boxed(_: Box<dyn FixStore>) {}
    }

    fn report(error_type: &str, path: &str, message: &str) -> ErrorReport {
        ErrorReport::new(error_type, path, message)
    }

    fn result_for(report: &ErrorReport, strategy: &str, code: Option<&str>) -> FixResult {
        FixResult::from_model(
            report.clone(),
            ModelTier::Cheap,
            0.0002,
            strategy,
            code.map(String::from),
            "",
        )
    }

    #[tokio::test]
    async fn upsert_creates_then_grows() {
        let store = InMemoryFixStore::new();
        let report = report("IndexError", "api/a.py", "list index out of range");
        let signature = Signature::of(&report);
        let fix = result_for(&report, "Check bounds", Some("items.get(i)"));

        let first = store.upsert(&signature, &report, &fix).await.unwrap();
        assert_eq!(first.success_count, 1);
        assert_eq!(first.success_rate, 0.5);
        assert_eq!(first.fixed_code.as_deref(), Some("items.get(i)"));

        let second = store.upsert(&signature, &report, &fix).await.unwrap();
        assert_eq!(second.success_count, 2);
        assert!((second.success_rate - 2.0 / 3.0).abs() < 1e-9);

        let third = store.upsert(&signature, &report, &fix).await.unwrap();
        assert_eq!(third.success_count, 3);
        assert!((third.success_rate - 3.0 / 4.0).abs() < 1e-9);

        // Still a single record.
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn upsert_defaults_empty_strategy() {
        let store = InMemoryFixStore::new();
        let report = report("TypeError", "app.py", "bad operand");
        let signature = Signature::of(&report);
        let fix = result_for(&report, "", None);

        let learned = store.upsert(&signature, &report, &fix).await.unwrap();
        assert_eq!(learned.fix_strategy, "Fixed TypeError");
        assert_eq!(learned.file_pattern, "*.py");
    }

    #[tokio::test]
    async fn get_by_type_ranks_by_success_rate() {
        let store = InMemoryFixStore::new();

        // Three distinct signatures for the same error type; drive their
        // rates apart by upserting different numbers of times.
        let reports = [
            report("IndexError", "a.py", "first"),
            report("IndexError", "b.py", "second"),
            report("IndexError", "c.py", "third"),
        ];
        let hits = [2_u32, 5, 1]; // rates: 2/3, 5/6, 1/2
        for (r, &n) in reports.iter().zip(&hits) {
            let signature = Signature::of(r);
            let fix = result_for(r, "strategy", Some("code"));
            for _ in 0..n {
                store.upsert(&signature, r, &fix).await.unwrap();
            }
        }

        let ranked = store.get_by_type("IndexError").await.unwrap();
        let rates: Vec<f64> = ranked.iter().map(|f| f.success_rate).collect();
        assert!((rates[0] - 5.0 / 6.0).abs() < 1e-9);
        assert!((rates[1] - 2.0 / 3.0).abs() < 1e-9);
        assert!((rates[2] - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn get_by_type_breaks_ties_by_insertion_order() {
        let store = InMemoryFixStore::new();
        for (i, message) in ["one", "two", "three"].iter().enumerate() {
            let r = report("ValueError", "x.py", message);
            let fix = result_for(&r, &format!("strategy {i}"), None);
            store.upsert(&Signature::of(&r), &r, &fix).await.unwrap();
        }

        let ranked = store.get_by_type("ValueError").await.unwrap();
        let strategies: Vec<&str> = ranked.iter().map(|f| f.fix_strategy.as_str()).collect();
        assert_eq!(strategies, ["strategy 0", "strategy 1", "strategy 2"]);
    }

    #[tokio::test]
    async fn get_by_type_filters_exactly_and_truncates() {
        let store = InMemoryFixStore::new();
        for i in 0..7 {
            let r = report("KeyError", "m.py", &format!("missing {i}"));
            let fix = result_for(&r, "strategy", None);
            store.upsert(&Signature::of(&r), &r, &fix).await.unwrap();
        }
        let other = report("IndexError", "m.py", "unrelated");
        let fix = result_for(&other, "strategy", None);
        store.upsert(&Signature::of(&other), &other, &fix).await.unwrap();

        let ranked = store.get_by_type("KeyError").await.unwrap();
        assert_eq!(ranked.len(), MAX_SIMILAR);
        assert!(ranked.iter().all(|f| f.error_type == "KeyError"));

        assert!(store.get_by_type("Key").await.unwrap().is_empty());
    }
}
