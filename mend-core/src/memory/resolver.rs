//! Memory-backed fix resolution.
//!
//! The resolver answers two different questions:
//!
//! - `lookup_exact` - "have we seen this exact error text before?" A loose,
//!   bidirectional substring containment over the context log, used ahead
//!   of any model call for instant, free resolution. Recall over precision.
//! - `apply_learned_fix` - "do we have a ranked, signature-keyed fix for
//!   this kind of error?" Used as the last tier after both backends fail.
//!
//! When a remote context service is configured and any call to it fails, the
//! resolver degrades to local-only storage for the remainder of the process.
//! Resolution never fails because persistence did.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;
use tracing::{info, warn};

use super::context::ContextClient;
use super::store::FixStore;
use super::types::{ContextRecord, LearnedFix};
use crate::diff;
use crate::report::ErrorReport;
use crate::types::FixResult;

/// Queries learned-fix memory on behalf of the fallback chain.
pub struct MemoryResolver {
    store: Arc<dyn FixStore>,
    remote: Option<ContextClient>,
    records: RwLock<Vec<ContextRecord>>,
    degraded: AtomicBool,
}

impl MemoryResolver {
    /// Create a resolver with process-local storage only.
    pub fn new(store: Arc<dyn FixStore>) -> Self {
        Self {
            store,
            remote: None,
            records: RwLock::new(Vec::new()),
            degraded: AtomicBool::new(false),
        }
    }

    /// Create a resolver backed by a remote context service.
    pub fn with_remote(store: Arc<dyn FixStore>, remote: ContextClient) -> Self {
        Self {
            store,
            remote: Some(remote),
            records: RwLock::new(Vec::new()),
            degraded: AtomicBool::new(false),
        }
    }

    /// Whether the remote context service is configured and still healthy.
    pub fn remote_healthy(&self) -> bool {
        self.remote.is_some() && !self.degraded.load(Ordering::SeqCst)
    }

    fn degrade(&self, cause: &super::error::MemoryError) {
        if !self.degraded.swap(true, Ordering::SeqCst) {
            warn!(%cause, "context service unavailable, continuing with local memory only");
        }
    }

    /// Stored fixes similar to the report: exact error-type matches ranked
    /// by success rate. Returns an empty list, never an error, on no match.
    pub async fn retrieve_similar(&self, report: &ErrorReport) -> Vec<LearnedFix> {
        match self.store.get_by_type(&report.error_type).await {
            Ok(fixes) => fixes,
            Err(e) => {
                warn!(error = %e, "fix lookup failed");
                Vec::new()
            }
        }
    }

    /// Try to apply the best learned fix directly from memory.
    ///
    /// Returns `None` when no similar fix exists or the best match stores no
    /// `fixed_code` - a strategy description alone cannot be mechanically
    /// applied, so such records are silently skipped.
    pub async fn apply_learned_fix(&self, report: &ErrorReport) -> Option<FixResult> {
        let similar = self.retrieve_similar(report).await;
        let best = similar.first()?;
        let fixed_code = best.fixed_code.clone()?;

        info!(
            success_rate = format!("{:.0}%", best.success_rate * 100.0),
            strategy = %best.fix_strategy,
            "applying learned fix from memory"
        );

        let original = report.file_content.as_deref().unwrap_or_default();
        let diff = diff::generate(original, &fixed_code);

        Some(FixResult::from_memory(
            report.clone(),
            best.fix_strategy.clone(),
            Some(fixed_code),
            diff,
        ))
    }

    /// Exact-text pre-check: return a stored fix when some record's error
    /// text is a substring of the query or vice versa.
    ///
    /// Compared case-insensitively. Deliberately loose - the point is
    /// instant, free resolution before any paid call.
    pub async fn lookup_exact(&self, raw_error: &str) -> Option<String> {
        let query = raw_error.to_lowercase();

        if self.remote_healthy() {
            if let Some(remote) = &self.remote {
                match remote.records().await {
                    Ok(records) => return Self::match_records(&records, &query),
                    Err(e) => self.degrade(&e),
                }
            }
        }

        let records = self.records.read().await;
        Self::match_records(&records, &query)
    }

    fn match_records(records: &[ContextRecord], query: &str) -> Option<String> {
        records.iter().find_map(|record| {
            let stored = record.error.to_lowercase();
            if stored.contains(query) || query.contains(&stored) {
                Some(record.fix.clone())
            } else {
                None
            }
        })
    }

    /// Record a resolved (error, fix) pair in the context log.
    ///
    /// Always kept locally; mirrored to the remote context service while it
    /// stays healthy. A remote failure degrades silently.
    pub async fn record(&self, raw_error: &str, fix: &str) {
        self.records
            .write()
            .await
            .push(ContextRecord::new(raw_error, fix));

        if self.remote_healthy() {
            if let Some(remote) = &self.remote {
                if let Err(e) = remote.append(raw_error, fix).await {
                    self.degrade(&e);
                }
            }
        }
    }
}
