//! Top-level healing orchestrator.

use std::sync::Arc;

use mend_models::providers::{CompletionProvider, ReplicateProvider};
use tracing::{info, warn};

use crate::chain::{ChainConfig, ModelFallbackChain};
use crate::config::MendConfig;
use crate::error::MendError;
use crate::memory::{ContextClient, FixStore, InMemoryFixStore, MemoryResolver};
use crate::report::{ErrorReport, collapse_whitespace};
use crate::signature::Signature;
use crate::types::FixResult;

/// Environment variable holding the context service API key.
const MEMORY_TOKEN_ENV: &str = "ULTRACONTEXT_API_KEY";

/// Given a raw error, returns a fix, recording which tier answered and what
/// it cost - and stores every success back into memory so repeated
/// occurrences of the same signature become free after the first paid
/// resolution.
pub struct Healer {
    chain: ModelFallbackChain,
    store: Arc<dyn FixStore>,
    resolver: Arc<MemoryResolver>,
}

impl Healer {
    /// Create a healer with process-local memory and default tuning.
    pub fn new(
        cheap: Arc<dyn CompletionProvider>,
        smart: Arc<dyn CompletionProvider>,
    ) -> Self {
        let store: Arc<dyn FixStore> = Arc::new(InMemoryFixStore::new());
        let resolver = Arc::new(MemoryResolver::new(Arc::clone(&store)));
        Self::assemble(cheap, smart, store, resolver, ChainConfig::default())
    }

    /// Create a healer from injected parts.
    pub fn assemble(
        cheap: Arc<dyn CompletionProvider>,
        smart: Arc<dyn CompletionProvider>,
        store: Arc<dyn FixStore>,
        resolver: Arc<MemoryResolver>,
        config: ChainConfig,
    ) -> Self {
        let chain =
            ModelFallbackChain::with_config(cheap, smart, Arc::clone(&resolver), config);
        Self {
            chain,
            store,
            resolver,
        }
    }

    /// Create a healer from configuration.
    ///
    /// Providers read their token from `REPLICATE_API_TOKEN`. When the
    /// remote context service is enabled but its key is absent from
    /// `ULTRACONTEXT_API_KEY`, the healer starts in local-only mode instead
    /// of failing.
    pub fn from_config(config: &MendConfig) -> Result<Self, MendError> {
        let cheap: Arc<dyn CompletionProvider> =
            Arc::new(ReplicateProvider::from_env(&config.models.cheap)?);
        let smart: Arc<dyn CompletionProvider> =
            Arc::new(ReplicateProvider::from_env(&config.models.smart)?);

        let store: Arc<dyn FixStore> = Arc::new(InMemoryFixStore::new());
        let resolver = if config.memory.enabled {
            match std::env::var(MEMORY_TOKEN_ENV) {
                Ok(key) => {
                    let client = ContextClient::new(&config.memory.base_url, &key)?;
                    Arc::new(MemoryResolver::with_remote(Arc::clone(&store), client))
                }
                Err(_) => {
                    warn!(
                        "{MEMORY_TOKEN_ENV} not set, memory persistence limited to this process"
                    );
                    Arc::new(MemoryResolver::new(Arc::clone(&store)))
                }
            }
        } else {
            Arc::new(MemoryResolver::new(Arc::clone(&store)))
        };

        Ok(Self::assemble(
            cheap,
            smart,
            store,
            resolver,
            config.chain.clone(),
        ))
    }

    /// Heal one raw error.
    ///
    /// Parses the text into a report, runs the fallback chain (whose first
    /// tier is the free exact-text memory check), and stores any success
    /// back into the fix store and the context log. The worst outcome is a
    /// failed [`FixResult`]; this method itself never errors.
    pub async fn heal(&self, raw_error: &str) -> FixResult {
        let report = ErrorReport::parse(raw_error);
        let raw = collapse_whitespace(raw_error);
        self.resolve_and_learn(report, &raw).await
    }

    /// Heal an already-structured report.
    pub async fn heal_report(&self, report: ErrorReport) -> FixResult {
        let raw = format!("{}: {}", report.error_type, report.error_message);
        self.resolve_and_learn(report, &raw).await
    }

    async fn resolve_and_learn(&self, report: ErrorReport, raw: &str) -> FixResult {
        let result = self.chain.resolve(&report, raw).await;

        if result.success {
            // Unconditional, even for memory-sourced results: re-storing an
            // already-stored fix increments its success count.
            let signature = Signature::of(&report);
            match self.store.upsert(&signature, &report, &result).await {
                Ok(learned) => info!(
                    signature = signature.short(),
                    success_count = learned.success_count,
                    tier = %result.model_used,
                    cost = result.cost,
                    "fix stored"
                ),
                Err(e) => warn!(error = %e, "failed to store fix"),
            }
            self.resolver.record(raw, &result.fix_strategy).await;
        }

        result
    }

    /// Number of learned fixes currently stored.
    pub async fn learned_count(&self) -> u64 {
        self.store.count().await.unwrap_or(0)
    }
}
