//! Tiered model fallback chain.
//!
//! Resolution runs as an explicit finite state machine over four tiers:
//!
//! ```text
//! MemoryCheck ──miss──► CheapModel ──fail──► SmartModel ──fail──► MemoryFallback
//!      │hit                  │ok                  │ok                  │hit │miss
//!      ▼                     ▼                    ▼                    ▼    ▼
//!   success               success              success             success fatal
//! ```
//!
//! No state is re-entered; the chain executes at most once per invocation.
//! Backend failures are not distinguished by cause - timeout, auth, quota,
//! and malformed responses all mean "backend unavailable, advance" - though
//! the diagnostic text is logged and carried into a fatal result's message.

use std::sync::Arc;

use mend_models::providers::CompletionProvider;
use mend_models::{CompletionRequest, Error as BackendError};
use serde::{Deserialize, Serialize};
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use crate::diff;
use crate::memory::MemoryResolver;
use crate::report::ErrorReport;
use crate::types::{FixResult, ModelTier};

/// Default estimated cost of one cheap-tier call, in dollars.
pub const DEFAULT_CHEAP_UNIT_COST: f64 = 0.0002;

/// Default estimated cost of one smart-tier call, in dollars.
pub const DEFAULT_SMART_UNIT_COST: f64 = 0.003;

/// Default cap on response length.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2000;

/// Default sampling temperature - low, deterministic-leaning.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Tuning knobs for the fallback chain.
///
/// Unit costs are fixed estimates, not metered actuals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Cost recorded for a cheap-tier success.
    #[serde(default = "default_cheap_unit_cost")]
    pub cheap_unit_cost: f64,
    /// Cost recorded for a smart-tier success.
    #[serde(default = "default_smart_unit_cost")]
    pub smart_unit_cost: f64,
    /// Response length cap passed to both backends.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Sampling temperature passed to both backends.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_cheap_unit_cost() -> f64 {
    DEFAULT_CHEAP_UNIT_COST
}
fn default_smart_unit_cost() -> f64 {
    DEFAULT_SMART_UNIT_COST
}
fn default_max_output_tokens() -> u32 {
    DEFAULT_MAX_OUTPUT_TOKENS
}
fn default_temperature() -> f32 {
    DEFAULT_TEMPERATURE
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            cheap_unit_cost: DEFAULT_CHEAP_UNIT_COST,
            smart_unit_cost: DEFAULT_SMART_UNIT_COST,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// State of a resolution attempt. Each state is entered at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChainState {
    MemoryCheck,
    CheapModel,
    SmartModel,
    MemoryFallback,
}

/// Tries the cheap backend, falls back to the smart one, and as a last
/// resort asks memory for a previously-learned fix.
pub struct ModelFallbackChain {
    cheap: Arc<dyn CompletionProvider>,
    smart: Arc<dyn CompletionProvider>,
    resolver: Arc<MemoryResolver>,
    config: ChainConfig,
}

impl ModelFallbackChain {
    /// Create a chain with default tuning.
    pub fn new(
        cheap: Arc<dyn CompletionProvider>,
        smart: Arc<dyn CompletionProvider>,
        resolver: Arc<MemoryResolver>,
    ) -> Self {
        Self::with_config(cheap, smart, resolver, ChainConfig::default())
    }

    /// Create a chain with explicit tuning.
    pub fn with_config(
        cheap: Arc<dyn CompletionProvider>,
        smart: Arc<dyn CompletionProvider>,
        resolver: Arc<MemoryResolver>,
        config: ChainConfig,
    ) -> Self {
        Self {
            cheap,
            smart,
            resolver,
            config,
        }
    }

    /// Resolve one error through the tiers.
    ///
    /// `raw_error` is the text as the developer supplied it (used for the
    /// exact-text pre-check and the prompt); `report` is its structured
    /// form (used for the learned-fix fallback).
    pub async fn resolve(&self, report: &ErrorReport, raw_error: &str) -> FixResult {
        let mut state = ChainState::MemoryCheck;
        let mut cheap_failure = String::new();
        let mut smart_failure = String::new();

        loop {
            state = match state {
                ChainState::MemoryCheck => {
                    if let Some(fix) = self.resolver.lookup_exact(raw_error).await {
                        info!("exact match in memory, no model call needed");
                        return FixResult::from_memory(report.clone(), fix, None, "");
                    }
                    ChainState::CheapModel
                }
                ChainState::CheapModel => {
                    match self.ask(self.cheap.as_ref(), raw_error).await {
                        Ok(text) => {
                            debug!(provider = self.cheap.name(), "cheap model answered");
                            return self.model_result(
                                report,
                                ModelTier::Cheap,
                                self.config.cheap_unit_cost,
                                text,
                            );
                        }
                        Err(e) => {
                            warn!(error = %e, "cheap model failed, trying smart model");
                            cheap_failure = e.to_string();
                            ChainState::SmartModel
                        }
                    }
                }
                ChainState::SmartModel => {
                    match self.ask(self.smart.as_ref(), raw_error).await {
                        Ok(text) => {
                            debug!(provider = self.smart.name(), "smart model answered");
                            return self.model_result(
                                report,
                                ModelTier::Smart,
                                self.config.smart_unit_cost,
                                text,
                            );
                        }
                        Err(e) => {
                            warn!(error = %e, "smart model failed, trying learned fixes");
                            smart_failure = e.to_string();
                            ChainState::MemoryFallback
                        }
                    }
                }
                ChainState::MemoryFallback => {
                    if let Some(result) = self.resolver.apply_learned_fix(report).await {
                        info!("recovered from memory after backend failures");
                        return result;
                    }
                    return FixResult::failure(
                        report.clone(),
                        format!(
                            "All resolution tiers failed. Cheap model: {cheap_failure}. \
                             Smart model: {smart_failure}. No learned fix matched."
                        ),
                    );
                }
            };
        }
    }

    /// Ask one backend, concatenating incremental output into one string.
    async fn ask(
        &self,
        provider: &dyn CompletionProvider,
        raw_error: &str,
    ) -> Result<String, BackendError> {
        let request = CompletionRequest::new(build_prompt(raw_error))
            .max_output_tokens(self.config.max_output_tokens)
            .temperature(self.config.temperature);

        let mut stream = provider.complete_stream(request).await?;
        let mut text = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if let Some(delta) = chunk.delta {
                text.push_str(&delta);
            }
            if let Some(usage) = chunk.usage {
                debug!(total_tokens = usage.total_tokens, "backend reported usage");
            }
        }
        Ok(text.trim().to_string())
    }

    /// Build a successful result from a model response.
    ///
    /// The response text is the fix strategy; the first fenced code block,
    /// when present, becomes reusable `fixed_code` and is diffed against
    /// the original file content.
    fn model_result(
        &self,
        report: &ErrorReport,
        tier: ModelTier,
        cost: f64,
        text: String,
    ) -> FixResult {
        let fixed_code = extract_code_block(&text);
        let diff = match (&report.file_content, &fixed_code) {
            (Some(original), Some(code)) => diff::generate(original, code),
            _ => String::new(),
        };
        FixResult::from_model(report.clone(), tier, cost, text, fixed_code, diff)
    }
}

/// The instructional prompt wrapped around the developer's error.
fn build_prompt(raw_error: &str) -> String {
    format!(
        "You are a debugging expert. A developer has this error:\n\
         \n\
         {raw_error}\n\
         \n\
         Provide a clear, concise fix. Include:\n\
         1. What caused the error\n\
         2. How to fix it (with code if applicable)\n\
         3. How to prevent it\n\
         \n\
         Be direct and practical."
    )
}

/// Extract the contents of the first fenced code block, if any.
fn extract_code_block(text: &str) -> Option<String> {
    let open = text.find("```")?;
    let after_fence = &text[open + 3..];
    // Skip the optional language tag on the fence line.
    let body_start = after_fence.find('\n')? + 1;
    let body = &after_fence[body_start..];
    let close = body.find("```")?;
    let code = body[..close].trim_end_matches('\n');
    if code.is_empty() {
        None
    } else {
        Some(code.to_string())
    }
}
