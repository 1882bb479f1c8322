//! mend-core: answer a developer's error with a fix, preferring a
//! previously-learned answer over a paid model call.
//!
//! This crate provides the fix-lookup-and-fallback pipeline:
//!
//! - **Signatures** - [`Signature`] derives a stable identity key from an
//!   error's type, file pattern, and message
//! - **Fix storage** - [`FixStore`] and [`InMemoryFixStore`] keep learned
//!   fixes with success-rate bookkeeping
//! - **Memory resolution** - [`MemoryResolver`] serves exact-text hits and
//!   ranked learned fixes, optionally backed by a remote context service
//! - **Fallback chain** - [`ModelFallbackChain`] tries cheap inference,
//!   then smart inference, then relearned local fixes
//! - **Orchestration** - [`Healer`] ties it together and stores every
//!   success back into memory
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use mend_core::Healer;
//! use mend_models::providers::{CompletionProvider, ReplicateProvider};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let cheap: Arc<dyn CompletionProvider> =
//!     Arc::new(ReplicateProvider::from_env(ReplicateProvider::CHEAP_MODEL)?);
//! let smart: Arc<dyn CompletionProvider> =
//!     Arc::new(ReplicateProvider::from_env(ReplicateProvider::SMART_MODEL)?);
//!
//! let healer = Healer::new(cheap, smart);
//! let result = healer.heal("IndexError: list index out of range").await;
//! if result.success {
//!     println!("[{}] ${:.6}\n{}", result.model_used, result.cost, result.fix_strategy);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                        Healer                          │
//! │  ┌──────────────────────────────────────────────────┐  │
//! │  │               ModelFallbackChain                 │  │
//! │  │  memory check → cheap → smart → learned fixes    │  │
//! │  └──────────────────────────────────────────────────┘  │
//! │        │                                   │           │
//! │        ▼                                   ▼           │
//! │  ┌───────────────┐                 ┌───────────────┐   │
//! │  │ MemoryResolver│────────────────►│   FixStore    │   │
//! │  │ (+ context    │                 │ (by signature)│   │
//! │  │    service)   │                 └───────────────┘   │
//! │  └───────────────┘                                     │
//! └────────────────────────────────────────────────────────┘
//! ```

pub mod chain;
pub mod config;
pub mod diff;
pub mod error;
pub mod healer;
pub mod memory;
pub mod report;
pub mod signature;
pub mod types;

// Re-export key types for convenience
pub use chain::{ChainConfig, ModelFallbackChain};
pub use config::{ConfigError, MemoryConfig, MendConfig, ModelsConfig};
pub use error::MendError;
pub use healer::Healer;
pub use memory::{
    ContextClient, ContextRecord, FixStore, InMemoryFixStore, LearnedFix, MemoryError,
    MemoryResolver,
};
pub use report::ErrorReport;
pub use signature::{Signature, file_pattern};
pub use types::{FixResult, ModelTier};
