//! Inference providers for mend.
//!
//! This crate provides:
//! - The [`CompletionProvider`](providers::CompletionProvider) trait, the seam
//!   between the fallback chain and whatever actually produces completions
//! - A Replicate-backed provider used for both the cheap and smart tiers
//! - A scriptable mock provider for deterministic tests
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                  CompletionProvider                  │
//! │  ┌─────────────────┐        ┌─────────────────────┐ │
//! │  │    Replicate    │        │        Mock         │ │
//! │  │ (cheap + smart) │        │  (scripted, tests)  │ │
//! │  └─────────────────┘        └─────────────────────┘ │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! A tier is just a provider plus a model id: the cheap and smart tiers of the
//! fallback chain are two instances of the same provider type pointed at
//! different models.

mod error;
mod types;

pub mod providers;

pub use error::{Error, Result};
pub use types::{CompletionRequest, CompletionResponse, StreamChunk, Usage};
