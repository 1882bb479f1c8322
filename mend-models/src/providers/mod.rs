//! Completion provider trait and implementations.
//!
//! The [`CompletionProvider`] trait defines the unified interface the fallback
//! chain speaks to, whether the tier behind it is a hosted model or a test
//! double.
//!
//! # Example
//!
//! ```ignore
//! use mend_models::providers::{CompletionProvider, ReplicateProvider};
//! use mend_models::CompletionRequest;
//!
//! async fn ask(provider: &dyn CompletionProvider) {
//!     let request = CompletionRequest::new("Explain this IndexError")
//!         .max_output_tokens(2000)
//!         .temperature(0.3);
//!
//!     let response = provider.complete(request).await?;
//!     println!("{}", response.text);
//! }
//! ```

mod mock;
mod replicate;

use std::pin::Pin;

use async_trait::async_trait;
use tokio_stream::Stream;

pub use mock::MockProvider;
pub use replicate::ReplicateProvider;

use crate::{CompletionRequest, CompletionResponse, Result, StreamChunk};

/// A stream of completion chunks for incremental responses.
///
/// This is a pinned, boxed stream that yields [`StreamChunk`] items or errors.
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>;

/// Trait for completion providers.
///
/// Implementations handle the actual model call. Responses may be delivered
/// incrementally through [`complete_stream`](CompletionProvider::complete_stream);
/// callers that need the whole text concatenate the chunks themselves.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Returns the provider name (e.g., "replicate", "mock").
    fn name(&self) -> &str;

    /// Perform a completion request, returning the full response text.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Perform a streaming completion request.
    ///
    /// The default implementation wraps [`complete`](CompletionProvider::complete)
    /// in a single-chunk stream; providers that receive incremental output
    /// override it.
    async fn complete_stream(&self, request: CompletionRequest) -> Result<CompletionStream> {
        let response = self.complete(request).await?;
        let chunks = vec![
            Ok(StreamChunk::delta(response.text)),
            Ok(StreamChunk::done(Some(response.usage))),
        ];
        Ok(Box::pin(tokio_stream::iter(chunks)))
    }
}
