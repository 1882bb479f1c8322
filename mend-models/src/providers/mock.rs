//! Mock provider for testing.
//!
//! MockProvider allows scripting completions for unit tests, enabling fast,
//! deterministic testing of the fallback chain without network access.
//!
//! Queue responses with `queue_response()` (or failures with
//! `queue_failure()`) before calling `complete()`. Each call consumes one
//! scripted entry; `call_count()` reports how many calls were made, which
//! lets tests prove a tier was never consulted.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{CompletionProvider, CompletionStream};
use crate::{CompletionRequest, CompletionResponse, Error, Result, StreamChunk};

/// One scripted reply: either output chunks or a failure message.
#[derive(Debug, Clone)]
enum Scripted {
    Chunks(Vec<String>),
    Failure(String),
}

/// Mock implementation of CompletionProvider for testing.
#[derive(Default)]
pub struct MockProvider {
    responses: Mutex<VecDeque<Scripted>>,
    calls: AtomicUsize,
}

impl MockProvider {
    /// Create a new MockProvider with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response to be returned on the next call.
    pub fn queue_response(&self, text: impl Into<String>) {
        self.queue_chunks(vec![text.into()]);
    }

    /// Queue a response delivered as multiple stream chunks.
    pub fn queue_chunks(&self, chunks: Vec<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Scripted::Chunks(chunks));
    }

    /// Queue a failure to be returned on the next call.
    pub fn queue_failure(&self, message: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Scripted::Failure(message.into()));
    }

    /// Number of completion calls made against this provider.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Check if there are scripted responses left.
    pub fn has_queued_responses(&self) -> bool {
        !self.responses.lock().unwrap().is_empty()
    }

    fn next_scripted(&self) -> Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::ProviderApi("no scripted response in MockProvider".to_string()))?;
        match scripted {
            Scripted::Chunks(chunks) => Ok(chunks),
            Scripted::Failure(message) => Err(Error::ProviderApi(message)),
        }
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse> {
        let chunks = self.next_scripted()?;
        Ok(CompletionResponse::text(chunks.concat()))
    }

    async fn complete_stream(&self, _request: CompletionRequest) -> Result<CompletionStream> {
        let chunks = self.next_scripted()?;
        let mut items: Vec<Result<StreamChunk>> =
            chunks.into_iter().map(|c| Ok(StreamChunk::delta(c))).collect();
        items.push(Ok(StreamChunk::done(None)));
        Ok(Box::pin(tokio_stream::iter(items)))
    }
}
