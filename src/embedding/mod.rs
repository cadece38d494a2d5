//! Embedding generation: capability trait, batching, and the provider client.

pub mod batcher;
pub mod cohere;

pub use batcher::EmbeddingBatcher;
pub use cohere::CohereEmbedder;

use crate::error::Result;
use async_trait::async_trait;

/// Asymmetric encoding mode.
///
/// Queries and documents are embedded with different encodings and the two
/// must never be interchanged when the provider distinguishes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Query,
    Document,
}

/// Capability interface over an embedding provider.
///
/// Implementations are remote API clients or in-memory fakes; everything
/// above this trait is testable without a provider.
#[async_trait]
pub trait Embedder: Send + Sync + std::fmt::Debug {
    /// Embed a batch of texts. Callers must keep batches within
    /// `max_batch_size()`; the [`EmbeddingBatcher`] enforces that bound.
    async fn embed(&self, texts: &[String], mode: InputMode) -> Result<Vec<Vec<f32>>>;

    /// Fixed length of every vector this embedder produces.
    fn dimension(&self) -> usize;

    /// Provider ceiling on texts per call.
    fn max_batch_size(&self) -> usize;
}
