//! Batch chunking and bounded-concurrency dispatch for embedding calls.

use crate::embedding::{Embedder, InputMode};
use crate::error::{AppError, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;

/// Splits document sets into provider-sized batches and reassembles the
/// vectors in input order.
///
/// Batches are dispatched with a small bounded concurrency; `buffered`
/// yields results in submission order regardless of completion order, so
/// reassembly never needs an explicit sort.
#[derive(Debug, Clone)]
pub struct EmbeddingBatcher {
    embedder: Arc<dyn Embedder>,
    concurrency: usize,
}

impl EmbeddingBatcher {
    pub fn new(embedder: Arc<dyn Embedder>, concurrency: usize) -> Self {
        Self {
            embedder,
            concurrency: concurrency.max(1),
        }
    }

    /// The batch ceiling enforced on every provider call.
    pub fn batch_size(&self) -> usize {
        self.embedder.max_batch_size().max(1)
    }

    pub fn dimension(&self) -> usize {
        self.embedder.dimension()
    }

    /// Embed document texts, in batches no larger than the provider limit.
    ///
    /// The returned vectors line up one-to-one with `texts`.
    pub async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let batch_size = self.batch_size();
        let batches = texts.chunks(batch_size).map(|batch| {
            let embedder = Arc::clone(&self.embedder);
            async move {
                let vectors = embedder.embed(batch, InputMode::Document).await?;
                if vectors.len() != batch.len() {
                    return Err(AppError::NoEmbeddings);
                }
                Ok::<Vec<Vec<f32>>, AppError>(vectors)
            }
        });

        let results: Vec<Vec<Vec<f32>>> = stream::iter(batches)
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        Ok(results.into_iter().flatten().collect())
    }

    /// Embed a single query text in query mode.
    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let mut vectors = self.embedder.embed(&texts, InputMode::Query).await?;
        if vectors.is_empty() {
            return Err(AppError::NoEmbeddings);
        }
        Ok(vectors.swap_remove(0))
    }
}
