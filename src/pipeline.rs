//! Pipeline orchestration: extraction → embedding → indexing at startup,
//! query → embed → search → re-rank at request time.

use crate::embedding::EmbeddingBatcher;
use crate::error::Result;
use crate::index::{VectorIndex, VectorRecord};
use crate::ingestion::{self, ToolCard};
use crate::retrieval::{rerank, RankerConfig, ScoredCandidate};
use std::path::PathBuf;
use std::sync::Arc;

/// Wires the spec normalizer, embedding batcher, vector index and ranker
/// together behind the three public pipeline operations.
#[derive(Debug, Clone)]
pub struct ToolPipeline {
    spec_path: PathBuf,
    batcher: EmbeddingBatcher,
    index: Arc<dyn VectorIndex>,
    ranker: RankerConfig,
}

impl ToolPipeline {
    pub fn new(
        spec_path: PathBuf,
        batcher: EmbeddingBatcher,
        index: Arc<dyn VectorIndex>,
        ranker: RankerConfig,
    ) -> Self {
        Self {
            spec_path,
            batcher,
            index,
            ranker,
        }
    }

    /// Extract tool cards from the configured spec file.
    ///
    /// Best-effort: a missing or unreadable spec yields an empty set so the
    /// startup sequence can continue degraded.
    pub fn extract_tool_cards(&self) -> Vec<ToolCard> {
        ingestion::load_tool_cards(&self.spec_path)
    }

    /// Embed and upsert a full card generation.
    ///
    /// Upsert chunks mirror the embedding batch boundaries, and upserting by
    /// card name replaces any prior generation's records in place. Provider
    /// failures here are fatal to the call.
    pub async fn index_tool_cards(&self, cards: &[ToolCard]) -> Result<()> {
        if cards.is_empty() {
            tracing::warn!("No tool cards to index");
            return Ok(());
        }

        let texts: Vec<String> = cards.iter().map(ToolCard::embedding_text).collect();
        let vectors = self.batcher.embed_documents(&texts).await?;

        let records: Vec<VectorRecord> = cards
            .iter()
            .zip(vectors)
            .map(|(card, values)| VectorRecord {
                id: card.name.clone(),
                values,
                card: card.clone(),
            })
            .collect();

        let batch_size = self.batcher.batch_size();
        for chunk in records.chunks(batch_size) {
            self.index.upsert(chunk.to_vec()).await?;
            tracing::info!(count = chunk.len(), "Upserted tool cards");
        }

        Ok(())
    }

    /// Retrieve the ranked tool candidates for a free-text query.
    ///
    /// Zero neighbors is an empty result, not an error; the caller decides
    /// how to signal "no relevant tool found".
    pub async fn retrieve_tools(
        &self,
        query: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<ScoredCandidate>> {
        let vector = self.batcher.embed_query(query).await?;
        let top_k = top_k.unwrap_or(self.ranker.top_k);

        let matches = self.index.query(&vector, top_k).await?;
        if matches.is_empty() {
            tracing::debug!(query, "No matches in vector index");
            return Ok(Vec::new());
        }

        Ok(rerank(matches, &self.ranker))
    }
}
