//! Vector index adapters.
//!
//! The [`VectorIndex`] trait is the serialization boundary of the pipeline:
//! records cross it as structured [`ToolCard`]s, and only the remote adapter
//! flattens them into provider metadata.

pub mod memory;
pub mod pinecone;

pub use memory::MemoryIndex;
pub use pinecone::PineconeIndex;

use crate::error::Result;
use crate::ingestion::ToolCard;
use async_trait::async_trait;

/// One embedded tool card bound for the index. `id` is the card name, so an
/// upsert of a fresh extraction generation replaces prior entries in place.
#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub card: ToolCard,
}

/// A scored nearest neighbor with its card re-materialized from metadata.
#[derive(Debug, Clone)]
pub struct VectorMatch {
    pub id: String,
    pub score: f64,
    pub card: ToolCard,
}

/// Capability interface over a vector store.
#[async_trait]
pub trait VectorIndex: Send + Sync + std::fmt::Debug {
    /// Insert-or-replace records by id.
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()>;

    /// Nearest neighbors of `vector`, best first, at most `top_k`.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>>;
}
