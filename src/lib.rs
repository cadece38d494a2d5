//! Toolscout - semantic tool retrieval over large OpenAPI surfaces
//!
//! This library exposes the tool-card extraction and retrieval pipeline,
//! enabling integration tests and embedding in other applications.

pub mod config;
pub mod embedding;
pub mod error;
pub mod handlers;
pub mod index;
pub mod ingestion;
pub mod pipeline;
pub mod retrieval;
pub mod state;

// Re-export key types for convenience
pub use config::Config;
pub use embedding::{Embedder, EmbeddingBatcher, InputMode};
pub use error::{AppError, Result};
pub use handlers::{health_handler, ready_handler, search_handler};
pub use index::{MemoryIndex, PineconeIndex, VectorIndex};
pub use ingestion::{extract_tool_cards, load_tool_cards, ParamMap, ParamSpec, ToolCard};
pub use pipeline::ToolPipeline;
pub use retrieval::{RankerConfig, ScoredCandidate};
pub use state::AppState;
