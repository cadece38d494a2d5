//! Retrieval ranking: semantic similarity blended with a structural prior.

pub mod ranker;

pub use ranker::{rerank, structural_score, RankerConfig, ScoredCandidate};
