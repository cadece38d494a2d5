use crate::config::Config;
use crate::embedding::{CohereEmbedder, Embedder, EmbeddingBatcher};
use crate::error::Result;
use crate::index::PineconeIndex;
use crate::pipeline::ToolPipeline;
use crate::retrieval::RankerConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Application state shared across all request handlers.
pub struct AppState {
    pub pipeline: ToolPipeline,
    /// Flag indicating bootstrap finished (cards extracted and indexed).
    pub ready: AtomicBool,
    pub config: Arc<Config>,
}

impl AppState {
    /// Build state against the real providers configured in `config`.
    pub fn new(config: Config) -> Result<Self> {
        let embedder = Arc::new(CohereEmbedder::new(&config)?) as Arc<dyn Embedder>;
        let batcher = EmbeddingBatcher::new(embedder, config.embed_concurrency);
        let index = Arc::new(PineconeIndex::new(&config)?);

        let ranker = RankerConfig {
            top_k: config.top_k,
            confidence_threshold: config.confidence_threshold,
            similarity_weight: config.similarity_weight,
            structural_weight: config.structural_weight,
        };

        let pipeline = ToolPipeline::new(config.spec_path.clone(), batcher, index, ranker);
        Ok(Self::from_parts(pipeline, Arc::new(config)))
    }

    /// Build state around an already-wired pipeline. Tests use this with
    /// in-memory fakes.
    pub fn from_parts(pipeline: ToolPipeline, config: Arc<Config>) -> Self {
        Self {
            pipeline,
            ready: AtomicBool::new(false),
            config,
        }
    }

    /// Run the startup sequence: extract cards, embed, upsert, mark ready.
    ///
    /// A missing spec degrades to an empty card set (the service starts with
    /// whatever the durable index already holds); any embedding or index
    /// failure is fatal to startup.
    pub async fn bootstrap(&self) -> Result<()> {
        let cards = self.pipeline.extract_tool_cards();

        if cards.is_empty() {
            tracing::warn!("Starting without freshly indexed tool cards");
        } else {
            self.pipeline.index_tool_cards(&cards).await?;
        }

        metrics::gauge!("tool_cards_indexed").set(cards.len() as f64);
        self.ready.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Check if the service is ready to handle search requests.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}
