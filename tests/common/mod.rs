//! Shared fakes and builders for the integration tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use toolscout::{
    Config, Embedder, EmbeddingBatcher, InputMode, MemoryIndex, ParamMap, RankerConfig, Result,
    ToolCard, ToolPipeline,
};

/// Deterministic embedder programmed with a text → vector table. Unknown
/// texts embed to the zero vector, which cosine-scores 0 against anything.
#[derive(Debug, Default)]
pub struct StubEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    dimension: usize,
}

impl StubEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            vectors: HashMap::new(),
            dimension,
        }
    }

    pub fn with(mut self, text: &str, vector: Vec<f32>) -> Self {
        assert_eq!(vector.len(), self.dimension);
        self.vectors.insert(text.to_string(), vector);
        self
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, texts: &[String], _mode: InputMode) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                self.vectors
                    .get(text)
                    .cloned()
                    .unwrap_or_else(|| vec![0.0; self.dimension])
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn max_batch_size(&self) -> usize {
        96
    }
}

pub fn card(name: &str, method: &str, path: &str) -> ToolCard {
    ToolCard {
        name: name.to_string(),
        description: format!("{method} {path}"),
        method: method.to_string(),
        path: path.to_string(),
        params: ParamMap::new(),
    }
}

/// Config with dummy provider settings; fake-backed pipelines never touch
/// the network.
pub fn test_config(spec_path: PathBuf) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        shutdown_timeout_secs: 1,
        spec_path,
        embedding_api_key: "test-key".to_string(),
        embedding_base_url: "http://localhost:1".to_string(),
        embedding_model: "embed-english-v3.0".to_string(),
        embedding_dimension: 2,
        embed_batch_size: 96,
        embed_concurrency: 4,
        vector_api_key: "test-key".to_string(),
        vector_base_url: "http://localhost:1".to_string(),
        index_name: "tool-cards-test".to_string(),
        request_timeout_secs: 1,
        top_k: 10,
        confidence_threshold: 0.66,
        similarity_weight: 0.85,
        structural_weight: 0.15,
    }
}

/// Wire a pipeline over a stub embedder and a shared in-memory index.
pub fn test_pipeline(
    embedder: StubEmbedder,
    index: Arc<MemoryIndex>,
    spec_path: PathBuf,
) -> ToolPipeline {
    let batcher = EmbeddingBatcher::new(Arc::new(embedder) as Arc<dyn Embedder>, 4);
    ToolPipeline::new(spec_path, batcher, index, RankerConfig::default())
}
